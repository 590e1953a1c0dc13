use std::env;

/// True when running in a non-interactive context (automation, UI previews)
/// where widget population and persistence side effects must be skipped.
///
/// Controlled by the `RECALL_HEADLESS` environment variable; any value other
/// than `0` enables it.
pub fn is_headless() -> bool {
    match env::var("RECALL_HEADLESS") {
        Ok(v) => v != "0",
        Err(_) => false,
    }
}
