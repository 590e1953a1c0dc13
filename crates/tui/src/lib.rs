//! Terminal-UI adapter for the `recall` input history: an editable combo
//! box widget implementing [`recall_core::InputWidget`], plus a terminal
//! guard for dialogs hosting it. See `examples/release_dialog.rs` for the
//! full load → interact → save wiring.

pub mod combo;
pub mod terminal;

pub use combo::{ComboState, SharedCombo};
pub use terminal::TerminalGuard;
