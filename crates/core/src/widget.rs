use std::{cell::RefCell, rc::Rc};

/// Last known text and suggestion list of a widget, captured when the
/// underlying control is torn down.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub text: String,
    pub items: Vec<String>,
}

/// Callback fired when a widget is disposed, carrying its final state.
pub type DisposeHook = Box<dyn Fn(Snapshot)>;

/// Capability view over one bound input control (a combo box or similar).
///
/// Implementations are toolkit specific; the history layer only ever talks
/// to this trait. All access happens on the UI thread.
pub trait InputWidget {
    /// Name tag attached to the control, used to derive a field id when
    /// none is given to [`crate::store::HistoryStore::add`].
    fn name(&self) -> Option<String> {
        None
    }

    /// Current text value.
    fn text(&self) -> String;

    /// Current suggestion list, in display order.
    fn items(&self) -> Vec<String>;

    /// Replace the suggestion list while keeping the current text: restore
    /// it verbatim if non-empty, otherwise adapters that support it select
    /// the first item.
    fn set_items(&mut self, items: &[String]);

    /// True once the underlying control has been torn down. Live queries
    /// are invalid after this; callers fall back to the disposal snapshot.
    fn is_disposed(&self) -> bool;

    /// Register a hook fired at teardown with the final text and items.
    /// Hooks fire at most once, before the control becomes unusable.
    fn on_dispose(&mut self, hook: DisposeHook);
}

/// Shared handle to a widget. The store keeps only weak references; widget
/// lifetime stays with the UI code that created it.
pub type SharedWidget = Rc<RefCell<dyn InputWidget>>;
