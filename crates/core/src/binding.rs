use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use indexmap::IndexSet;

use crate::widget::{InputWidget, SharedWidget, Snapshot};

/// One registered widget plus the snapshot captured at its disposal.
struct Slot {
    widget: Weak<RefCell<dyn InputWidget>>,
    snapshot: Rc<RefCell<Option<Snapshot>>>,
}

impl Slot {
    fn new(widget: &SharedWidget) -> Self {
        let snapshot = Rc::new(RefCell::new(None));
        let cell = Rc::clone(&snapshot);
        widget
            .borrow_mut()
            .on_dispose(Box::new(move |snap| *cell.borrow_mut() = Some(snap)));
        Slot {
            widget: Rc::downgrade(widget),
            snapshot,
        }
    }

    // Current text, or the disposal snapshot once the widget is gone.
    fn text(&self) -> Option<String> {
        if let Some(widget) = self.widget.upgrade() {
            let widget = widget.borrow();
            if !widget.is_disposed() {
                return Some(widget.text());
            }
        }
        self.snapshot.borrow().as_ref().map(|s| s.text.clone())
    }

    fn items(&self) -> Option<Vec<String>> {
        if let Some(widget) = self.widget.upgrade() {
            let widget = widget.borrow();
            if !widget.is_disposed() {
                return Some(widget.items());
            }
        }
        self.snapshot.borrow().as_ref().map(|s| s.items.clone())
    }
}

/// All widgets sharing one logical field, in registration order.
///
/// The binding holds only weak references; a dropped widget contributes its
/// disposal snapshot instead of a live query.
pub struct FieldBinding {
    slots: Vec<Slot>,
}

impl Default for FieldBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldBinding {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Append a widget to the group. Duplicate registrations are tolerated;
    /// save semantics are last-write-wins per field anyway.
    pub fn add_widget(&mut self, widget: &SharedWidget) {
        self.slots.push(Slot::new(widget));
    }

    /// Push the merged offer list into every live, non-disposed widget.
    pub fn load_into(&self, merged: &[String]) {
        for slot in &self.slots {
            if let Some(widget) = slot.widget.upgrade() {
                let mut widget = widget.borrow_mut();
                if !widget.is_disposed() {
                    widget.set_items(merged);
                }
            }
        }
    }

    /// Collect the ordered history to persist for this field.
    ///
    /// Each widget's current text is inserted first, in registration order;
    /// the insertion-order set keeps the first occurrence, so the first
    /// widget with non-empty text owns the head position. The first widget's
    /// item list then serves as the representative prior history, filling
    /// the remainder up to `bound` while skipping privileged entries (those
    /// get re-injected on the next load and are only kept when the user
    /// actually selected one as the text).
    pub fn collect_for_save(&self, privileged: &[String], bound: usize) -> Vec<String> {
        let mut history: IndexSet<String> = IndexSet::new();
        for slot in &self.slots {
            if let Some(text) = slot.text() {
                let text = text.trim();
                if !text.is_empty() {
                    history.insert(text.to_string());
                }
            }
        }
        if let Some(items) = self.slots.first().and_then(Slot::items) {
            for item in items {
                if history.len() >= bound {
                    break;
                }
                if privileged.contains(&item) {
                    continue;
                }
                history.insert(item);
            }
        }
        let mut entries: Vec<String> = history.into_iter().collect();
        entries.truncate(bound);
        entries
    }
}
