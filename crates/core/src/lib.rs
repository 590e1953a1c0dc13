//! Bounded, deduplicated, most-recently-used input history shared across
//! interchangeable input widgets and persisted between sessions.
//!
//! Widgets are registered with a [`store::HistoryStore`] under a field id;
//! widgets sharing an id represent one logical history. `load()` pushes the
//! merged offer list (privileged defaults first, then persisted entries)
//! into every widget, and `save()` collects each widget's current text plus
//! its prior suggestion list back into at most [`store::MAX_HISTORY`]
//! entries per field.

pub mod binding;
pub mod headless;
pub mod settings;
pub mod store;
pub mod widget;

pub use binding::FieldBinding;
pub use settings::{JsonSettings, MemorySettings, Section, SettingsBackend};
pub use store::{HistoryStore, MAX_HISTORY};
pub use widget::{DisposeHook, InputWidget, SharedWidget, Snapshot};
