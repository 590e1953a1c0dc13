use std::{cell::RefCell, collections::HashMap, rc::Rc};

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::{
    binding::FieldBinding,
    headless,
    settings::{JsonSettings, SettingsBackend},
    widget::{InputWidget, SharedWidget},
};

/// Most entries ever persisted per field.
pub const MAX_HISTORY: usize = 10;

/// Keeps a bounded, deduplicated, most-recently-used history of the values
/// typed into a set of input widgets, persisted per field through a
/// [`SettingsBackend`] section.
///
/// Widgets are grouped by field id; widgets sharing an id represent the same
/// logical history and stay synchronized on [`HistoryStore::load`]. The
/// privileged list is always offered first but only persisted when the user
/// effectively selected one of its values.
pub struct HistoryStore {
    settings: Box<dyn SettingsBackend>,
    section: String,
    privileged: Vec<String>,
    bindings: HashMap<String, FieldBinding>,
    headless: bool,
}

impl HistoryStore {
    pub fn new(settings: Box<dyn SettingsBackend>, section: &str) -> Self {
        Self::with_privileged(settings, section, Vec::new())
    }

    /// `privileged` values are merged at the front of every field's offer
    /// list on load, regardless of persisted history.
    pub fn with_privileged(
        settings: Box<dyn SettingsBackend>,
        section: &str,
        privileged: Vec<String>,
    ) -> Self {
        Self {
            settings,
            section: section.to_string(),
            privileged,
            bindings: HashMap::new(),
            headless: headless::is_headless(),
        }
    }

    /// Open a store over the default per-user JSON settings file.
    pub fn open(section: &str, privileged: Vec<String>) -> anyhow::Result<Self> {
        let settings = JsonSettings::open()?;
        Ok(Self::with_privileged(Box::new(settings), section, privileged))
    }

    /// Register a widget under the field id carried by its name tag.
    /// Widgets without a name tag are ignored.
    pub fn add<W: InputWidget + 'static>(&mut self, widget: &Rc<RefCell<W>>) {
        let Some(id) = widget.borrow().name() else {
            return;
        };
        self.add_as(&id, widget);
    }

    /// Register a widget under an explicit field id, creating the binding
    /// lazily. Widgets added under the same id share one history.
    pub fn add_as<W: InputWidget + 'static>(&mut self, id: &str, widget: &Rc<RefCell<W>>) {
        let shared: SharedWidget = Rc::<RefCell<W>>::clone(widget);
        self.bindings
            .entry(id.to_string())
            .or_insert_with(FieldBinding::new)
            .add_widget(&shared);
    }

    /// Read persisted entries for every bound field and push the merged
    /// offer list, privileged values first, into its live widgets. A field
    /// with no persisted entries gets just the privileged list.
    pub fn load(&self) {
        if self.headless {
            return;
        }
        for (id, binding) in &self.bindings {
            let mut merged: IndexSet<String> = self.privileged.iter().cloned().collect();
            if let Some(stored) = self
                .settings
                .get_section(&self.section)
                .and_then(|section| section.get_array(id))
            {
                merged.extend(stored.iter().cloned());
            }
            let merged: Vec<String> = merged.into_iter().collect();
            debug!(field = %id, count = merged.len(), "loading input history");
            binding.load_into(&merged);
        }
    }

    /// Collect each field's current history and write it back, fully
    /// overwriting the prior persisted state for that field.
    pub fn save(&mut self) {
        if self.headless {
            return;
        }
        let section = self.settings.add_section(&self.section);
        for (id, binding) in &self.bindings {
            let entries = binding.collect_for_save(&self.privileged, MAX_HISTORY);
            debug!(field = %id, count = entries.len(), "saving input history");
            section.put(id, entries);
        }
        if let Err(err) = self.settings.flush() {
            warn!(error = %err, "failed to persist input history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryStore, MAX_HISTORY};
    use crate::settings::{MemorySettings, SettingsBackend};
    use crate::widget::testutil::FakeCombo;

    fn store_with(privileged: &[&str]) -> HistoryStore {
        HistoryStore::with_privileged(
            Box::new(MemorySettings::default()),
            "dialog",
            privileged.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn seeded_store(privileged: &[&str], id: &str, persisted: &[&str]) -> HistoryStore {
        let mut settings = MemorySettings::default();
        settings
            .add_section("dialog")
            .put(id, persisted.iter().map(|s| s.to_string()).collect());
        HistoryStore::with_privileged(
            Box::new(settings),
            "dialog",
            privileged.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn persisted(store: &HistoryStore, id: &str) -> Vec<String> {
        store
            .settings
            .get_section("dialog")
            .and_then(|s| s.get_array(id))
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    #[test]
    fn save_never_exceeds_the_bound() {
        let items: Vec<String> = (0..15).map(|i| format!("{i}.0")).collect();
        let item_refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let combo = FakeCombo::new("new", &item_refs);

        let mut store = store_with(&[]);
        store.add_as("version", &combo);
        store.save();

        let saved = persisted(&store, "version");
        assert_eq!(saved.len(), MAX_HISTORY);
        assert_eq!(saved[0], "new");
    }

    #[test]
    fn saved_entries_are_unique() {
        let combo = FakeCombo::new("a", &["a", "b", "a"]);
        let mut store = store_with(&[]);
        store.add_as("field", &combo);
        store.save();

        assert_eq!(persisted(&store, "field"), vec!["a", "b"]);
    }

    #[test]
    fn first_widget_with_text_owns_the_head() {
        let a = FakeCombo::new("4.0", &[]);
        let b = FakeCombo::new("5.0", &[]);
        let mut store = store_with(&[]);
        store.add_as("version", &a);
        store.add_as("version", &b);
        store.save();

        assert_eq!(persisted(&store, "version"), vec!["4.0", "5.0"]);
    }

    #[test]
    fn privileged_entries_are_not_persisted_unless_selected() {
        let combo = FakeCombo::new("", &["release", "1.0"]);
        let mut store = store_with(&["release"]);
        store.add_as("version", &combo);
        store.save();
        assert_eq!(persisted(&store, "version"), vec!["1.0"]);

        // selecting a privileged value puts it into the widget text
        let selected = FakeCombo::new("release", &["release", "1.0"]);
        let mut store = store_with(&["release"]);
        store.add_as("version", &selected);
        store.save();
        assert_eq!(persisted(&store, "version"), vec!["release", "1.0"]);
    }

    #[test]
    fn default_selecting_adapter_keeps_the_privileged_head() {
        // adapters that default-select the first offered item put the
        // privileged value into the text, which counts as a selection
        let combo = FakeCombo::new("", &[]);
        combo.borrow_mut().default_select = true;
        let mut store = seeded_store(&["release"], "version", &["1.0"]);
        store.add_as("version", &combo);

        store.load();
        assert_eq!(combo.borrow().text, "release");

        store.save();
        assert_eq!(persisted(&store, "version"), vec!["release", "1.0"]);
    }

    #[test]
    fn load_then_save_round_trips_persisted_entries() {
        let combo = FakeCombo::new("", &[]);
        let mut store = seeded_store(&["release"], "version", &["1.0", "2.0"]);
        store.add_as("version", &combo);

        store.load();
        assert_eq!(
            combo.borrow().items,
            vec!["release", "1.0", "2.0"],
            "offer list is privileged entries followed by persisted history"
        );

        store.save();
        assert_eq!(persisted(&store, "version"), vec!["1.0", "2.0"]);
    }

    #[test]
    fn typing_a_new_value_puts_it_first_and_drops_unselected_privileged() {
        let combo = FakeCombo::new("", &[]);
        let mut store = seeded_store(&["release", "snapshot"], "version", &["1.0", "2.0"]);
        store.add_as("version", &combo);

        store.load();
        assert_eq!(
            combo.borrow().items,
            vec!["release", "snapshot", "1.0", "2.0"]
        );

        combo.borrow_mut().text = "3.0".to_string();
        store.save();
        assert_eq!(persisted(&store, "version"), vec!["3.0", "1.0", "2.0"]);
    }

    #[test]
    fn shared_field_does_not_duplicate_the_typed_value() {
        let a = FakeCombo::new("4.0", &["4.0", "3.0"]);
        let b = FakeCombo::new("", &["4.0", "3.0"]);
        let mut store = store_with(&[]);
        store.add_as("version", &a);
        store.add_as("version", &b);
        store.save();

        assert_eq!(persisted(&store, "version"), vec!["4.0", "3.0"]);
    }

    #[test]
    fn disposed_widget_is_saved_from_its_snapshot() {
        let combo = FakeCombo::new("a", &["a", "b"]);
        let mut store = store_with(&[]);
        store.add_as("field", &combo);

        combo.borrow_mut().dispose();
        store.save();

        assert_eq!(persisted(&store, "field"), vec!["a", "b"]);
    }

    #[test]
    fn load_skips_disposed_widgets() {
        let live = FakeCombo::new("", &[]);
        let dead = FakeCombo::new("", &[]);
        let mut store = seeded_store(&[], "field", &["1.0"]);
        store.add_as("field", &live);
        store.add_as("field", &dead);

        dead.borrow_mut().dispose();
        store.load();

        assert_eq!(live.borrow().items, vec!["1.0"]);
        assert!(dead.borrow().items.is_empty());
    }

    #[test]
    fn headless_mode_skips_load_and_save() {
        let combo = FakeCombo::new("typed", &[]);
        let mut store = seeded_store(&[], "field", &["1.0"]);
        store.headless = true;
        store.add_as("field", &combo);

        store.load();
        assert!(combo.borrow().items.is_empty());

        store.save();
        assert_eq!(persisted(&store, "field"), vec!["1.0"], "prior state untouched");
    }

    #[test]
    fn add_derives_the_field_id_from_the_name_tag() {
        let named = FakeCombo::named("version", "9.0");
        let unnamed = FakeCombo::new("ignored", &[]);
        let mut store = store_with(&[]);
        store.add(&named);
        store.add(&unnamed);
        store.save();

        assert_eq!(persisted(&store, "version"), vec!["9.0"]);
        assert!(store.settings.get_section("dialog").unwrap().get_array("ignored").is_none());
    }
}
