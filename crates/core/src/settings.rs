use std::{collections::BTreeMap, fs, io::Write, path::PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// Ordered string lists stored under one named section. Field ids are the
/// keys within a section.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(flatten)]
    entries: BTreeMap<String, Vec<String>>,
}

impl Section {
    pub fn get_array(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Store `values` under `key`, replacing any prior list.
    pub fn put(&mut self, key: &str, values: Vec<String>) {
        self.entries.insert(key.to_string(), values);
    }
}

/// Per-section string-list storage, the only persistence the history layer
/// relies on. A missing section is not an error; it simply reads as absent.
pub trait SettingsBackend {
    fn get_section(&self, name: &str) -> Option<&Section>;

    /// Look up a section, creating it if absent.
    fn add_section(&mut self, name: &str) -> &mut Section;

    /// Write pending changes out. The in-memory backend has nothing to do.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Settings held only for the lifetime of the process. Used in tests and
/// one-off tools.
#[derive(Debug, Default)]
pub struct MemorySettings {
    sections: BTreeMap<String, Section>,
}

impl SettingsBackend for MemorySettings {
    fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    fn add_section(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }
}

pub fn settings_path() -> Option<PathBuf> {
    let base = BaseDirs::new()?;
    let dir = base.config_dir().join("recall");
    Some(dir.join("input_history.json"))
}

/// Settings persisted as one JSON document under the user config dir.
/// Loaded eagerly on open; written atomically on flush.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JsonSettings {
    #[serde(flatten)]
    sections: BTreeMap<String, Section>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl JsonSettings {
    /// Open the default per-user settings file, starting empty if absent.
    pub fn open() -> Result<Self> {
        match settings_path() {
            Some(path) => Self::open_at(path),
            None => Ok(Self::default()),
        }
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                sections: BTreeMap::new(),
                path: Some(path),
            });
        }
        let data =
            fs::read(&path).with_context(|| format!("read settings file: {}", path.display()))?;
        let mut settings: JsonSettings =
            serde_json::from_slice(&data).with_context(|| "parse settings json")?;
        settings.path = Some(path);
        Ok(settings)
    }
}

impl SettingsBackend for JsonSettings {
    fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    fn add_section(&mut self, name: &str) -> &mut Section {
        self.sections.entry(name.to_string()).or_default()
    }

    fn flush(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let data = serde_json::to_vec_pretty(&self)?;
        let mut tmp = path.clone();
        tmp.set_extension("json.tmp");
        {
            let mut f = fs::File::create(&tmp)
                .with_context(|| format!("create tmp: {}", tmp.display()))?;
            f.write_all(&data)?;
            f.flush()?;
        }
        fs::rename(tmp, &path).with_context(|| format!("persist settings to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::{JsonSettings, MemorySettings, SettingsBackend};

    #[test]
    fn memory_sections_are_created_lazily() {
        let mut settings = MemorySettings::default();
        assert!(settings.get_section("dialog").is_none());
        settings
            .add_section("dialog")
            .put("version", vec!["1.0".to_string()]);
        let stored = settings.get_section("dialog").unwrap().get_array("version");
        assert_eq!(stored, Some(&["1.0".to_string()][..]));
    }

    #[test]
    fn json_settings_round_trip_through_flush() {
        let path = env::temp_dir().join(format!("recall-settings-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut settings = JsonSettings::open_at(path.clone()).unwrap();
        assert!(settings.get_section("dialog").is_none());
        settings
            .add_section("dialog")
            .put("version", vec!["2.0".to_string(), "1.0".to_string()]);
        settings.flush().unwrap();

        let reopened = JsonSettings::open_at(path.clone()).unwrap();
        let stored = reopened.get_section("dialog").unwrap().get_array("version");
        assert_eq!(stored, Some(&["2.0".to_string(), "1.0".to_string()][..]));

        let _ = fs::remove_file(&path);
    }
}
