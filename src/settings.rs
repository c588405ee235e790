use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::config::{ACTIVITY_WINDOW_RANGE, DEFAULT_ACTIVITY_WINDOW_DAYS};
use crate::canonical::ColumnAlias;
use crate::ingest::DEFAULT_EXTENSIONS;

/// Tunables for an ingestion run, read from an optional JSON file. Any field
/// left out of the file keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestSettings {
    pub activity_window_days: i64,
    pub extensions: Vec<String>,
    pub parallel_reads: bool,
    /// Extra header patterns tried after the built-in column rules.
    pub column_aliases: Vec<ColumnAlias>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            activity_window_days: DEFAULT_ACTIVITY_WINDOW_DAYS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            parallel_reads: true,
            column_aliases: Vec::new(),
        }
    }
}

impl IngestSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: IngestSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !ACTIVITY_WINDOW_RANGE.contains(&self.activity_window_days) {
            bail!(
                "activityWindowDays must be between {} and {}, got {}",
                ACTIVITY_WINDOW_RANGE.start(),
                ACTIVITY_WINDOW_RANGE.end(),
                self.activity_window_days
            );
        }
        if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
            bail!("extensions must name at least one file extension");
        }
        Ok(())
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalField;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "activityWindowDays": 30,
                "columnAliases": [{ "pattern": "^fqdn$", "field": "hostname" }]
            }"#,
        )
        .unwrap();

        let settings = IngestSettings::load(&path).unwrap();
        assert_eq!(settings.activity_window_days, 30);
        assert!(settings.parallel_reads);
        assert_eq!(settings.extensions, IngestSettings::default().extensions);
        assert_eq!(settings.column_aliases[0].field, CanonicalField::Hostname);
    }

    #[test]
    fn unreadable_settings_are_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        assert!(IngestSettings::load(&path).is_err());

        fs::write(&path, "{ not json").unwrap();
        assert!(IngestSettings::load_or_default(Some(&path)).is_err());
        assert_eq!(IngestSettings::load_or_default(None).unwrap(), IngestSettings::default());
    }

    #[test]
    fn out_of_range_window_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        for window in ["9223372036854775807", "0", "-5"] {
            fs::write(&path, format!(r#"{{ "activityWindowDays": {window} }}"#)).unwrap();
            let err = IngestSettings::load(&path).unwrap_err();
            assert!(format!("{err:#}").contains("activityWindowDays"), "{window}");
        }
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let settings = IngestSettings {
            extensions: vec![" ".into()],
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(IngestSettings::default().validate().is_ok());
    }
}
