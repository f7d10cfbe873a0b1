use crate::search::descriptor::{CaseSensitivity, MatchMode, SearchDescriptor, TermMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with a searchable column that has no text accessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingAccessorPolicy {
    #[default]
    Ignore,
    Notify,
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub track_item_changes: bool,
    pub missing_accessor: MissingAccessorPolicy,
    #[serde(default = "default_prepared_cache_size")]
    pub prepared_cache_size: usize,
    #[serde(default = "default_max_pending_edits")]
    pub max_pending_edits: usize,
    #[serde(default)]
    pub defaults: DescriptorDefaults,
}

fn default_prepared_cache_size() -> usize {
    64
}
fn default_max_pending_edits() -> usize {
    4096
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            track_item_changes: false,
            missing_accessor: MissingAccessorPolicy::default(),
            prepared_cache_size: default_prepared_cache_size(),
            max_pending_edits: default_max_pending_edits(),
            defaults: DescriptorDefaults::default(),
        }
    }
}

/// Flags a host uses when it builds descriptors from a bare query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorDefaults {
    pub mode: MatchMode,
    pub term_mode: TermMode,
    pub case: CaseSensitivity,
    pub whole_word: bool,
    pub normalize_whitespace: bool,
    pub ignore_diacritics: bool,
    pub allow_empty: bool,
}

impl DescriptorDefaults {
    pub fn descriptor(&self, query: impl Into<String>) -> SearchDescriptor {
        SearchDescriptor {
            query: query.into(),
            mode: self.mode,
            term_mode: self.term_mode,
            case: self.case,
            whole_word: self.whole_word,
            normalize_whitespace: self.normalize_whitespace,
            ignore_diacritics: self.ignore_diacritics,
            allow_empty: self.allow_empty,
            ..SearchDescriptor::default()
        }
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("gridfind/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".gridfind.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".gridfind.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
