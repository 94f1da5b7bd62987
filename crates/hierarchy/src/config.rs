use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HierarchyError, Result};
use crate::page::validate_page_size;

pub const HIERARCHY_CONFIG_FILENAME: &str = "hierarchy.json";

const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_MAX_REHYDRATE_DEPTH: usize = 8;

/// Tunables for one hierarchy list instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Page size for the root collection.
    pub root_page_size: u32,
    /// Page size for child pages fetched on expand and "load more".
    pub child_page_size: u32,
    /// Entity text fields searched by the keyword filter.
    pub search_fields: Vec<String>,
    /// Deepest level rehydrated from the expand cache during a reload.
    pub max_rehydrate_depth: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            root_page_size: DEFAULT_PAGE_SIZE,
            child_page_size: DEFAULT_PAGE_SIZE,
            search_fields: vec!["name".to_string(), "description".to_string()],
            max_rehydrate_depth: DEFAULT_MAX_REHYDRATE_DEPTH,
        }
    }
}

impl HierarchyConfig {
    pub fn with_page_sizes(mut self, root_page_size: u32, child_page_size: u32) -> Self {
        self.root_page_size = root_page_size;
        self.child_page_size = child_page_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_page_size(self.root_page_size).map_err(|error| {
            HierarchyError::Config(format!("root_page_size: {error}"))
        })?;
        validate_page_size(self.child_page_size).map_err(|error| {
            HierarchyError::Config(format!("child_page_size: {error}"))
        })?;
        if self.search_fields.iter().all(|field| field.trim().is_empty()) {
            return Err(HierarchyError::Config(
                "search_fields must name at least one field".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn hierarchy_config_path(dir: &Path) -> PathBuf {
    dir.join(HIERARCHY_CONFIG_FILENAME)
}

/// Reads and validates a config file.
pub fn load_hierarchy_config(path: &Path) -> Result<HierarchyConfig> {
    if !path.exists() {
        return Err(HierarchyError::ConfigNotFound(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    let config: HierarchyConfig = serde_json::from_str(&data).map_err(|error| {
        HierarchyError::Config(format!(
            "failed to parse hierarchy config {}: {error}",
            path.display()
        ))
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads the config in `dir`, falling back to defaults when absent.
pub fn load_or_default_hierarchy_config(dir: &Path) -> Result<HierarchyConfig> {
    let path = hierarchy_config_path(dir);
    if !path.exists() {
        log::debug!(
            "hierarchy config missing, using defaults path={}",
            path.display()
        );
        return Ok(HierarchyConfig::default());
    }
    load_hierarchy_config(&path)
}

pub fn write_hierarchy_config(path: &Path, config: &HierarchyConfig) -> Result<()> {
    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data)?;
    Ok(())
}
