use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use wishes::Currency;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User preferences, stored as TOML in the config directory.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub currency: Currency,
    pub theme: Theme,
    /// Product snapshot, `products.json` in the data directory if unset
    pub products: Option<PathBuf>,
    /// Categories offered in addition to the built-in ones
    pub categories: Vec<String>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "wishlist", "wishlist").context("Could not determine home directory")
}

pub fn default_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("settings.toml"))
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

impl Settings {
    /// Reads the settings, falling back to the defaults if there is no file yet.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs_err::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e).context("Failed to read settings"),
        };
        toml::from_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(path, self.to_toml()?)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings")
    }

    pub fn products_path(&self) -> Result<PathBuf> {
        match &self.products {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("products.json")),
        }
    }

    /// Returns whether the category was new.
    pub fn add_category(&mut self, category: &str) -> bool {
        let category = category.trim();
        if category.is_empty() || self.categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            return false;
        }
        self.categories.push(category.to_owned());
        true
    }

    /// Returns whether the category existed.
    pub fn remove_category(&mut self, category: &str) -> bool {
        let before = self.categories.len();
        self.categories
            .retain(|c| !c.eq_ignore_ascii_case(category.trim()));
        self.categories.len() != before
    }
}
