use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pipeline::OutputLayout;

/// Profile used when none is named explicitly.
pub const DEFAULT_PROFILE: &str = "default";

/// Project configuration file (TOML), one table per profile:
///
/// ```toml
/// [default]
/// project = "/srv/survival"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ProjectConfig {
    profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Project root under which `data/` and `reports/` are written.
    pub project: PathBuf,
}

impl ProjectConfig {
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the text is not valid TOML or a profile
    /// lacks a `project` key.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration file. Relative `project` paths are resolved
    /// against the directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or [`Error::Config`]
    /// if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| Error::Config {
            details: Cow::Owned(format!("cannot read {}: {err}", path.display())),
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            for profile in config.profiles.values_mut() {
                if profile.project.is_relative() {
                    profile.project = base.join(&profile.project);
                }
            }
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] if no profile is called `name`.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| Error::Config {
            details: Cow::Owned(format!(
                "profile '{name}' not found (available: {})",
                self.profile_names().collect::<Vec<_>>().join(", ")
            )),
        })
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Output layout rooted at the project directory of profile `name`.
    ///
    /// # Errors
    ///
    /// See [`ProjectConfig::profile`].
    pub fn output_layout(&self, name: &str) -> Result<OutputLayout> {
        self.profile(name)
            .map(|profile| OutputLayout::new(profile.project.clone()))
    }
}
