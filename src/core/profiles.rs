//! Loading of the named-profile file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::Profile;
use crate::utils::ConfigError;

/// A profile together with the key it was declared under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedProfile {
    pub name: String,
    pub profile: Profile,
}

/// Holds the profiles of the most recently loaded file, in file order.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: Vec<NamedProfile>,
    source: Option<PathBuf>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored profiles with the content of `path`.
    ///
    /// On any error the store is left empty and forgets its previous file;
    /// the caller decides how to report it.
    pub fn load(&mut self, path: &Path) -> Result<&[NamedProfile], ConfigError> {
        self.profiles.clear();
        self.source = None;

        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.clone()),
            _ => ConfigError::Read {
                path: path.clone(),
                reason: e.to_string(),
            },
        })?;

        self.profiles = Self::parse(&content)?;
        debug!("Loaded {} profiles from {}", self.profiles.len(), path.display());
        self.source = Some(path);
        Ok(&self.profiles)
    }

    /// Parses a profile document: an object whose values are objects.
    /// Key order of the document is kept.
    pub fn parse(content: &str) -> Result<Vec<NamedProfile>, ConfigError> {
        let document: Value =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let entries: Map<String, Value> = match document {
            Value::Object(entries) => entries,
            other => {
                return Err(ConfigError::Shape(format!(
                    "expected an object of profiles, found {}",
                    kind_of(&other)
                )));
            }
        };

        entries
            .into_iter()
            .map(|(name, value)| {
                if !value.is_object() {
                    return Err(ConfigError::Shape(format!(
                        "profile '{name}' must be an object, found {}",
                        kind_of(&value)
                    )));
                }
                let profile: Profile = serde_json::from_value(value)
                    .map_err(|e| ConfigError::Parse(format!("profile '{name}': {e}")))?;
                Ok(NamedProfile { name, profile })
            })
            .collect()
    }

    pub fn profiles(&self) -> &[NamedProfile] {
        &self.profiles
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.profile)
    }

    /// Absolute path of the loaded file
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Directory relative profile paths are resolved against
    pub fn base_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
