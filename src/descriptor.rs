//! # Repository Descriptor Model
//!
//! This module defines the declarative description of a workspace: a named
//! set of repositories, each with a type, a remote URL and an optional
//! version. It also implements loading and dumping that description.
//!
//! ## Format
//!
//! The primary format is a YAML document with a top-level `repositories`
//! mapping, as consumed by `vcs import`:
//!
//! ```yaml
//! repositories:
//!   drivers/ur_driver:
//!     type: git
//!     url: https://github.com/example/ur_driver.git
//!     version: main
//! ```
//!
//! The repository name is the mapping key and doubles as the checkout path
//! relative to the workspace source directory.
//!
//! ## Parsing
//!
//! `parse` first tries the format above. If that fails it falls back to the
//! legacy rosinstall list format, so older workspace exports keep working:
//!
//! ```yaml
//! - git:
//!     local-name: drivers/ur_driver
//!     uri: https://github.com/example/ur_driver.git
//!     version: main
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// The version-control system a repository is declared with.
///
/// Only `git` is reconciled. Any other type is kept verbatim so that it can
/// be reported and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VcsType {
    Git,
    Other(String),
}

impl VcsType {
    pub fn as_str(&self) -> &str {
        match self {
            VcsType::Git => "git",
            VcsType::Other(name) => name,
        }
    }

    pub fn is_git(&self) -> bool {
        matches!(self, VcsType::Git)
    }
}

impl From<String> for VcsType {
    fn from(value: String) -> Self {
        if value == "git" {
            VcsType::Git
        } else {
            VcsType::Other(value)
        }
    }
}

impl From<&str> for VcsType {
    fn from(value: &str) -> Self {
        VcsType::from(value.to_string())
    }
}

impl From<VcsType> for String {
    fn from(value: VcsType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The desired state of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Version-control type, `git` for every repository that can be reconciled.
    #[serde(rename = "type")]
    pub vcs_type: VcsType,
    /// Remote URL. A descriptor without one is never cloned or reconciled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Branch, tag or commit to check out. Absent means "keep what is there".
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
}

impl RepositoryDescriptor {
    /// Creates a git descriptor.
    pub fn git(url: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            vcs_type: VcsType::Git,
            url: Some(url.into()),
            version: version.map(str::to_string),
        }
    }

    /// The declared version, treating an empty string as absent.
    pub fn requested_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }
}

/// A named set of repository descriptors.
///
/// Entries are kept sorted by name so that dumps and reconciliation plans are
/// deterministic. The `repositories` key is required; a misspelled key must not
/// read as an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorSet {
    #[serde(deserialize_with = "null_as_empty")]
    pub repositories: BTreeMap<String, RepositoryDescriptor>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, RepositoryDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, RepositoryDescriptor>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts any YAML scalar as a string, so `version: 1.0` is read as "1.0".
fn optional_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_yaml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a version string, found {:?}",
            other
        ))),
    }
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a repository.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: RepositoryDescriptor) {
        self.repositories.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&RepositoryDescriptor> {
        self.repositories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.repositories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RepositoryDescriptor)> {
        self.repositories.iter()
    }

    /// Serializes the set in the `repositories:` format.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the set to `path` in the `repositories:` format.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

impl FromIterator<(String, RepositoryDescriptor)> for DescriptorSet {
    fn from_iter<I: IntoIterator<Item = (String, RepositoryDescriptor)>>(iter: I) -> Self {
        Self {
            repositories: iter.into_iter().collect(),
        }
    }
}

/// Parses a descriptor document.
///
/// Tries the `repositories:` format first and falls back to the rosinstall
/// list format. If neither matches, the error from the primary format is
/// reported.
pub fn parse(yaml_content: &str) -> Result<DescriptorSet> {
    if yaml_content.trim().is_empty() {
        return Ok(DescriptorSet::default());
    }

    match serde_yaml::from_str::<DescriptorSet>(yaml_content) {
        Ok(set) => Ok(set),
        Err(primary) => parse_rosinstall(yaml_content).map_err(|_| Error::DescriptorParse {
            message: primary.to_string(),
            hint: Some(
                "expected a `repositories:` mapping or a rosinstall list (`- git: {local-name, uri, version}`)"
                    .to_string(),
            ),
        }),
    }
}

/// Parses a rosinstall list.
pub fn parse_rosinstall(yaml_content: &str) -> Result<DescriptorSet> {
    use serde_yaml::Value;

    let entries: Vec<Value> = serde_yaml::from_str(yaml_content)?;
    let mut set = DescriptorSet::new();

    for entry in entries {
        let Value::Mapping(map) = entry else {
            return Err(Error::DescriptorParse {
                message: "Expected a mapping for each rosinstall entry".to_string(),
                hint: None,
            });
        };
        if map.len() != 1 {
            return Err(Error::DescriptorParse {
                message: format!("Expected exactly one type key per rosinstall entry, found {}", map.len()),
                hint: None,
            });
        }

        for (vcs_type, fields) in map {
            let vcs_type = vcs_type.as_str().ok_or_else(|| Error::DescriptorParse {
                message: "Rosinstall entry type must be a string".to_string(),
                hint: None,
            })?;
            let field = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

            let name = field("local-name").ok_or_else(|| Error::DescriptorParse {
                message: format!("Rosinstall '{}' entry is missing 'local-name'", vcs_type),
                hint: None,
            })?;

            set.insert(
                name,
                RepositoryDescriptor {
                    vcs_type: VcsType::from(vcs_type),
                    url: field("uri"),
                    version: field("version"),
                },
            );
        }
    }

    Ok(set)
}

/// Parses a descriptor file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DescriptorSet> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
