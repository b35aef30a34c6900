//! Contract artifacts and the references used to locate them.

use std::{fs, path::PathBuf};

use alloy::json_abi::JsonAbi;
use serde::Deserialize;

use crate::{
    build_info::BuildInfo,
    config::MatchPolicy,
    error::{Error, Result},
};

/// A compiled contract descriptor, as emitted by the Solidity toolchain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Name of the contract.
    pub contract_name: String,
    /// Source file the contract was compiled from.
    pub source_name: String,
    /// The contract's ABI.
    pub abi: JsonAbi,
}

impl Artifact {
    /// The `<source>:<Name>` form expected by explorer APIs.
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

/// One indexed contract artifact within a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Owning package name.
    pub package: String,
    /// Owning package version.
    pub version: String,
    /// Contract name, taken from the artifact file name.
    pub contract_name: String,
    /// Path to the artifact descriptor JSON.
    pub path: PathBuf,
    /// Path to the package's shared build-info JSON, when present.
    pub build_info_path: Option<PathBuf>,
    /// How qualified a reference must be to match this entry.
    pub policy: MatchPolicy,
}

impl ArtifactEntry {
    /// Reads and parses the artifact descriptor from disk.
    ///
    /// # Errors
    ///
    /// May fail if the file cannot be read or holds malformed JSON.
    pub fn read_artifact(&self) -> Result<Artifact> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Reads and parses the full build info associated with this artifact.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingBuildInfo`] when the package shipped no
    /// build-info file, or if reading/parsing fails.
    pub fn read_build_info(&self) -> Result<BuildInfo> {
        let path =
            self.build_info_path.as_ref().ok_or_else(|| Error::MissingBuildInfo {
                package: self.package.clone(),
                version: self.version.clone(),
            })?;
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// A parsed contract-class reference of the form
/// `(<package>/)?<Name>(@<version>)?`.
///
/// The package part may itself contain `/`; only the final segment is split
/// on `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractClassRef {
    /// Package qualifier; empty for unqualified references.
    pub package: String,
    /// Contract name.
    pub name: String,
    /// Version qualifier, when present.
    pub version: Option<String>,
}

impl ContractClassRef {
    /// Parses a reference string. Every string parses; an over-qualified
    /// reference simply matches nothing later.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let (package, last) = match reference.rsplit_once('/') {
            Some((package, last)) => (package.to_owned(), last),
            None => (String::new(), reference),
        };
        let (name, version) = match last.split_once('@') {
            Some((name, version)) => (name.to_owned(), Some(version.to_owned())),
            None => (last.to_owned(), None),
        };
        Self { package, name, version }
    }

    /// Whether `entry` satisfies this reference under its matching policy.
    ///
    /// Unqualified references only ever match policy-[`MatchPolicy::No`]
    /// entries, and entries with policy [`MatchPolicy::Full`] require an
    /// explicit version.
    #[must_use]
    pub fn matches(&self, entry: &ArtifactEntry) -> bool {
        if self.package.is_empty() {
            if entry.policy != MatchPolicy::No {
                return false;
            }
        } else if entry.package != self.package {
            return false;
        }
        match &self.version {
            None => entry.policy != MatchPolicy::Full,
            Some(version) => &entry.version == version,
        }
    }
}

impl std::fmt::Display for ContractClassRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}/", self.package)?;
        }
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}
