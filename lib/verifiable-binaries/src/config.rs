//! Harness configuration.
//!
//! The configuration is a TOML document with two sections: the
//! `verifiable-binaries` artifact store layout and the `etherscan` explorer
//! credentials. It is consumed read-only; nothing in this crate writes it
//! back.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::Result, etherscan::ChainConfig};

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HarnessConfig {
    /// Artifact store configuration.
    #[serde(default)]
    pub verifiable_binaries: BinariesConfig,
    /// Block-explorer configuration.
    #[serde(default)]
    pub etherscan: EtherscanConfig,
}

impl HarnessConfig {
    /// Loads the configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// May fail if the file cannot be read or is not valid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Layout of the on-disk verifiable-binary store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BinariesConfig {
    /// Root directory of the artifact store.
    #[serde(default = "default_base_path")]
    pub path: PathBuf,
    /// The packages whose artifacts get indexed.
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
}

impl Default for BinariesConfig {
    fn default() -> Self {
        Self { path: default_base_path(), packages: Vec::new() }
    }
}

fn default_base_path() -> PathBuf {
    PathBuf::from("./verifiable-binaries")
}

/// A named, versioned dependency whose compiled artifacts live in the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageConfig {
    /// Package name, e.g. `@openzeppelin/contracts`.
    pub package: String,
    /// Package version, e.g. `5.1.0`.
    pub version: String,
    /// Explicit directory override. When absent the package lives at
    /// `<store>/<package>/<version>`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Artifact filtering and matching rules.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

impl PackageConfig {
    /// Directory holding this package, honoring the explicit override.
    pub(crate) fn root(&self, store: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => store.join(&self.package).join(&self.version),
        }
    }
}

/// Filtering and matching rules for one package's artifacts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactsConfig {
    /// How qualified a reference must be to match this package's artifacts.
    #[serde(default)]
    pub only_fq: MatchPolicy,
    /// Strict allow-list of contract names; empty means allow all.
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Contract names to drop, applied after the whitelist.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// How qualified a contract-class reference must be to match an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Matched by bare name, package-qualified name, or both.
    #[default]
    No,
    /// Matched only when the reference names the package.
    Package,
    /// Matched only when the reference names both package and version.
    Full,
}

/// Explorer credentials and custom chain endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EtherscanConfig {
    /// Explorer API key.
    #[serde(default)]
    pub api_key: String,
    /// Chains beyond the built-in ones.
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}
