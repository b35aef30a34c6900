//! On-disk artifact discovery and the name index built from it.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    artifact::{ArtifactEntry, ContractClassRef},
    config::{BinariesConfig, PackageConfig},
    error::{Error, Result},
};

/// Conventional artifact directory names, tried in order under a package
/// root.
const ARTIFACT_DIR_CANDIDATES: [&str; 2] = ["artifacts", "build"];

/// Mapping from contract name to the artifacts discovered under that name,
/// in discovery order.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    entries: HashMap<String, Vec<ArtifactEntry>>,
}

impl ArtifactIndex {
    /// Scans the configured packages and builds the index.
    ///
    /// A package whose directory or artifact directory is missing is
    /// skipped with a warning; only filesystem failures below a resolved
    /// artifact directory are errors.
    ///
    /// # Errors
    ///
    /// May fail if walking a resolved artifact directory fails.
    pub fn load(config: &BinariesConfig) -> Result<Self> {
        let mut entries: HashMap<String, Vec<ArtifactEntry>> = HashMap::new();

        for package in &config.packages {
            let root = package.root(&config.path);
            if !root.is_dir() {
                warn!(
                    package = %package.package,
                    version = %package.version,
                    path = %root.display(),
                    "package directory not found, skipping"
                );
                continue;
            }

            let Some(artifacts_dir) = find_artifacts_dir(&root) else {
                warn!(
                    package = %package.package,
                    version = %package.version,
                    path = %root.display(),
                    "no artifact directory under package, skipping"
                );
                continue;
            };

            index_package(package, &artifacts_dir, &mut entries)?;
        }

        Ok(Self { entries })
    }

    /// Resolves a contract-class reference against the index.
    ///
    /// Returns `Ok(None)` when nothing matches, so callers can fall back to
    /// their default artifact lookup.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::AmbiguousArtifact`] when more than one entry
    /// matches, which signals broken packaging rather than a normal miss.
    pub fn resolve(&self, reference: &str) -> Result<Option<&ArtifactEntry>> {
        let parsed = ContractClassRef::parse(reference);
        let Some(candidates) = self.entries.get(&parsed.name) else {
            return Ok(None);
        };

        let mut matches =
            candidates.iter().filter(|entry| parsed.matches(entry));
        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(entry), None) => Ok(Some(entry)),
            (Some(_), Some(_)) => {
                Err(Error::AmbiguousArtifact(reference.to_owned()))
            }
        }
    }

    /// Number of distinct contract names in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no artifacts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves the artifact directory for a package by trying the conventional
/// names in order.
fn find_artifacts_dir(root: &Path) -> Option<PathBuf> {
    ARTIFACT_DIR_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_dir())
}

/// Adds every eligible artifact JSON under `artifacts_dir` to the index.
fn index_package(
    package: &PackageConfig,
    artifacts_dir: &Path,
    entries: &mut HashMap<String, Vec<ArtifactEntry>>,
) -> Result<()> {
    let build_info_path = {
        let candidate = artifacts_dir.join("build-info.json");
        candidate.is_file().then_some(candidate)
    };

    // Sorted traversal keeps discovery order stable across platforms.
    for dir_entry in WalkDir::new(artifacts_dir).sort_by_file_name() {
        let dir_entry = dir_entry.map_err(std::io::Error::from)?;
        if !dir_entry.file_type().is_file() {
            continue;
        }
        let path = dir_entry.path();
        if path.extension().map_or(true, |extension| extension != "json") {
            continue;
        }
        let Some(contract_name) =
            path.file_stem().and_then(|stem| stem.to_str())
        else {
            continue;
        };
        if contract_name == "build-info" || contract_name.ends_with(".dbg") {
            continue;
        }

        let filters = &package.artifacts;
        if !filters.whitelist.is_empty()
            && !filters.whitelist.iter().any(|name| name == contract_name)
        {
            continue;
        }
        if filters.blacklist.iter().any(|name| name == contract_name) {
            continue;
        }

        debug!(
            package = %package.package,
            contract = contract_name,
            path = %path.display(),
            "indexed artifact"
        );
        entries.entry(contract_name.to_owned()).or_default().push(
            ArtifactEntry {
                package: package.package.clone(),
                version: package.version.clone(),
                contract_name: contract_name.to_owned(),
                path: path.to_path_buf(),
                build_info_path: build_info_path.clone(),
                policy: filters.only_fq,
            },
        );
    }

    Ok(())
}
