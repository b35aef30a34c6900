//! Build-info handling and compiler-input pruning.
//!
//! A build-info file holds the entire multi-file compilation unit plus the
//! compiler output. Verification only needs the source-level dependency
//! closure of one contract, so before submission the input is pruned down
//! to the sources reachable from the target's source file.

use std::collections::{BTreeMap, HashSet, VecDeque};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Matches `import … "path";` / `import … 'path';` statements anchored at
/// line start.
///
/// Scanning with a regex cannot tell commented-out or multi-line imports
/// apart from real ones. That is acceptable here: the scanned sources are
/// compiler-emitted, normalized Solidity, and over-approximating the import
/// set only keeps an extra source around.
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^import .*["']([^"']+)["'];$"#)
        .expect("import regex should be valid")
});

/// One build-info file, with the compiler `output` section already dropped.
///
/// The output is large and unnecessary for verification; deserializing into
/// this type discards it, so a parsed `BuildInfo` is always an in-memory
/// copy safe to mutate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Full version tag of the compiler that produced this build.
    pub solc_long_version: String,
    /// The standard-JSON compiler input.
    pub input: CompilerInput,
}

impl BuildInfo {
    /// Compiler version tag in the `v<long version>` form explorers expect.
    #[must_use]
    pub fn compiler_version_tag(&self) -> String {
        format!("v{}", self.solc_long_version)
    }

    /// Prunes the compiler input to the dependency closure of
    /// `entry_source`. See [`CompilerInput::prune_to_source`].
    ///
    /// # Errors
    ///
    /// May fail if a referenced source is missing from the input.
    pub fn prune_to_source(&mut self, entry_source: &str) -> Result<()> {
        self.input.prune_to_source(entry_source)
    }
}

/// A Solidity standard-JSON compiler input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerInput {
    /// Input language, `Solidity` for every build this crate handles.
    pub language: String,
    /// Source path to source content.
    pub sources: BTreeMap<String, SourceFile>,
    /// Compiler settings, passed through to the explorer untouched except
    /// for the `libraries` section.
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl CompilerInput {
    /// Drops every source not reachable from `entry_source` through import
    /// statements.
    ///
    /// The reachable set is a deterministic function of the sources and the
    /// entry path, so pruning an already-pruned input is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingSource`] when an import points at a source
    /// absent from the map, which means the artifact store is internally
    /// inconsistent.
    pub fn prune_to_source(&mut self, entry_source: &str) -> Result<()> {
        let required = required_sources(&self.sources, entry_source)?;
        debug!(
            entry = entry_source,
            kept = required.len(),
            total = self.sources.len(),
            "pruned compiler input"
        );
        self.sources.retain(|path, _| required.contains(path));
        Ok(())
    }
}

/// One source file of a compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Verbatim source content.
    pub content: String,
}

/// Breadth-first walk of the import graph starting at `entry_source`.
fn required_sources(
    sources: &BTreeMap<String, SourceFile>,
    entry_source: &str,
) -> Result<HashSet<String>> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([entry_source.to_owned()]);

    while let Some(source_path) = queue.pop_front() {
        if !visited.insert(source_path.clone()) {
            continue;
        }

        let source =
            sources.get(&source_path).ok_or_else(|| Error::MissingSource {
                source_path: source_path.clone(),
                available: sources.keys().cloned().collect(),
            })?;

        for capture in IMPORT_RE.captures_iter(&source.content) {
            let imported = resolve_import_path(&capture[1], &source_path);
            if !visited.contains(&imported) {
                queue.push_back(imported);
            }
        }
    }

    Ok(visited)
}

/// Resolves an imported path against the importing file.
///
/// Relative imports (`./`, `../`) resolve against the importer's directory;
/// bare and absolute module paths pass through unchanged. Paths use `/`
/// separators regardless of platform, matching the compiler input format.
///
/// ```
/// use verifiable_binaries::build_info::resolve_import_path;
///
/// assert_eq!(
///     resolve_import_path("../foo/bar.sol", "contracts/a/b/buzz.sol"),
///     "contracts/a/foo/bar.sol"
/// );
/// assert_eq!(
///     resolve_import_path("./bar.sol", "contracts/a/b/buzz.sol"),
///     "contracts/a/b/bar.sol"
/// );
/// assert_eq!(resolve_import_path("bar.sol", "contracts/a/b/buzz.sol"), "bar.sol");
/// ```
#[must_use]
pub fn resolve_import_path(imported: &str, importer: &str) -> String {
    if !imported.starts_with("./") && !imported.starts_with("../") {
        return imported.to_owned();
    }

    let mut segments: Vec<&str> = importer.split('/').collect();
    segments.pop();
    for component in imported.split('/') {
        match component {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
