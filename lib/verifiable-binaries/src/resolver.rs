//! Owned, lazily-indexed artifact resolution.

use alloy::primitives::Address;
use once_cell::sync::OnceCell;

use crate::{
    artifact::ArtifactEntry, config::BinariesConfig,
    contract::VerifiableContract, error::Result, index::ArtifactIndex,
};

/// Resolves contract-class references against an on-disk artifact store.
///
/// The index is built on the first resolution and cached for the lifetime
/// of the resolver; artifacts are assumed static for a given run.
/// Concurrent first calls block on the same build rather than scanning
/// twice. Callers hold and pass the resolver instead of relying on any
/// process-global cache.
#[derive(Debug)]
pub struct ArtifactResolver {
    config: BinariesConfig,
    index: OnceCell<ArtifactIndex>,
}

impl ArtifactResolver {
    /// Creates a resolver over the given store configuration. No
    /// filesystem work happens until the first resolution.
    #[must_use]
    pub fn new(config: BinariesConfig) -> Self {
        Self { config, index: OnceCell::new() }
    }

    /// The artifact index, building it on first use.
    ///
    /// # Errors
    ///
    /// May fail if scanning the artifact store fails.
    pub fn index(&self) -> Result<&ArtifactIndex> {
        self.index.get_or_try_init(|| ArtifactIndex::load(&self.config))
    }

    /// Resolves `reference` to its unique artifact, or `None` when nothing
    /// matches and the caller should fall back to its default lookup.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::AmbiguousArtifact`] on multiple matches,
    /// or if the index cannot be built.
    pub fn find(&self, reference: &str) -> Result<Option<&ArtifactEntry>> {
        self.index()?.resolve(reference)
    }

    /// Resolves `reference` and binds the artifact to a deployed contract
    /// at `address`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ArtifactResolver::find`].
    pub fn bind(
        &self,
        reference: &str,
        address: Address,
    ) -> Result<Option<VerifiableContract>> {
        Ok(self
            .find(reference)?
            .map(|entry| VerifiableContract::new(address, entry.clone())))
    }
}
