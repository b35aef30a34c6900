//! A deployed contract paired with the binary artifact it came from.

use alloy::primitives::Address;

use crate::{
    artifact::ArtifactEntry,
    error::Result,
    etherscan::VerificationApi,
    verify::{verify_contract, Libraries, VerificationOutcome},
};

/// Binds a deployed contract address to its matched [`ArtifactEntry`], so
/// the artifact metadata travels with the handle instead of being looked up
/// again at verification time.
#[derive(Debug, Clone)]
pub struct VerifiableContract {
    address: Address,
    entry: ArtifactEntry,
}

impl VerifiableContract {
    /// Pairs `address` with the artifact it was deployed from.
    #[must_use]
    pub fn new(address: Address, entry: ArtifactEntry) -> Self {
        Self { address, entry }
    }

    /// Address of the deployed contract.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// The matched binary artifact.
    #[must_use]
    pub fn artifact(&self) -> &ArtifactEntry {
        &self.entry
    }

    /// Verifies this contract on the explorer behind `api`.
    ///
    /// # Errors
    ///
    /// See [`verify_contract`].
    pub async fn verify<A: VerificationApi>(
        &self,
        api: &A,
        constructor_args: &[String],
        libraries: Libraries,
        force: bool,
    ) -> Result<VerificationOutcome> {
        verify_contract(
            api,
            self.address,
            &self.entry,
            constructor_args,
            libraries,
            force,
        )
        .await
    }
}
