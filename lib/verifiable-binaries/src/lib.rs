//! Resolution and explorer verification of pre-compiled contract binaries.
//!
//! Deployments built from "verifiable binary" packages ship their compiled
//! artifacts and build info on disk. This crate indexes those packages,
//! resolves `(<package>/)?<Name>(@<version>)?` references to a unique
//! artifact, prunes the build's compiler input down to the dependency
//! closure of one contract, and submits the result to an
//! Etherscan-compatible explorer for source verification.

pub mod artifact;
pub mod build_info;
pub mod config;
pub mod contract;
pub mod error;
pub mod etherscan;
pub mod index;
pub mod resolver;
pub mod retry;
pub mod verify;

pub use artifact::{Artifact, ArtifactEntry, ContractClassRef};
pub use build_info::{BuildInfo, CompilerInput};
pub use config::{BinariesConfig, HarnessConfig, MatchPolicy, PackageConfig};
pub use contract::VerifiableContract;
pub use error::{Error, Result};
pub use etherscan::{
    ChainConfig, Etherscan, VerificationApi, VerificationRequest,
    VerificationStatus,
};
pub use index::ArtifactIndex;
pub use resolver::ArtifactResolver;
pub use retry::RetryPolicy;
pub use verify::{verify_contract, Libraries, VerificationOutcome};
