use alloy::primitives::Address;

/// Errors produced by artifact resolution and contract verification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// More than one artifact matched a contract-class reference.
    ///
    /// This signals a packaging misconfiguration and is never resolved by
    /// silently picking one of the candidates.
    #[error("more than one artifact found for `{0}`")]
    AmbiguousArtifact(String),

    /// A source referenced by an import statement is missing from the
    /// build-info sources, meaning the artifact store is internally
    /// inconsistent.
    #[error("source `{source_path}` not found in build info (available: {available:?})")]
    MissingSource {
        /// The source path that could not be found.
        source_path: String,
        /// The source paths present in the compiler input.
        available: Vec<String>,
    },

    /// The explorer reported the contract as already verified *after* the
    /// submission was accepted.
    ///
    /// Distinct from the pre-submission check, which yields a non-error
    /// [`VerificationOutcome`](crate::verify::VerificationOutcome).
    #[error("contract {fqn} at {address} is already verified")]
    AlreadyVerified {
        /// Fully qualified name of the contract.
        fqn: String,
        /// Address of the deployed contract.
        address: Address,
    },

    /// The explorer returned a verification status that is neither an
    /// explicit success nor an explicit failure.
    #[error("unexpected response from the verification API: {0}")]
    UnexpectedApiResponse(String),

    /// The explorer rejected a request at the API level.
    #[error("verification API error: {0}")]
    Explorer(String),

    /// An artifact has no associated build-info file, so there is no
    /// compiler input to submit for verification.
    #[error("package `{package}@{version}` has no build-info file")]
    MissingBuildInfo {
        /// Owning package of the artifact.
        package: String,
        /// Version of the owning package.
        version: String,
    },

    /// No explorer configuration is known for the connected chain.
    #[error("no explorer configured for chain id {0}")]
    UnknownChain(u64),

    /// A linked library was given by bare name and is not one of the known
    /// bare libraries, so its source file cannot be inferred.
    #[error("library `{0}` must be given with its source file, as `source -> {{ name -> address }}`")]
    UnqualifiedLibrary(String),

    /// Constructor arguments do not match the artifact's ABI.
    #[error("invalid constructor arguments: {0}")]
    ConstructorArguments(String),

    /// Failure reading artifacts or build info from disk.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed artifact or build-info JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Malformed harness configuration.
    #[error(transparent)]
    Config(#[from] toml::de::Error),

    /// Transport-level failure talking to the explorer.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// RPC failure while querying the connected node.
    #[error(transparent)]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),

    /// ABI type resolution or encoding failure.
    #[error(transparent)]
    Abi(#[from] alloy::dyn_abi::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
