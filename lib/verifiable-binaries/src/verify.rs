//! The contract-verification pipeline.

use std::{collections::BTreeMap, time::Duration};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::Address,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    artifact::ArtifactEntry,
    error::{Error, Result},
    etherscan::{VerificationApi, VerificationRequest},
};

/// Submitted compilations take a while; polling immediately always comes
/// back pending.
const STATUS_SETTLE_DELAY: Duration = Duration::from_millis(700);

/// Bare library names the compiler settings accept only in fully qualified
/// form, and the source files that qualify them.
const KNOWN_BARE_LIBRARIES: [(&str, &str); 1] =
    [("SwapLibrary", "@ensuro/swaplibrary/contracts/SwapLibrary.sol")];

/// Caller-supplied linked-library addresses.
pub type Libraries = BTreeMap<String, LibrarySetting>;

/// One library entry, either bare or already scoped to its source file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LibrarySetting {
    /// `Name -> address`, accepted only for the known bare libraries.
    Address(Address),
    /// `source -> { Name -> address }`, the form the compiler settings
    /// expect.
    Scoped(BTreeMap<String, Address>),
}

/// The structured, non-error result of a verification attempt.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// Whether the explorer accepted the sources in this run.
    pub success: bool,
    /// The explorer's status message.
    pub message: String,
}

/// Verifies a deployed contract against its pre-compiled binary artifact.
///
/// Checks whether `address` is already verified (short-circuiting with a
/// non-error outcome unless `force` is set), prunes the artifact's build
/// info down to the contract's dependency closure, encodes the constructor
/// arguments, submits everything to the explorer, and polls the status once
/// after a settling delay.
///
/// # Errors
///
/// Besides filesystem, encoding, and transport failures:
///
/// - [`Error::AlreadyVerified`] when the explorer reports the contract
///   verified at the status poll. The pre-submission check said otherwise,
///   so someone else verified this address while the submission was in
///   flight.
/// - [`Error::UnexpectedApiResponse`] when the status is neither an
///   explicit success nor an explicit failure.
pub async fn verify_contract<A: VerificationApi>(
    api: &A,
    address: Address,
    entry: &ArtifactEntry,
    constructor_args: &[String],
    libraries: Libraries,
    force: bool,
) -> Result<VerificationOutcome> {
    let artifact = entry.read_artifact()?;
    let mut build_info = entry.read_build_info()?;
    build_info.prune_to_source(&artifact.source_name)?;

    if !force && api.is_verified(address).await? {
        info!(
            %address,
            url = %api.contract_url(address),
            "contract already verified, pass force to re-verify"
        );
        return Ok(VerificationOutcome {
            success: false,
            message: "Contract already verified".to_owned(),
        });
    }

    let fqn = artifact.fully_qualified_name();
    let compiler_version = build_info.compiler_version_tag();
    let mut input = build_info.input;
    input.settings.insert(
        "libraries".to_owned(),
        serde_json::to_value(normalize_libraries(libraries)?)?,
    );

    let request = VerificationRequest {
        address,
        fully_qualified_name: fqn.clone(),
        compiler_input: serde_json::to_string(&input)?,
        compiler_version,
        constructor_arguments: encode_constructor_args(
            &artifact.abi,
            constructor_args,
        )?,
    };
    let guid = api.submit(&request).await?;

    tokio::time::sleep(STATUS_SETTLE_DELAY).await;
    let status = api.verification_status(&guid).await?;

    // The explorer only answers "already verified" here when the address
    // got verified between our pre-check and the status poll.
    if status.is_already_verified() {
        return Err(Error::AlreadyVerified { fqn, address });
    }
    if !(status.is_success() || status.is_failure()) {
        return Err(Error::UnexpectedApiResponse(status.message().to_owned()));
    }

    if status.is_success() {
        info!(
            %address,
            contract = %artifact.contract_name,
            url = %api.contract_url(address),
            "successfully verified contract"
        );
    }
    Ok(VerificationOutcome {
        success: status.is_success(),
        message: status.message().to_owned(),
    })
}

/// Rewrites caller-supplied libraries into the `source -> { Name ->
/// address }` shape the compiler settings expect.
fn normalize_libraries(
    libraries: Libraries,
) -> Result<BTreeMap<String, BTreeMap<String, Address>>> {
    let mut normalized: BTreeMap<String, BTreeMap<String, Address>> =
        BTreeMap::new();
    for (key, setting) in libraries {
        match setting {
            LibrarySetting::Scoped(scoped) => {
                normalized.entry(key).or_default().extend(scoped);
            }
            LibrarySetting::Address(address) => {
                let source = KNOWN_BARE_LIBRARIES
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, source)| (*source).to_owned())
                    .ok_or_else(|| Error::UnqualifiedLibrary(key.clone()))?;
                normalized.entry(source).or_default().insert(key, address);
            }
        }
    }
    Ok(normalized)
}

/// ABI-encodes constructor arguments given as strings, returning bare hex.
fn encode_constructor_args(
    abi: &JsonAbi,
    constructor_args: &[String],
) -> Result<String> {
    let Some(constructor) = abi.constructor() else {
        if constructor_args.is_empty() {
            return Ok(String::new());
        }
        return Err(Error::ConstructorArguments(format!(
            "contract has no constructor but {} argument(s) were given",
            constructor_args.len()
        )));
    };

    if constructor.inputs.len() != constructor_args.len() {
        return Err(Error::ConstructorArguments(format!(
            "constructor takes {} argument(s) but {} were given",
            constructor.inputs.len(),
            constructor_args.len()
        )));
    }

    let values = constructor
        .inputs
        .iter()
        .zip(constructor_args)
        .map(|(param, arg)| {
            let ty = param.resolve()?;
            ty.coerce_str(arg)
        })
        .collect::<Result<Vec<DynSolValue>, _>>()?;

    Ok(alloy::hex::encode(constructor.abi_encode_input(&values)?))
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Mutex};

    use tempfile::TempDir;

    use super::*;
    use crate::{config::MatchPolicy, etherscan::VerificationStatus};

    struct MockApi {
        verified: bool,
        status: &'static str,
        submissions: Mutex<Vec<VerificationRequest>>,
    }

    impl MockApi {
        fn new(verified: bool, status: &'static str) -> Self {
            Self { verified, status, submissions: Mutex::new(Vec::new()) }
        }

        fn submissions(&self) -> Vec<VerificationRequest> {
            self.submissions.lock().unwrap().clone()
        }
    }

    impl VerificationApi for MockApi {
        async fn is_verified(&self, _address: Address) -> Result<bool> {
            Ok(self.verified)
        }

        async fn submit(
            &self,
            request: &VerificationRequest,
        ) -> Result<String> {
            self.submissions.lock().unwrap().push(request.clone());
            Ok("guid-1".to_owned())
        }

        async fn verification_status(
            &self,
            _guid: &str,
        ) -> Result<VerificationStatus> {
            Ok(VerificationStatus::new(self.status.to_owned()))
        }

        fn contract_url(&self, address: Address) -> String {
            format!("mock://{address}")
        }
    }

    fn fixture_entry(dir: &TempDir) -> ArtifactEntry {
        let artifact_path = dir.path().join("Token.json");
        fs::write(
            &artifact_path,
            r#"{
                "contractName": "Token",
                "sourceName": "contracts/Token.sol",
                "abi": [
                    {
                        "type": "constructor",
                        "stateMutability": "nonpayable",
                        "inputs": [
                            { "name": "supply", "type": "uint256", "internalType": "uint256" }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let build_info_path = dir.path().join("build-info.json");
        fs::write(
            &build_info_path,
            r#"{
                "solcLongVersion": "0.8.28+commit.7893614a",
                "input": {
                    "language": "Solidity",
                    "sources": {
                        "contracts/Token.sol": { "content": "import \"./Base.sol\";\ncontract Token {}" },
                        "contracts/Base.sol": { "content": "contract Base {}" },
                        "contracts/Unrelated.sol": { "content": "contract Unrelated {}" }
                    },
                    "settings": { "optimizer": { "enabled": true, "runs": 200 } }
                },
                "output": { "contracts": {} }
            }"#,
        )
        .unwrap();

        ArtifactEntry {
            package: "pkg".to_owned(),
            version: "1.0.0".to_owned(),
            contract_name: "Token".to_owned(),
            path: artifact_path,
            build_info_path: Some(build_info_path),
            policy: MatchPolicy::No,
        }
    }

    #[tokio::test]
    async fn successful_verification_submits_pruned_input() {
        let dir = TempDir::new().unwrap();
        let entry = fixture_entry(&dir);
        let api = MockApi::new(false, "Pass - Verified");

        let outcome = verify_contract(
            &api,
            Address::ZERO,
            &entry,
            &["1000".to_owned()],
            Libraries::new(),
            false,
        )
        .await
        .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Pass - Verified");

        let submissions = api.submissions();
        assert_eq!(submissions.len(), 1);
        let request = &submissions[0];
        assert_eq!(request.fully_qualified_name, "contracts/Token.sol:Token");
        assert_eq!(request.compiler_version, "v0.8.28+commit.7893614a");

        // uint256 1000 left-padded to one word.
        assert_eq!(request.constructor_arguments.len(), 64);
        assert!(request.constructor_arguments.ends_with("3e8"));

        let input: serde_json::Value =
            serde_json::from_str(&request.compiler_input).unwrap();
        let sources: Vec<&String> =
            input["sources"].as_object().unwrap().keys().collect();
        assert_eq!(sources, ["contracts/Base.sol", "contracts/Token.sol"]);
        assert_eq!(input["settings"]["libraries"], serde_json::json!({}));
        assert_eq!(input["settings"]["optimizer"]["runs"], 200);
    }

    #[tokio::test]
    async fn already_verified_pre_check_short_circuits() {
        let dir = TempDir::new().unwrap();
        let entry = fixture_entry(&dir);
        let api = MockApi::new(true, "Pass - Verified");

        let outcome = verify_contract(
            &api,
            Address::ZERO,
            &entry,
            &["1".to_owned()],
            Libraries::new(),
            false,
        )
        .await
        .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Contract already verified");
        assert!(api.submissions().is_empty());
    }

    #[tokio::test]
    async fn force_re_submits_a_verified_contract() {
        let dir = TempDir::new().unwrap();
        let entry = fixture_entry(&dir);
        let api = MockApi::new(true, "Pass - Verified");

        let outcome = verify_contract(
            &api,
            Address::ZERO,
            &entry,
            &["1".to_owned()],
            Libraries::new(),
            true,
        )
        .await
        .unwrap();

        assert!(outcome.success);
        assert_eq!(api.submissions().len(), 1);
    }

    #[tokio::test]
    async fn already_verified_at_status_poll_is_fatal() {
        let dir = TempDir::new().unwrap();
        let entry = fixture_entry(&dir);
        let api = MockApi::new(false, "Smart-contract already verified.");

        let err = verify_contract(
            &api,
            Address::ZERO,
            &entry,
            &["1".to_owned()],
            Libraries::new(),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::AlreadyVerified { fqn, .. }
                if fqn == "contracts/Token.sol:Token"
        ));
    }

    #[tokio::test]
    async fn ambiguous_status_is_an_unexpected_response() {
        let dir = TempDir::new().unwrap();
        let entry = fixture_entry(&dir);
        let api = MockApi::new(false, "Pending in queue");

        let err = verify_contract(
            &api,
            Address::ZERO,
            &entry,
            &["1".to_owned()],
            Libraries::new(),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::UnexpectedApiResponse(message) if message == "Pending in queue"
        ));
    }

    #[tokio::test]
    async fn failure_status_is_a_non_error_outcome() {
        let dir = TempDir::new().unwrap();
        let entry = fixture_entry(&dir);
        let api =
            MockApi::new(false, "Fail - Unable to verify: bytecode mismatch");

        let outcome = verify_contract(
            &api,
            Address::ZERO,
            &entry,
            &["1".to_owned()],
            Libraries::new(),
            false,
        )
        .await
        .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Fail - Unable to verify: bytecode mismatch");
    }

    #[test]
    fn bare_swap_library_gets_qualified() {
        let address = Address::repeat_byte(0x11);
        let libraries = Libraries::from([(
            "SwapLibrary".to_owned(),
            LibrarySetting::Address(address),
        )]);

        let normalized = normalize_libraries(libraries).unwrap();
        assert_eq!(
            normalized["@ensuro/swaplibrary/contracts/SwapLibrary.sol"]
                ["SwapLibrary"],
            address
        );
    }

    #[test]
    fn scoped_libraries_pass_through() {
        let address = Address::repeat_byte(0x22);
        let libraries = Libraries::from([(
            "contracts/Math.sol".to_owned(),
            LibrarySetting::Scoped(BTreeMap::from([(
                "Math".to_owned(),
                address,
            )])),
        )]);

        let normalized = normalize_libraries(libraries).unwrap();
        assert_eq!(normalized["contracts/Math.sol"]["Math"], address);
    }

    #[test]
    fn unknown_bare_library_is_rejected() {
        let libraries = Libraries::from([(
            "Math".to_owned(),
            LibrarySetting::Address(Address::ZERO),
        )]);

        let err = normalize_libraries(libraries).unwrap_err();
        assert!(matches!(err, Error::UnqualifiedLibrary(name) if name == "Math"));
    }

    #[test]
    fn constructor_argument_count_is_checked() {
        let abi: JsonAbi = serde_json::from_str(
            r#"[{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [{ "name": "supply", "type": "uint256" }]
            }]"#,
        )
        .unwrap();

        let err = encode_constructor_args(&abi, &[]).unwrap_err();
        assert!(matches!(err, Error::ConstructorArguments(_)));

        let empty: JsonAbi = serde_json::from_str("[]").unwrap();
        assert_eq!(encode_constructor_args(&empty, &[]).unwrap(), "");
        let err = encode_constructor_args(&empty, &["1".to_owned()])
            .unwrap_err();
        assert!(matches!(err, Error::ConstructorArguments(_)));
    }

    #[test]
    fn constructor_arguments_are_abi_encoded() {
        let abi: JsonAbi = serde_json::from_str(
            r#"[{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "admin", "type": "address" },
                    { "name": "supply", "type": "uint256" }
                ]
            }]"#,
        )
        .unwrap();

        let encoded = encode_constructor_args(
            &abi,
            &[
                "0x1111111111111111111111111111111111111111".to_owned(),
                "1".to_owned(),
            ],
        )
        .unwrap();

        let mut expected = String::new();
        expected.push_str(&"0".repeat(24));
        expected.push_str(&"1".repeat(40));
        expected.push_str(&"0".repeat(63));
        expected.push('1');
        assert_eq!(encoded, expected);
    }
}
