//! Etherscan-compatible explorer client.
//!
//! The explorer is an external collaborator consumed through a narrow
//! interface: an already-verified check, a standard-JSON submission that
//! yields a receipt guid, and a status poll for that guid. The pipeline in
//! [`crate::verify`] is generic over [`VerificationApi`] so tests can
//! substitute a scripted implementation.

use alloy::{primitives::Address, providers::Provider};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::EtherscanConfig,
    error::{Error, Result},
};

/// Explorer endpoints for one chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainConfig {
    /// Chain id the endpoints serve.
    pub chain_id: u64,
    /// Verification API base URL.
    pub api_url: String,
    /// Web frontend base URL, used to build contract links.
    pub browser_url: String,
}

impl ChainConfig {
    /// Looks up the endpoints for `chain_id`, preferring configured custom
    /// chains over the built-in table.
    #[must_use]
    pub fn for_chain_id(chain_id: u64, custom: &[ChainConfig]) -> Option<Self> {
        custom
            .iter()
            .find(|chain| chain.chain_id == chain_id)
            .cloned()
            .or_else(|| builtin_chain(chain_id))
    }
}

fn builtin_chain(chain_id: u64) -> Option<ChainConfig> {
    let (api_url, browser_url) = match chain_id {
        1 => ("https://api.etherscan.io/api", "https://etherscan.io"),
        11155111 => (
            "https://api-sepolia.etherscan.io/api",
            "https://sepolia.etherscan.io",
        ),
        _ => return None,
    };
    Some(ChainConfig {
        chain_id,
        api_url: api_url.to_owned(),
        browser_url: browser_url.to_owned(),
    })
}

/// The data submitted to the explorer to verify one contract.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Address of the deployed contract.
    pub address: Address,
    /// `<source>:<Name>` locator within the compiler input.
    pub fully_qualified_name: String,
    /// Serialized standard-JSON compiler input, pruned to the contract's
    /// dependency closure.
    pub compiler_input: String,
    /// Compiler version tag, `v<long version>`.
    pub compiler_version: String,
    /// ABI-encoded constructor arguments, hex without the `0x` prefix.
    pub constructor_arguments: String,
}

/// The explorer's answer to a status poll.
#[derive(Debug, Clone)]
pub struct VerificationStatus {
    message: String,
}

impl VerificationStatus {
    /// Wraps a raw status message.
    #[must_use]
    pub fn new(message: String) -> Self {
        Self { message }
    }

    /// Whether the explorer accepted the sources.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.message == "Pass - Verified"
    }

    /// Whether the explorer rejected the sources.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.message.starts_with("Fail - Unable to verify")
    }

    /// Whether the explorer reports the contract as verified by someone
    /// else in the meantime.
    #[must_use]
    pub fn is_already_verified(&self) -> bool {
        self.message.to_lowercase().contains("already verified")
    }

    /// The raw status message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The verification surface the pipeline needs from a block explorer.
#[allow(async_fn_in_trait)]
pub trait VerificationApi {
    /// Whether `address` already has verified sources.
    async fn is_verified(&self, address: Address) -> Result<bool>;

    /// Submits sources for verification, returning the guid to poll.
    async fn submit(&self, request: &VerificationRequest) -> Result<String>;

    /// Polls the status of a prior submission.
    async fn verification_status(
        &self,
        guid: &str,
    ) -> Result<VerificationStatus>;

    /// Web URL of the contract's code page.
    fn contract_url(&self, address: Address) -> String;
}

/// HTTP client for an Etherscan-compatible verification API.
#[derive(Debug, Clone)]
pub struct Etherscan {
    api_key: String,
    chain: ChainConfig,
    client: reqwest::Client,
}

/// Shape shared by every Etherscan API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    result: serde_json::Value,
}

impl ApiResponse {
    fn is_ok(&self) -> bool {
        self.status == "1"
    }

    /// The `result` field as text, however the API chose to type it.
    fn result_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl Etherscan {
    /// Creates a client for one chain.
    #[must_use]
    pub fn new(api_key: String, chain: ChainConfig) -> Self {
        Self { api_key, chain, client: reqwest::Client::new() }
    }

    /// Creates a client for the given chain id from the harness
    /// configuration.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownChain`] when neither the configured
    /// custom chains nor the built-in table cover `chain_id`.
    pub fn from_chain_id(
        config: &EtherscanConfig,
        chain_id: u64,
    ) -> Result<Self> {
        let chain = ChainConfig::for_chain_id(chain_id, &config.chains)
            .ok_or(Error::UnknownChain(chain_id))?;
        Ok(Self::new(config.api_key.clone(), chain))
    }

    /// Creates a client for whatever chain `provider` is connected to.
    ///
    /// # Errors
    ///
    /// May fail if querying the chain id fails or the chain is unknown.
    pub async fn from_provider<P: Provider>(
        config: &EtherscanConfig,
        provider: &P,
    ) -> Result<Self> {
        let chain_id = provider.get_chain_id().await?;
        Self::from_chain_id(config, chain_id)
    }

    async fn get(&self, query: &[(&str, &str)]) -> Result<ApiResponse> {
        let response = self
            .client
            .get(&self.chain.api_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl VerificationApi for Etherscan {
    async fn is_verified(&self, address: Address) -> Result<bool> {
        let address = address.to_string();
        let response = self
            .get(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address.as_str()),
            ])
            .await?;

        if !response.is_ok() {
            return Err(Error::Explorer(response.result_text()));
        }

        // An unverified contract comes back with an empty `SourceCode`.
        let source = response
            .result
            .as_array()
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("SourceCode"))
            .and_then(serde_json::Value::as_str);
        Ok(source.is_some_and(|source| !source.is_empty()))
    }

    async fn submit(&self, request: &VerificationRequest) -> Result<String> {
        debug!(
            address = %request.address,
            contract = %request.fully_qualified_name,
            "submitting sources for verification"
        );
        let contract_address = request.address.to_string();
        let response: ApiResponse = self
            .client
            .post(&self.chain.api_url)
            .form(&[
                ("apikey", self.api_key.as_str()),
                ("module", "contract"),
                ("action", "verifysourcecode"),
                ("codeformat", "solidity-standard-json-input"),
                ("contractaddress", contract_address.as_str()),
                ("sourceCode", request.compiler_input.as_str()),
                ("contractname", request.fully_qualified_name.as_str()),
                ("compilerversion", request.compiler_version.as_str()),
                // Etherscan spells this field with the typo.
                ("constructorArguements", request.constructor_arguments.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.is_ok() {
            return Err(Error::Explorer(response.result_text()));
        }
        Ok(response.result_text())
    }

    async fn verification_status(
        &self,
        guid: &str,
    ) -> Result<VerificationStatus> {
        let response = self
            .get(&[
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .await?;
        Ok(VerificationStatus::new(response.result_text()))
    }

    fn contract_url(&self, address: Address) -> String {
        format!(
            "{}/address/{address}#code",
            self.chain.browser_url.trim_end_matches('/')
        )
    }
}
