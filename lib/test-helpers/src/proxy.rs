//! EIP-1967 proxy helpers.

use alloy::{
    primitives::{b256, Address, B256, U256},
    providers::Provider,
};

/// EIP-1967 implementation slot,
/// `keccak256("eip1967.proxy.implementation") - 1`.
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// Reads the implementation address behind an EIP-1967 proxy.
///
/// # Errors
///
/// May fail if the storage query fails.
pub async fn implementation_address<P: Provider>(
    provider: &P,
    proxy: Address,
) -> eyre::Result<Address> {
    let word =
        provider.get_storage_at(proxy, IMPLEMENTATION_SLOT.into()).await?;
    Ok(Address::from_slice(&B256::from(word)[12..]))
}
