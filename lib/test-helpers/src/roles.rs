//! Access-control role identifiers.

use alloy::primitives::{keccak256, Address, B256, U256};

/// Computes the identifier of a named role.
///
/// `DEFAULT_ADMIN_ROLE` maps to the zero hash and a parseable `0x…` value
/// passes through unchanged, mirroring how role constants appear in
/// Solidity sources. Anything else is hashed.
#[must_use]
pub fn role_id(role: &str) -> B256 {
    if role == "DEFAULT_ADMIN_ROLE" {
        return B256::ZERO;
    }
    if role.starts_with("0x") {
        if let Ok(id) = role.parse::<B256>() {
            return id;
        }
    }
    keccak256(role.as_bytes())
}

/// Builds a component role identifier the way `AccessManager.
/// getComponentRole` does: the role hash XOR-ed with the component address,
/// address bytes padded with zeros at the end.
#[must_use]
pub fn component_role(component: Address, role: &str) -> B256 {
    let mut bytes = role_id(role).0;
    for (byte, address_byte) in bytes.iter_mut().zip(component.as_slice()) {
        *byte ^= address_byte;
    }
    B256::from(bytes)
}

/// The AccessControl v2 revert string for a missing role, optionally
/// scoped to a component.
#[must_use]
pub fn access_control_message(
    user: Address,
    component: Option<Address>,
    role: &str,
) -> String {
    let role_hash = match component {
        Some(component) => component_role(component, role),
        None => role_id(role),
    };
    format!(
        "AccessControl: account {} is missing role {role_hash}",
        user.to_string().to_lowercase()
    )
}

/// `uint256(keccak256(value))`, handy for pseudo-random test identifiers.
#[must_use]
pub fn uint_keccak(value: &str) -> U256 {
    U256::from_be_bytes(keccak256(value.as_bytes()).0)
}
