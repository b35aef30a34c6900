//! Shared helpers for contract test suites: role identifiers, fixed-point
//! amounts, receipt event extraction, and proxy introspection.

mod amount;
mod event;
mod proxy;
mod roles;

pub use amount::{ray, units, wad, RAY, WAD};
pub use event::{contract_events, first_event, Emits};
pub use proxy::{implementation_address, IMPLEMENTATION_SLOT};
pub use roles::{access_control_message, component_role, role_id, uint_keccak};

/// One hour, in seconds.
pub const HOUR: u64 = 3600;
/// One day, in seconds.
pub const DAY: u64 = HOUR * 24;
/// One week, in seconds.
pub const WEEK: u64 = DAY * 7;
