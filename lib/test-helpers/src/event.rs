//! Transaction-receipt event extraction.

use alloy::{
    primitives::Address, rpc::types::TransactionReceipt, sol_types::SolEvent,
};

/// Extension trait for asserting an event got emitted.
pub trait Emits<E> {
    /// Whether the receipt holds a log equal to the `expected` event.
    fn emits(&self, expected: E) -> bool;
}

impl<E> Emits<E> for TransactionReceipt
where
    E: SolEvent,
    E: PartialEq,
{
    fn emits(&self, expected: E) -> bool {
        contract_events(self, None).into_iter().any(|event: E| expected == event)
    }
}

/// Decodes every log of event type `E` in the receipt, optionally keeping
/// only those emitted by `emitter`.
#[must_use]
pub fn contract_events<E: SolEvent>(
    receipt: &TransactionReceipt,
    emitter: Option<Address>,
) -> Vec<E> {
    receipt
        .inner
        .logs()
        .iter()
        .filter(|log| emitter.map_or(true, |address| log.address() == address))
        .filter_map(|log| log.log_decode().ok())
        .map(|log| log.inner.data)
        .collect()
}

/// The first log of event type `E`, if any.
#[must_use]
pub fn first_event<E: SolEvent>(
    receipt: &TransactionReceipt,
    emitter: Option<Address>,
) -> Option<E> {
    contract_events(receipt, emitter).into_iter().next()
}
