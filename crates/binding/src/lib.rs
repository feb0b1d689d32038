//! Descriptor-driven contract bindings
//!
//! A contract interface is described once, in data: function shapes, event
//! shapes, and struct layouts. From that description this crate derives
//! typed call dispatch, transaction submission, event-log decoding, and log
//! filter/subscription builders, all delegating to an `ethers` [`Middleware`]
//! as the chain client. Nothing here re-implements ABI encoding, signing, or
//! transport, and the binding itself holds no mutable state.
//!
//! [`Middleware`]: ethers::providers::Middleware

mod binding;
mod descriptor;
mod error;
mod event;
mod stream;

pub use binding::{
    parse_address, AccessMode, BindingConfig, ContractBinding, FeePolicy,
};
pub use descriptor::{
    ContractDescriptor, EventDescriptor, EventField, FunctionDescriptor, Mutability,
    StructDescriptor,
};
pub use error::{BindingError, Result};
pub use event::{decode_log, decode_log_as, decode_receipt, DecodedField, EventLogRecord};
pub use stream::EventStream;

use ethers::providers::Middleware;
use ethers::types::{Log, TransactionReceipt};

impl<M: Middleware> ContractBinding<M> {
    /// Decode a raw log against this contract's descriptor set
    pub fn decode_log(&self, log: &Log) -> Result<EventLogRecord> {
        event::decode_log(self.descriptor(), log)
    }

    /// Decode a raw log against one named event of this contract. A log for
    /// any other event fails with an unrecognized-event error.
    pub fn decode_log_for(&self, event: &str, log: &Log) -> Result<EventLogRecord> {
        let event = self.descriptor().event(event).ok_or_else(|| {
            BindingError::encoding(format!(
                "contract `{}` has no event `{}`",
                self.descriptor().name(),
                event
            ))
        })?;
        match log.topics.first() {
            None => Err(BindingError::truncated("log carries no topics")),
            Some(topic) if *topic != event.topic() => {
                Err(BindingError::UnrecognizedEvent(*topic))
            }
            Some(_) => event::decode_log_as(event, log),
        }
    }

    /// Decode every log of one event that this contract emitted within a
    /// transaction receipt
    pub fn events_from_receipt(
        &self,
        event: &str,
        receipt: &TransactionReceipt,
    ) -> Result<Vec<EventLogRecord>> {
        event::decode_receipt(self.descriptor(), self.address(), event, receipt)
    }
}

#[cfg(test)]
mod tests;
