//! Generic event-log decoding
//!
//! Logs are dispatched through a registry keyed by signature hash: the log's
//! first topic selects the event descriptor, indexed fields are read from the
//! remaining topics in declaration order, and non-indexed fields are decoded
//! from the data payload with standard tuple rules. One routine serves every
//! event shape.
//!
//! Indexed fields of dynamic-length types (strings, bytes, arrays, tuples)
//! are stored on-chain as their Keccak-256 hash only; they decode to the raw
//! 32-byte topic value, never to the original preimage. This mirrors how the
//! chain indexes such fields and is not recoverable here.

use ethers::abi::{self, Token, Tokenizable};
use ethers::types::{Address, Log, TransactionReceipt, H256};
use serde::Serialize;
use tracing::debug;

use crate::descriptor::{ContractDescriptor, EventDescriptor};
use crate::error::{BindingError, Result};

/// One decoded event field, in declaration order
#[derive(Debug, Clone, Serialize)]
pub struct DecodedField {
    /// Field name as declared in the contract interface
    pub name: String,
    /// Decoded value; for indexed dynamic-typed fields this is the 32-byte
    /// topic hash, not the original value
    #[serde(skip)]
    pub value: Token,
    /// Whether the field was read from a topic
    pub indexed: bool,
}

/// A decoded log: raw metadata plus the named fields of its event.
///
/// Records are created per received log, immutable, and consumed by the
/// caller.
#[derive(Debug, Clone, Serialize)]
pub struct EventLogRecord {
    /// Event name from the matched descriptor
    pub event: String,
    /// Contract address that emitted the log
    pub address: Address,
    /// Block number, zero for pending logs
    pub block_number: u64,
    /// Block hash, if the log is mined
    pub block_hash: Option<H256>,
    /// Transaction hash
    pub tx_hash: H256,
    /// Transaction index within the block
    pub tx_index: u64,
    /// Log index within the block
    pub log_index: u64,
    /// Decoded fields in declaration order
    pub fields: Vec<DecodedField>,
    /// The log as received from the chain client
    #[serde(skip)]
    pub raw: Log,
}

impl EventLogRecord {
    /// Look up a decoded field by name
    pub fn field(&self, name: &str) -> Option<&Token> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Look up a decoded field by name and convert it to a native value
    pub fn get<T: Tokenizable>(&self, name: &str) -> Result<T> {
        let token = self.field(name).ok_or_else(|| {
            BindingError::decoding(format!("event `{}` has no field `{}`", self.event, name))
        })?;
        T::from_token(token.clone()).map_err(|e| {
            BindingError::decoding(format!(
                "field `{}` of `{}`: {}",
                name, self.event, e
            ))
        })
    }
}

/// Decode a raw log against a contract's descriptor set. The first topic
/// selects the event; a topic that matches no known event is a usage error.
pub fn decode_log(descriptor: &ContractDescriptor, log: &Log) -> Result<EventLogRecord> {
    let signature = *log
        .topics
        .first()
        .ok_or_else(|| BindingError::truncated("log carries no topics"))?;
    let event = descriptor
        .event_for_topic(signature)
        .ok_or(BindingError::UnrecognizedEvent(signature))?;

    decode_log_as(event, log)
}

/// Decode a raw log against one specific event descriptor
pub fn decode_log_as(event: &EventDescriptor, log: &Log) -> Result<EventLogRecord> {
    let required_topics = 1 + event.indexed_count();
    if log.topics.len() < required_topics {
        return Err(BindingError::truncated(format!(
            "event `{}` requires {} topic(s), log has {}",
            event.name(),
            required_topics,
            log.topics.len()
        )));
    }

    let plain_kinds: Vec<_> = event
        .fields()
        .iter()
        .filter(|field| !field.is_indexed())
        .map(|field| field.kind().clone())
        .collect();
    // Every non-indexed field occupies at least one 32-byte head word.
    if log.data.len() < 32 * plain_kinds.len() {
        return Err(BindingError::truncated(format!(
            "event `{}` requires at least {} data byte(s), log has {}",
            event.name(),
            32 * plain_kinds.len(),
            log.data.len()
        )));
    }
    let mut plain_tokens = abi::decode(&plain_kinds, &log.data)
        .map_err(|e| {
            BindingError::decoding(format!(
                "data payload of `{}` does not match declared fields: {}",
                event.name(),
                e
            ))
        })?
        .into_iter();

    let mut topics = log.topics[1..].iter();
    let mut fields = Vec::with_capacity(event.fields().len());
    for field in event.fields() {
        let value = if field.is_indexed() {
            let topic = topics.next().expect("topic count checked above");
            if field.kind().is_dynamic() {
                // Hash only; the preimage is not in the log.
                Token::FixedBytes(topic.as_bytes().to_vec())
            } else {
                let mut decoded =
                    abi::decode(&[field.kind().clone()], topic.as_bytes()).map_err(|e| {
                        BindingError::decoding(format!(
                            "indexed field `{}` of `{}`: {}",
                            field.name(),
                            event.name(),
                            e
                        ))
                    })?;
                decoded.remove(0)
            }
        } else {
            plain_tokens.next().expect("token count checked by decode")
        };
        fields.push(DecodedField {
            name: field.name().to_string(),
            value,
            indexed: field.is_indexed(),
        });
    }

    Ok(EventLogRecord {
        event: event.name().to_string(),
        address: log.address,
        block_number: log.block_number.unwrap_or_default().as_u64(),
        block_hash: log.block_hash,
        tx_hash: log.transaction_hash.unwrap_or_default(),
        tx_index: log.transaction_index.unwrap_or_default().as_u64(),
        log_index: log.log_index.unwrap_or_default().as_u64(),
        fields,
        raw: log.clone(),
    })
}

/// Decode every log in a receipt that was emitted by `address` for the named
/// event. Logs from other contracts or other events are skipped, not errors.
pub fn decode_receipt(
    descriptor: &ContractDescriptor,
    address: Address,
    event: &str,
    receipt: &TransactionReceipt,
) -> Result<Vec<EventLogRecord>> {
    let event = descriptor.event(event).ok_or_else(|| {
        BindingError::encoding(format!(
            "contract `{}` has no event `{}`",
            descriptor.name(),
            event
        ))
    })?;

    let records = receipt
        .logs
        .iter()
        .filter(|log| log.address == address && log.topics.first() == Some(&event.topic()))
        .map(|log| decode_log_as(event, log))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        event = event.name(),
        count = records.len(),
        "decoded receipt logs"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EventField, EventDescriptor};
    use ethers::abi::ParamType;
    use ethers::types::{Bytes, U256};

    fn transfer_descriptor() -> ContractDescriptor {
        ContractDescriptor::new(
            "Token",
            vec![],
            vec![EventDescriptor::new(
                "Transfer",
                vec![
                    EventField::indexed("from", ParamType::Address),
                    EventField::indexed("to", ParamType::Address),
                    EventField::unindexed("value", ParamType::Uint(256)),
                ],
            )],
            vec![],
        )
    }

    fn transfer_log(value: U256) -> Log {
        let descriptor = transfer_descriptor();
        let topic = descriptor.event("Transfer").unwrap().topic();
        let from = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let mut data = [0u8; 32];
        value.to_big_endian(&mut data);
        Log {
            address: Address::repeat_byte(0x11),
            topics: vec![topic, H256::from(from), H256::from(to)],
            data: Bytes::from(data.to_vec()),
            block_number: Some(7.into()),
            log_index: Some(3.into()),
            ..Default::default()
        }
    }

    #[test]
    fn transfer_log_decodes_named_fields_in_order() {
        let descriptor = transfer_descriptor();
        let record = decode_log(&descriptor, &transfer_log(1000.into())).unwrap();

        assert_eq!(record.event, "Transfer");
        let names: Vec<_> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["from", "to", "value"]);
        assert_eq!(
            record.get::<Address>("from").unwrap(),
            Address::repeat_byte(0xaa)
        );
        assert_eq!(
            record.get::<Address>("to").unwrap(),
            Address::repeat_byte(0xbb)
        );
        assert_eq!(record.get::<U256>("value").unwrap(), U256::from(1000));
        assert_eq!(record.block_number, 7);
        assert_eq!(record.log_index, 3);
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let descriptor = transfer_descriptor();
        let mut log = transfer_log(1.into());
        log.topics[0] = H256::repeat_byte(0x42);
        let err = decode_log(&descriptor, &log).unwrap_err();
        assert!(matches!(err, BindingError::UnrecognizedEvent(_)));
    }

    #[test]
    fn missing_topics_are_truncation() {
        let descriptor = transfer_descriptor();
        let mut log = transfer_log(1.into());
        log.topics.truncate(2);
        let err = decode_log(&descriptor, &log).unwrap_err();
        assert!(matches!(err, BindingError::TruncatedLog(_)));

        log.topics.clear();
        let err = decode_log(&descriptor, &log).unwrap_err();
        assert!(matches!(err, BindingError::TruncatedLog(_)));
    }

    #[test]
    fn short_data_is_truncation() {
        let descriptor = transfer_descriptor();
        let mut log = transfer_log(1.into());
        log.data = Bytes::from(vec![0u8; 16]);
        let err = decode_log(&descriptor, &log).unwrap_err();
        assert!(matches!(err, BindingError::TruncatedLog(_)));
    }

    #[test]
    fn indexed_dynamic_field_yields_topic_hash() {
        let event = EventDescriptor::new(
            "Named",
            vec![EventField::indexed("name", ParamType::String)],
        );
        let hash = H256::repeat_byte(0x5c);
        let log = Log {
            topics: vec![event.topic(), hash],
            data: Bytes::default(),
            ..Default::default()
        };
        let record = decode_log_as(&event, &log).unwrap();
        assert_eq!(
            record.field("name").unwrap(),
            &Token::FixedBytes(hash.as_bytes().to_vec())
        );
    }

    #[test]
    fn receipt_decoding_skips_foreign_logs() {
        let descriptor = transfer_descriptor();
        let ours = Address::repeat_byte(0x11);
        let mut foreign = transfer_log(5.into());
        foreign.address = Address::repeat_byte(0x99);
        let receipt = TransactionReceipt {
            logs: vec![transfer_log(1.into()), foreign, transfer_log(2.into())],
            ..Default::default()
        };

        let records = decode_receipt(&descriptor, ours, "Transfer", &receipt).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get::<U256>("value").unwrap(), U256::from(1));
        assert_eq!(records[1].get::<U256>("value").unwrap(), U256::from(2));
    }
}
