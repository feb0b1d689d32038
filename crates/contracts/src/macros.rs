//! Macros that expand the per-event surface of a contract wrapper
//!
//! Each contract module declares its events once; these macros derive the
//! typed record struct and the receipt/log/filter/stream accessors from that
//! declaration, so the repetitive surface is generated rather than written
//! per event by hand.

/// Declare a typed event record and its conversion from a decoded log
macro_rules! event_record {
    ($(#[$meta:meta])* $record:ident from $event:literal {
        $($field:ident: $ty:ty = $name:literal),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $record {
            $(pub $field: $ty,)*
        }

        impl $record {
            #[doc = concat!("Convert a decoded `", $event, "` log into its typed form")]
            pub fn from_record(_record: &EventLogRecord) -> Result<Self> {
                Ok(Self {
                    $($field: _record.get($name)?,)*
                })
            }
        }
    };
}

/// Derive the receipt/log/filter accessors and both stream constructors for
/// every declared event of a contract wrapper
macro_rules! event_api {
    ($contract:ident { $($event:literal => $record:ident {
        receipt: $from_receipt:ident,
        log: $from_log:ident,
        filter: $filter_fn:ident,
        stream: $by_filter:ident,
        range: $by_range:ident,
    }),+ $(,)? }) => {
        impl<M: ::ethers::providers::Middleware> $contract<M> {
            $(
                #[doc = concat!("Decode every `", $event, "` log this contract emitted in a receipt")]
                pub fn $from_receipt(
                    &self,
                    receipt: &::ethers::types::TransactionReceipt,
                ) -> Result<Vec<$record>> {
                    self.binding
                        .events_from_receipt($event, receipt)?
                        .iter()
                        .map($record::from_record)
                        .collect()
                }

                #[doc = concat!("Decode one raw log as a `", $event, "` event")]
                pub fn $from_log(&self, log: &::ethers::types::Log) -> Result<$record> {
                    $record::from_record(&self.binding.decode_log_for($event, log)?)
                }

                #[doc = concat!("Log filter pinning this contract's address and the `", $event, "` signature topic")]
                pub fn $filter_fn(&self) -> Result<::ethers::types::Filter> {
                    self.binding.event_filter($event)
                }
            )+
        }

        impl<M: ::ethers::providers::Middleware> $contract<M>
        where
            M::Provider: ::ethers::providers::PubsubClient,
        {
            $(
                #[doc = concat!("Subscribe to `", $event, "` logs with an explicit filter")]
                pub async fn $by_filter(
                    &self,
                    filter: ::ethers::types::Filter,
                ) -> Result<EventStream<'_, M::Provider>> {
                    self.binding.stream_with_filter(filter).await
                }

                #[doc = concat!("Subscribe to `", $event, "` logs over a block range")]
                pub async fn $by_range(
                    &self,
                    from_block: u64,
                    to_block: u64,
                ) -> Result<EventStream<'_, M::Provider>> {
                    let filter = self.$filter_fn()?.from_block(from_block).to_block(to_block);
                    self.binding.stream_with_filter(filter).await
                }
            )+
        }
    };
}

pub(crate) use {event_api, event_record};
