//! Log filters, range queries, and live event streams
//!
//! A filter pins the contract address and one event signature topic. The
//! closed-range query returns a finite sequence ordered by (block number,
//! log index); the subscription form yields records as logs arrive and can
//! be re-issued from any block to restart after a disconnect.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use ethers::providers::{Middleware, PubsubClient, SubscriptionStream};
use ethers::types::{Filter, Log, U256};
use futures::Stream;
use tracing::{debug, warn};

use crate::binding::ContractBinding;
use crate::descriptor::ContractDescriptor;
use crate::error::{BindingError, Result};
use crate::event::{decode_log, EventLogRecord};

impl<M: Middleware> ContractBinding<M> {
    /// Build a log filter for one event: this contract's address plus the
    /// event's signature hash as the single topic.
    pub fn event_filter(&self, event: &str) -> Result<Filter> {
        let event = self.descriptor().event(event).ok_or_else(|| {
            BindingError::encoding(format!(
                "contract `{}` has no event `{}`",
                self.descriptor().name(),
                event
            ))
        })?;
        Ok(Filter::new()
            .address(self.address())
            .topic0(event.topic()))
    }

    /// One-shot query over a closed block range. Records come back ordered
    /// strictly by ascending (block number, log index); a range with no
    /// matching logs yields an empty sequence.
    pub async fn query_events(
        &self,
        event: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLogRecord>> {
        if from_block > to_block {
            warn!(
                from = from_block,
                to = to_block,
                "invalid block range, returning empty"
            );
            return Ok(Vec::new());
        }

        let filter = self
            .event_filter(event)?
            .from_block(from_block)
            .to_block(to_block);
        debug!(event, from = from_block, to = to_block, "querying logs");

        let logs = self
            .client()
            .get_logs(&filter)
            .await
            .map_err(|e| BindingError::remote(e.to_string()))?;
        debug!(event, count = logs.len(), "fetched logs");

        let mut records = logs
            .iter()
            .map(|log| decode_log(self.descriptor(), log))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|record| (record.block_number, record.log_index));
        Ok(records)
    }
}

impl<M: Middleware> ContractBinding<M>
where
    M::Provider: PubsubClient,
{
    /// Subscribe to an event from the next block onward
    pub async fn stream_events(&self, event: &str) -> Result<EventStream<'_, M::Provider>> {
        let filter = self.event_filter(event)?;
        self.stream_with_filter(filter).await
    }

    /// Subscribe to an event, re-issuing the filter from a given block.
    /// Useful to resume a dropped subscription without gaps.
    pub async fn stream_events_from_block(
        &self,
        event: &str,
        from_block: u64,
    ) -> Result<EventStream<'_, M::Provider>> {
        let filter = self.event_filter(event)?.from_block(from_block);
        self.stream_with_filter(filter).await
    }

    /// Subscribe with an explicit filter, e.g. one narrowed by extra topics
    pub async fn stream_with_filter(
        &self,
        filter: Filter,
    ) -> Result<EventStream<'_, M::Provider>> {
        let inner = self
            .client()
            .subscribe_logs(&filter)
            .await
            .map_err(|e| BindingError::remote(e.to_string()))?;
        debug!(id = %inner.id, contract = self.descriptor().name(), "log subscription open");
        Ok(EventStream {
            inner,
            descriptor: Arc::clone(self.descriptor()),
        })
    }
}

/// An unbounded, order-preserving stream of decoded event records.
///
/// Dropping the stream cancels the underlying subscription; [`unsubscribe`]
/// does the same explicitly and reports whether the node acknowledged it.
/// Cancellation never affects records already delivered.
///
/// [`unsubscribe`]: EventStream::unsubscribe
pub struct EventStream<'a, P: PubsubClient> {
    inner: SubscriptionStream<'a, P, Log>,
    descriptor: Arc<ContractDescriptor>,
}

impl<'a, P: PubsubClient> EventStream<'a, P> {
    /// The node-assigned subscription id
    pub fn id(&self) -> U256 {
        self.inner.id
    }

    /// Cancel the subscription. Stops further decoding immediately; in-flight
    /// notifications are discarded, not awaited.
    pub async fn unsubscribe(self) -> Result<bool> {
        self.inner
            .unsubscribe()
            .await
            .map_err(|e| BindingError::remote(e.to_string()))
    }
}

impl<'a, P: PubsubClient> Stream for EventStream<'a, P> {
    type Item = Result<EventLogRecord>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(log)) => Poll::Ready(Some(decode_log(&self.descriptor, &log))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
