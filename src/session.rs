//! ProcessOrders session handling
//!
//! Drives one client's bidirectional processing session: order ids come in,
//! are resolved against the shared [`OrderStore`], aggregated into combined
//! shipments, and flushed back through a bounded channel.
//!
//! ## States
//!
//! - `Open`: reading ids, emitting whenever a flush point is reached.
//! - `Draining`: input ended, remaining buckets are being emitted.
//! - `Closed`: terminal; reached on success, on error, or on cancellation.

use crate::error::{OrderError, Result};
use crate::model::CombinedShipment;
use crate::shipment::{ShipmentAggregator, DEFAULT_BATCH_SIZE};
use crate::store::OrderStore;
use std::fmt;
use std::str::FromStr;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// What a session does with an order id that is not in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingOrderPolicy {
    /// Fail the session with [`OrderError::NotFound`]
    #[default]
    Abort,
    /// Log the id and continue without touching any bucket
    Skip,
}

impl FromStr for MissingOrderPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "abort" => Ok(MissingOrderPolicy::Abort),
            "skip" => Ok(MissingOrderPolicy::Skip),
            _ => Err(format!(
                "Invalid missing order policy: {}. Must be one of: abort, skip",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Draining,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Open => "OPEN",
            SessionState::Draining => "DRAINING",
            SessionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Orders resolved and added to a bucket
    pub admitted: usize,
    /// Unknown ids ignored under [`MissingOrderPolicy::Skip`]
    pub skipped: usize,
    /// Combined shipments sent to the client
    pub shipments: usize,
    /// The session ended early because of cancellation or disconnect
    pub cancelled: bool,
}

/// Outbound half of a session
pub type ShipmentSender = mpsc::Sender<Result<CombinedShipment>>;

/// Runs ProcessOrders sessions against a shared store
///
/// Cheap to clone; every call to [`OrderProcessor::run`] gets its own
/// aggregation state.
#[derive(Clone)]
pub struct OrderProcessor {
    store: OrderStore,
    batch_size: usize,
    missing_order_policy: MissingOrderPolicy,
}

impl OrderProcessor {
    pub fn new(store: OrderStore) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
            missing_order_policy: MissingOrderPolicy::default(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_missing_order_policy(mut self, policy: MissingOrderPolicy) -> Self {
        self.missing_order_policy = policy;
        self
    }

    /// Run one session to completion
    ///
    /// # Arguments
    ///
    /// * `inbound` - Stream of order ids sent by the client
    /// * `outbound` - Channel feeding the client's response stream
    /// * `cancel` - Token cancelled on client cancellation or server shutdown
    ///
    /// # Errors
    ///
    /// Receive errors, send failures and (under [`MissingOrderPolicy::Abort`])
    /// unknown order ids end the session with that error. Nothing is written
    /// to the store in any case.
    pub async fn run<S>(
        &self,
        inbound: S,
        outbound: ShipmentSender,
        cancel: CancellationToken,
    ) -> Result<SessionSummary>
    where
        S: Stream<Item = Result<String>> + Send,
    {
        let mut session = Session {
            state: SessionState::Open,
            aggregator: ShipmentAggregator::new(self.batch_size),
            summary: SessionSummary::default(),
            outbound,
            cancel,
        };

        let result = self.drive(&mut session, inbound).await;
        session.transition(SessionState::Closed);
        result.map(|()| session.summary)
    }

    async fn drive<S>(&self, session: &mut Session, inbound: S) -> Result<()>
    where
        S: Stream<Item = Result<String>> + Send,
    {
        tokio::pin!(inbound);

        while session.state == SessionState::Open {
            let next = tokio::select! {
                biased;
                _ = session.cancel.cancelled() => {
                    tracing::debug!("Session cancelled");
                    session.summary.cancelled = true;
                    return Ok(());
                }
                _ = session.outbound.closed() => {
                    tracing::debug!("Client stopped reading, abandoning session");
                    session.summary.cancelled = true;
                    return Ok(());
                }
                next = inbound.next() => next,
            };

            match next {
                Some(Ok(order_id)) => self.admit(session, &order_id).await?,
                Some(Err(e)) => {
                    tracing::warn!("Receive failed: {}", e);
                    return Err(e);
                }
                None => session.transition(SessionState::Draining),
            }
        }

        let remaining = std::mem::take(&mut session.aggregator).drain();
        tracing::debug!("Input ended, draining {} shipment(s)", remaining.len());
        session.emit(remaining).await
    }

    async fn admit(&self, session: &mut Session, order_id: &str) -> Result<()> {
        tracing::debug!("Recv order {}", order_id);

        let order = match self.store.get(order_id).await {
            Ok(order) => order,
            Err(OrderError::NotFound(id))
                if self.missing_order_policy == MissingOrderPolicy::Skip =>
            {
                tracing::warn!("Skipping unknown order {}", id);
                session.summary.skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        session.summary.admitted += 1;
        let flushed = session.aggregator.admit(order);
        session.emit(flushed).await
    }
}

struct Session {
    state: SessionState,
    aggregator: ShipmentAggregator,
    summary: SessionSummary,
    outbound: ShipmentSender,
    cancel: CancellationToken,
}

impl Session {
    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }

    /// Send `shipments` in order, giving up as soon as the session is
    /// cancelled even if the client has stopped reading
    async fn emit(&mut self, shipments: Vec<CombinedShipment>) -> Result<()> {
        for shipment in shipments {
            tracing::info!(
                "Shipping {} ({} order(s))",
                shipment.id,
                shipment.orders.len()
            );
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Session cancelled while sending");
                    self.summary.cancelled = true;
                    return Ok(());
                }
                sent = self.outbound.send(Ok(shipment)) => {
                    sent.map_err(|_| {
                        OrderError::StreamClosed("client went away mid-flush".to_string())
                    })?;
                }
            }
            self.summary.shipments += 1;
        }
        Ok(())
    }
}
