//! Delivery queue with single-flight processing.

use crate::{DeliveryEvent, DeliveryStatus, FailureReason, OutboxError, OutboxResult, SendRequest};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info, warn};
use transport_contract::{MessagePayload, OutboundMessage, SendReceipt, Transport, TransportResult};

/// Delivery configuration, shared by every item in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Bound on a single delivery attempt.
    pub send_timeout: Duration,
    /// Attempts per item, counting the first try.
    pub max_retries: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

/// Returned by `enqueue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueReceipt {
    pub request_id: String,
    /// Queue length right after the append.
    pub in_queue: usize,
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<SendRequest>,
    /// Sequence number of the attempt currently in flight.
    in_flight: Option<u64>,
    next_attempt_seq: u64,
}

/// Everything a running attempt needs, copied out of the head item.
struct Attempt {
    seq: u64,
    request_id: String,
    destination: String,
    payload: MessagePayload,
    number: u32,
}

enum AttemptOutcome {
    Delivered(SendReceipt),
    Failed(FailureReason),
}

/// FIFO delivery queue. Only the head item is ever attempted, and at most
/// one attempt runs at a time.
pub struct DeliveryQueue {
    config: DeliveryConfig,
    transport: Arc<dyn Transport>,
    state: Mutex<QueueState>,
    event_tx: broadcast::Sender<DeliveryEvent>,
}

impl DeliveryQueue {
    /// Create a new queue sending through `transport`.
    pub fn new(config: DeliveryConfig, transport: Arc<dyn Transport>) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(256);

        Arc::new(Self {
            config,
            transport,
            state: Mutex::new(QueueState::default()),
            event_tx,
        })
    }

    /// Subscribe to delivery events.
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
        self.event_tx.subscribe()
    }

    /// Append a message and kick processing. Never waits on delivery.
    pub fn enqueue(self: &Arc<Self>, message: OutboundMessage) -> OutboxResult<EnqueueReceipt> {
        if message.destination.trim().is_empty() {
            return Err(OutboxError::InvalidRequest(
                "destination is required".to_string(),
            ));
        }

        let request = SendRequest::new(message);
        let request_id = request.id.clone();

        let in_queue = {
            let mut state = self.state.lock();
            state.items.push_back(request);
            state.items.len()
        };

        debug!(request_id = %request_id, in_queue, "Enqueued delivery");

        self.process_next();

        Ok(EnqueueReceipt {
            request_id,
            in_queue,
        })
    }

    /// Start an attempt for the head item unless one is already running.
    ///
    /// Safe to call any number of times from anywhere.
    pub fn process_next(self: &Arc<Self>) {
        let attempt = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if state.in_flight.is_some() {
                return;
            }
            let Some(head) = state.items.front_mut() else {
                return;
            };

            state.next_attempt_seq += 1;
            let seq = state.next_attempt_seq;
            state.in_flight = Some(seq);
            head.status = DeliveryStatus::InFlight;

            Attempt {
                seq,
                request_id: head.id.clone(),
                destination: head.destination.clone(),
                payload: head.payload.clone(),
                number: head.attempt_count + 1,
            }
        };

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            queue.run_attempt(attempt).await;
        });
    }

    async fn run_attempt(self: Arc<Self>, attempt: Attempt) {
        info!(
            request_id = %attempt.request_id,
            destination = %attempt.destination,
            attempt = attempt.number,
            max_attempts = self.config.max_retries,
            "Processing delivery"
        );
        let _ = self.event_tx.send(DeliveryEvent::Attempting {
            request_id: attempt.request_id.clone(),
            destination: attempt.destination.clone(),
            attempt: attempt.number,
        });

        let outcome = self.race_send(&attempt).await;
        self.finalize(attempt.seq, outcome);
    }

    /// Race the transport call against the attempt timeout.
    ///
    /// The call runs in its own task and reports over a oneshot. If the
    /// timeout wins, the receiver is dropped and the late result has nowhere
    /// to go. The call itself is not cancelled.
    async fn race_send(&self, attempt: &Attempt) -> AttemptOutcome {
        let (result_tx, result_rx) = oneshot::channel::<TransportResult<SendReceipt>>();

        let transport = Arc::clone(&self.transport);
        let destination = attempt.destination.clone();
        let payload = attempt.payload.clone();
        tokio::spawn(async move {
            let result = transport.send(&destination, &payload).await;
            if result_tx.send(result).is_err() {
                debug!(destination = %destination, "Discarding late transport result");
            }
        });

        match tokio::time::timeout(self.config.send_timeout, result_rx).await {
            Ok(Ok(Ok(receipt))) => AttemptOutcome::Delivered(receipt),
            Ok(Ok(Err(e))) => AttemptOutcome::Failed(FailureReason::Transport(e)),
            Ok(Err(_)) => {
                error!(destination = %attempt.destination, "Send task ended without a result");
                AttemptOutcome::Failed(FailureReason::Aborted)
            }
            Err(_) => {
                warn!(
                    destination = %attempt.destination,
                    timeout_ms = self.config.send_timeout.as_millis() as u64,
                    "Delivery attempt timed out"
                );
                AttemptOutcome::Failed(FailureReason::TimedOut)
            }
        }
    }

    /// Apply an attempt's outcome to the head item.
    ///
    /// Returns false (and changes nothing) when `seq` is not the attempt in
    /// flight, so a given attempt can only be finalized once.
    fn finalize(self: &Arc<Self>, seq: u64, outcome: AttemptOutcome) -> bool {
        let (event, has_more) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if state.in_flight != Some(seq) {
                debug!(seq, "Ignoring outcome of a stale attempt");
                return false;
            }
            state.in_flight = None;

            let Some(head) = state.items.front_mut() else {
                return false;
            };
            let attempt = head.attempt_count + 1;

            let event = match outcome {
                AttemptOutcome::Delivered(receipt) => {
                    head.status = DeliveryStatus::Sent;
                    info!(
                        request_id = %head.id,
                        destination = %head.destination,
                        attempt,
                        message_id = receipt.message_id.as_deref().unwrap_or(""),
                        "Delivery sent"
                    );
                    state
                        .items
                        .pop_front()
                        .map(|request| DeliveryEvent::Sent { request, attempt })
                }
                AttemptOutcome::Failed(reason) => {
                    head.attempt_count += 1;
                    if head.attempt_count >= self.config.max_retries {
                        head.status = DeliveryStatus::Failed;
                        error!(
                            request_id = %head.id,
                            destination = %head.destination,
                            attempts = head.attempt_count,
                            reason = %reason,
                            "Delivery failed permanently"
                        );
                        state
                            .items
                            .pop_front()
                            .map(|request| DeliveryEvent::Failed { request, reason })
                    } else {
                        head.status = DeliveryStatus::Pending;
                        warn!(
                            request_id = %head.id,
                            destination = %head.destination,
                            attempt,
                            reason = %reason,
                            "Delivery attempt failed, will retry"
                        );
                        Some(DeliveryEvent::Retrying {
                            request_id: head.id.clone(),
                            destination: head.destination.clone(),
                            attempt,
                            reason,
                        })
                    }
                }
            };

            (event, !state.items.is_empty())
        };

        if let Some(event) = event {
            let _ = self.event_tx.send(event);
        }

        if has_more {
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                queue.process_next();
            });
        }

        true
    }

    /// Number of items not yet terminal.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Whether a delivery attempt is currently running.
    pub fn is_processing(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Copy of the queued items, head first.
    pub fn snapshot(&self) -> Vec<SendRequest> {
        self.state.lock().items.iter().cloned().collect()
    }
}
