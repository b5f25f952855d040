use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Domain events emitted after successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Machine events
    MachineStatusChanged {
        machine_id: Uuid,
        new_status: String,
    },

    // Shift report events
    ReportRowAdded {
        row_id: Uuid,
        order_id: Option<Uuid>,
        actual_qty: i32,
    },
    ReportRowDeleted {
        row_id: Uuid,
        order_id: Option<Uuid>,
        actual_qty: i32,
    },

    // Material request events
    MaterialRequestCreated {
        request_id: Uuid,
        order_id: Uuid,
        recipe_id: Uuid,
    },
    MaterialRequestRecalculated {
        request_id: Uuid,
    },

    // Emitted by the repair sweep when a stored counter disagreed with
    // the live row sum.
    CompletedQtyDriftRepaired {
        order_id: Uuid,
        stored: i32,
        computed: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Failures mean the consumer is
    /// gone; callers log them and carry on.
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }
}

/// Background consumer draining the event channel. Currently events are
/// only logged; downstream consumers attach here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::CompletedQtyDriftRepaired {
                order_id,
                stored,
                computed,
            } => {
                warn!(
                    order_id = %order_id,
                    stored = stored,
                    computed = computed,
                    "Completed quantity drift repaired"
                );
            }
            other => {
                info!(event = ?other, "Event processed");
            }
        }
    }
    info!("Event channel closed; processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let order_id = Uuid::new_v4();

        sender.send(Event::OrderCreated(order_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_to_dropped_receiver_is_an_event_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let err = sender
            .send(Event::OrderCreated(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EventError(_)));
    }
}
