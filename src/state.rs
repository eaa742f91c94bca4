use std::sync::Mutex;

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::models::courier::LocationEvent;
use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Store,
    pub order_tx: mpsc::Sender<Uuid>,
    pub location_events_tx: broadcast::Sender<LocationEvent>,
    /// Serializes every select-and-commit assignment sequence, whether
    /// it comes from the engine task or a manual request.
    pub assignment_lock: Mutex<()>,
    pub accuracy_limit: f64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        order_queue_size: usize,
        event_buffer_size: usize,
        accuracy_limit: f64,
    ) -> (Self, mpsc::Receiver<Uuid>) {
        let (order_tx, order_rx) = mpsc::channel(order_queue_size);
        let (location_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                store: Store::new(),
                order_tx,
                location_events_tx,
                assignment_lock: Mutex::new(()),
                accuracy_limit,
                metrics: Metrics::new(),
            },
            order_rx,
        )
    }
}
