use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Created,
    Assigned {
        courier_id: Uuid,
        workload_at_assignment: usize,
    },
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },
    Deleted,
}

/// One row of the append-only per-order audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub order_id: Uuid,
    #[serde(flatten)]
    pub event: OrderEvent,
    pub at: DateTime<Utc>,
}
