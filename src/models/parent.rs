use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParentStatus {
    Pending,
    Preparing,
    Ready,
}

/// An order bundling several provider sub-orders for one checkout.
/// `status` is derived from the bookings and rewritten on every
/// booking update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentOrder {
    pub id: Uuid,
    pub customer_name: String,
    pub delivery_address: String,
    pub total_price_cents: i64,
    pub status: ParentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
