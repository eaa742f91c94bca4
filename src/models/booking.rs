use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
}

impl BookingStatus {
    /// Canonical status level used by parent-order aggregation.
    pub fn level(&self) -> u8 {
        match self {
            BookingStatus::Pending => 1,
            BookingStatus::Accepted | BookingStatus::Preparing => 2,
            BookingStatus::Ready => 3,
        }
    }
}

/// A provider-specific sub-order within a parent order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub parent_order_id: Uuid,
    pub provider_id: Uuid,
    pub status: BookingStatus,
    pub price_cents: i64,
}
