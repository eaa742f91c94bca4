use dashmap::DashMap;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::courier::Courier;
use crate::models::history::{HistoryEntry, OrderEvent};
use crate::models::order::DeliveryOrder;
use crate::models::parent::ParentOrder;

/// In-memory application store. Passed explicitly to every operation;
/// there is no ambient global handle.
pub struct Store {
    pub couriers: DashMap<Uuid, Courier>,
    pub orders: DashMap<Uuid, DeliveryOrder>,
    pub parents: DashMap<Uuid, ParentOrder>,
    pub bookings: DashMap<Uuid, Booking>,
    // Kept private so history can only ever be appended to.
    history: DashMap<Uuid, Vec<HistoryEntry>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            couriers: DashMap::new(),
            orders: DashMap::new(),
            parents: DashMap::new(),
            bookings: DashMap::new(),
            history: DashMap::new(),
        }
    }

    pub fn append_history(&self, order_id: Uuid, event: OrderEvent) {
        let entry = HistoryEntry {
            order_id,
            event,
            at: chrono::Utc::now(),
        };
        self.history.entry(order_id).or_default().push(entry);
    }

    pub fn history_for(&self, order_id: Uuid) -> Vec<HistoryEntry> {
        self.history
            .get(&order_id)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn bookings_for_parent(&self, parent_id: Uuid) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|entry| entry.value().parent_order_id == parent_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
