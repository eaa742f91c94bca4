use std::collections::HashMap;

use uuid::Uuid;

use crate::store::Store;

/// Open-order count per courier, computed in a single pass over the
/// order table. Soft-deleted and terminal-status orders are excluded.
pub fn workload_by_courier(store: &Store) -> HashMap<Uuid, usize> {
    let mut counts = HashMap::new();

    for entry in store.orders.iter() {
        let order = entry.value();
        if order.deleted || !order.status.is_open() {
            continue;
        }
        if let Some(courier_id) = order.assigned_courier {
            *counts.entry(courier_id).or_insert(0) += 1;
        }
    }

    counts
}
