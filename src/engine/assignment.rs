use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::workload::workload_by_courier;
use crate::error::AppError;
use crate::models::courier::Courier;
use crate::models::history::OrderEvent;
use crate::models::order::OrderStatus;
use crate::state::AppState;

/// Dedicated consumer of the order queue driving automatic
/// assignments. Manual requests share the assignment lock with this
/// task, so the two entry points never interleave.
pub async fn run_assignment_engine(state: Arc<AppState>, mut order_rx: mpsc::Receiver<Uuid>) {
    info!("assignment engine started");

    while let Some(order_id) = order_rx.recv().await {
        state.metrics.orders_in_queue.dec();

        let start = Instant::now();
        match assign_order(&state, order_id) {
            Ok(_courier_id) => {
                let elapsed = start.elapsed().as_secs_f64();
                state
                    .metrics
                    .assignment_latency_seconds
                    .with_label_values(&["success"])
                    .observe(elapsed);
                state
                    .metrics
                    .assignments_total
                    .with_label_values(&["success"])
                    .inc();
            }
            Err(err) => {
                let elapsed = start.elapsed().as_secs_f64();
                state
                    .metrics
                    .assignment_latency_seconds
                    .with_label_values(&["error"])
                    .observe(elapsed);
                state
                    .metrics
                    .assignments_total
                    .with_label_values(&["error"])
                    .inc();
                error!(order_id = %order_id, error = %err, "failed to assign order");
            }
        }
    }

    warn!("assignment engine stopped: queue channel closed");
}

/// Assigns the least-loaded courier to the given order. Candidates are
/// the available couriers, falling back to all couriers; ties on the
/// minimum workload are broken uniformly at random.
///
/// The whole select-and-commit sequence holds the assignment lock and
/// the order is re-validated under the final write guard, so two
/// concurrent callers cannot both assign the same order.
pub fn assign_order(state: &AppState, order_id: Uuid) -> Result<Uuid, AppError> {
    let _guard = state
        .assignment_lock
        .lock()
        .map_err(|_| AppError::Internal("assignment lock poisoned".to_string()))?;

    let order = state
        .store
        .orders
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.deleted {
        return Err(AppError::Conflict(format!("order {order_id} is deleted")));
    }
    if order.assigned_courier.is_some() || order.status != OrderStatus::Pending {
        return Err(AppError::Conflict(format!(
            "order {order_id} is not awaiting assignment"
        )));
    }

    let mut candidates: Vec<Courier> = state
        .store
        .couriers
        .iter()
        .filter(|entry| entry.value().available)
        .map(|entry| entry.value().clone())
        .collect();

    if candidates.is_empty() {
        candidates = state
            .store
            .couriers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
    }

    if candidates.is_empty() {
        return Err(AppError::NoCouriers);
    }

    let counts = workload_by_courier(&state.store);
    let workload_of = |courier: &Courier| counts.get(&courier.id).copied().unwrap_or(0);

    let min_workload = candidates
        .iter()
        .map(|courier| workload_of(courier))
        .min()
        .unwrap_or(0);

    let ties: Vec<&Courier> = candidates
        .iter()
        .filter(|courier| workload_of(courier) == min_workload)
        .collect();
    let chosen = ties[random_index(ties.len())];

    {
        let mut stored = state
            .store
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;
        // Re-check under the write guard; a status update or delete
        // may have landed since the read above.
        if stored.deleted
            || stored.assigned_courier.is_some()
            || stored.status != OrderStatus::Pending
        {
            return Err(AppError::Conflict(format!(
                "order {order_id} is not awaiting assignment"
            )));
        }
        stored.status = OrderStatus::Assigned;
        stored.assigned_courier = Some(chosen.id);
        stored.updated_at = Utc::now();
    }

    state.store.append_history(
        order_id,
        OrderEvent::Assigned {
            courier_id: chosen.id,
            workload_at_assignment: min_workload,
        },
    );

    state
        .metrics
        .courier_workload
        .with_label_values(&[&chosen.id.to_string()])
        .set((min_workload + 1) as f64);

    info!(
        order_id = %order_id,
        courier_id = %chosen.id,
        workload = min_workload,
        "order assigned"
    );

    Ok(chosen.id)
}

// A fresh v4 uuid supplies the random bits for the tie-break.
fn random_index(len: usize) -> usize {
    (Uuid::new_v4().as_u128() % len as u128) as usize
}
