use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::assignment::assign_order;
use crate::engine::queue::enqueue_order;
use crate::error::AppError;
use crate::models::history::{HistoryEntry, OrderEvent};
use crate::models::order::{DeliveryOrder, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order).delete(delete_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/orders/:id/assign", post(assign_order_now))
        .route("/orders/:id/history", get(get_order_history))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub pickup_address: String,
    pub dropoff_address: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<DeliveryOrder>, AppError> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "customer_name cannot be empty".to_string(),
        ));
    }
    if payload.pickup_address.trim().is_empty() || payload.dropoff_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "pickup and dropoff addresses are required".to_string(),
        ));
    }

    let now = Utc::now();
    let order = DeliveryOrder {
        id: Uuid::new_v4(),
        customer_name: payload.customer_name,
        pickup_address: payload.pickup_address,
        dropoff_address: payload.dropoff_address,
        status: OrderStatus::Pending,
        assigned_courier: None,
        deleted: false,
        created_at: now,
        updated_at: now,
    };

    state.store.orders.insert(order.id, order.clone());
    state.store.append_history(order.id, OrderEvent::Created);
    enqueue_order(&state, order.id).await?;

    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryOrder>, AppError> {
    let order = fetch_live_order(&state, id)?;
    Ok(Json(order))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<DeliveryOrder>, AppError> {
    let previous = fetch_live_order(&state, id)?.status;

    let updated = {
        let mut order = state
            .store
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
        order.status = payload.status;
        order.updated_at = Utc::now();
        order.clone()
    };

    if previous != payload.status {
        state.store.append_history(
            id,
            OrderEvent::StatusChanged {
                from: previous,
                to: payload.status,
            },
        );
    }

    Ok(Json(updated))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    // Soft delete; the row stays for the audit trail but drops out of
    // reads and workload counts.
    fetch_live_order(&state, id)?;

    if let Some(mut order) = state.store.orders.get_mut(&id) {
        order.deleted = true;
        order.updated_at = Utc::now();
    }
    state.store.append_history(id, OrderEvent::Deleted);

    Ok(StatusCode::NO_CONTENT)
}

async fn assign_order_now(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryOrder>, AppError> {
    assign_order(&state, id)?;
    let order = fetch_live_order(&state, id)?;
    Ok(Json(order))
}

async fn get_order_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    if !state.store.orders.contains_key(&id) {
        return Err(AppError::NotFound(format!("order {id} not found")));
    }
    Ok(Json(state.store.history_for(id)))
}

fn fetch_live_order(state: &AppState, id: Uuid) -> Result<DeliveryOrder, AppError> {
    let order = state
        .store
        .orders
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    if order.deleted {
        return Err(AppError::NotFound(format!("order {id} not found")));
    }

    Ok(order)
}
