use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::aggregation::{derive_parent_status, recompute_parent};
use crate::error::AppError;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::parent::{ParentOrder, ParentStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/parent-orders", post(create_parent_order))
        .route("/parent-orders/:id", get(get_parent_order))
        .route("/bookings/:id/status", patch(update_booking_status))
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub provider_id: Uuid,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct CreateParentOrderRequest {
    pub customer_name: String,
    pub delivery_address: String,
    pub bookings: Vec<CreateBookingRequest>,
}

#[derive(Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Serialize)]
pub struct ParentOrderResponse {
    #[serde(flatten)]
    pub parent: ParentOrder,
    pub bookings: Vec<Booking>,
}

#[derive(Serialize)]
pub struct BookingUpdateResponse {
    pub booking: Booking,
    pub parent_status: ParentStatus,
}

async fn create_parent_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateParentOrderRequest>,
) -> Result<Json<ParentOrderResponse>, AppError> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "customer_name cannot be empty".to_string(),
        ));
    }
    if payload.delivery_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "delivery_address cannot be empty".to_string(),
        ));
    }
    if payload.bookings.is_empty() {
        return Err(AppError::BadRequest(
            "a parent order needs at least one booking".to_string(),
        ));
    }
    if payload.bookings.iter().any(|b| b.price_cents < 0) {
        return Err(AppError::BadRequest(
            "booking prices cannot be negative".to_string(),
        ));
    }

    let now = Utc::now();
    let parent_id = Uuid::new_v4();

    let bookings: Vec<Booking> = payload
        .bookings
        .iter()
        .map(|request| Booking {
            id: Uuid::new_v4(),
            parent_order_id: parent_id,
            provider_id: request.provider_id,
            status: BookingStatus::Pending,
            price_cents: request.price_cents,
        })
        .collect();

    let statuses: Vec<BookingStatus> = bookings.iter().map(|b| b.status).collect();
    let parent = ParentOrder {
        id: parent_id,
        customer_name: payload.customer_name,
        delivery_address: payload.delivery_address,
        total_price_cents: bookings.iter().map(|b| b.price_cents).sum(),
        status: derive_parent_status(&statuses),
        created_at: now,
        updated_at: now,
    };

    state.store.parents.insert(parent_id, parent.clone());
    for booking in &bookings {
        state.store.bookings.insert(booking.id, booking.clone());
    }

    Ok(Json(ParentOrderResponse { parent, bookings }))
}

async fn get_parent_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParentOrderResponse>, AppError> {
    let parent = state
        .store
        .parents
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("parent order {id} not found")))?;

    Ok(Json(ParentOrderResponse {
        parent,
        bookings: state.store.bookings_for_parent(id),
    }))
}

async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingUpdateResponse>, AppError> {
    let booking = {
        let mut booking = state
            .store
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;
        booking.status = payload.status;
        booking.clone()
    };

    let parent_status = recompute_parent(&state.store, booking.parent_order_id)?;

    Ok(Json(BookingUpdateResponse {
        booking,
        parent_status,
    }))
}
