use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::courier::{Courier, GeoFix};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/couriers", post(create_courier).get(list_couriers))
        .route("/couriers/:id/availability", patch(update_availability))
        .route("/couriers/:id/location", patch(update_location))
        .route("/couriers/:id/supervisor", patch(update_supervisor))
}

#[derive(Deserialize)]
pub struct CreateCourierRequest {
    pub name: String,
    #[serde(default)]
    pub supervisor: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub available: bool,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub lat: f64,
    pub lng: f64,
    pub speed: f64,
    pub heading: f64,
    pub accuracy: f64,
}

#[derive(Deserialize)]
pub struct UpdateSupervisorRequest {
    pub supervisor: Option<Uuid>,
}

async fn create_courier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCourierRequest>,
) -> Result<Json<Courier>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let courier = Courier {
        id: Uuid::new_v4(),
        name: payload.name,
        available: true,
        location: None,
        supervisor: payload.supervisor,
        updated_at: Utc::now(),
    };

    state.store.couriers.insert(courier.id, courier.clone());
    Ok(Json(courier))
}

async fn list_couriers(State(state): State<Arc<AppState>>) -> Json<Vec<Courier>> {
    let couriers = state
        .store
        .couriers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(couriers)
}

async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Courier>, AppError> {
    let mut courier = state
        .store
        .couriers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))?;

    courier.available = payload.available;
    courier.updated_at = Utc::now();

    Ok(Json(courier.clone()))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Courier>, AppError> {
    if payload.accuracy > state.accuracy_limit {
        return Err(AppError::BadRequest(format!(
            "fix accuracy {} exceeds limit {}",
            payload.accuracy, state.accuracy_limit
        )));
    }

    let mut courier = state
        .store
        .couriers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))?;

    courier.location = Some(GeoFix {
        lat: payload.lat,
        lng: payload.lng,
        speed: payload.speed,
        heading: payload.heading,
        accuracy: payload.accuracy,
        recorded_at: Utc::now(),
    });
    courier.updated_at = Utc::now();

    Ok(Json(courier.clone()))
}

async fn update_supervisor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupervisorRequest>,
) -> Result<Json<Courier>, AppError> {
    let mut courier = state
        .store
        .couriers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))?;

    courier.supervisor = payload.supervisor;
    courier.updated_at = Utc::now();

    Ok(Json(courier.clone()))
}
