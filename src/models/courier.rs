use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single GPS fix as reported by a courier device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoFix {
    pub lat: f64,
    pub lng: f64,
    pub speed: f64,
    pub heading: f64,
    pub accuracy: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    pub id: Uuid,
    pub name: String,
    pub available: bool,
    pub location: Option<GeoFix>,
    pub supervisor: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// Event fanned out to dashboard subscribers on the location channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEvent {
    pub courier_id: Uuid,
    pub online: bool,
    pub fix: Option<GeoFix>,
}
