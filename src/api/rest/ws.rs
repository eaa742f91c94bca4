use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::courier::{GeoFix, LocationEvent};
use crate::state::AppState;

/// Frames couriers push on the location channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "driver-online")]
    DriverOnline { courier_id: Uuid },
    #[serde(rename = "driver-location")]
    DriverLocation {
        courier_id: Uuid,
        lat: f64,
        lng: f64,
        speed: f64,
        heading: f64,
        accuracy: f64,
    },
    #[serde(rename = "driver-offline")]
    DriverOffline { courier_id: Uuid },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = BroadcastStream::new(state.location_events_tx.subscribe());

    info!("location channel client connected");

    let send_task = tokio::spawn(async move {
        while let Some(Ok(event)) = events.next().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize location event");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let Message::Text(text) = msg else { continue };

            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if let Some(event) = apply_client_message(&recv_state, message) {
                        let _ = recv_state.location_events_tx.send(event);
                    }
                }
                Err(err) => {
                    debug!(error = %err, "dropping malformed location frame");
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("location channel client disconnected");
}

/// Applies one courier frame to the store; returns the event to fan out
/// to subscribers, if any.
pub fn apply_client_message(state: &AppState, message: ClientMessage) -> Option<LocationEvent> {
    match message {
        ClientMessage::DriverOnline { courier_id } => {
            let mut courier = lookup(state, courier_id)?;
            courier.available = true;
            courier.updated_at = Utc::now();

            Some(LocationEvent {
                courier_id,
                online: true,
                fix: courier.location.clone(),
            })
        }
        ClientMessage::DriverLocation {
            courier_id,
            lat,
            lng,
            speed,
            heading,
            accuracy,
        } => {
            if accuracy > state.accuracy_limit {
                state
                    .metrics
                    .location_updates_total
                    .with_label_values(&["discarded"])
                    .inc();
                debug!(
                    courier_id = %courier_id,
                    accuracy,
                    limit = state.accuracy_limit,
                    "discarding low-accuracy fix"
                );
                return None;
            }

            let fix = GeoFix {
                lat,
                lng,
                speed,
                heading,
                accuracy,
                recorded_at: Utc::now(),
            };

            let mut courier = lookup(state, courier_id)?;
            courier.location = Some(fix.clone());
            courier.updated_at = Utc::now();

            state
                .metrics
                .location_updates_total
                .with_label_values(&["accepted"])
                .inc();

            Some(LocationEvent {
                courier_id,
                online: true,
                fix: Some(fix),
            })
        }
        ClientMessage::DriverOffline { courier_id } => {
            let mut courier = lookup(state, courier_id)?;
            courier.available = false;
            courier.updated_at = Utc::now();

            Some(LocationEvent {
                courier_id,
                online: false,
                fix: None,
            })
        }
    }
}

fn lookup(
    state: &AppState,
    courier_id: Uuid,
) -> Option<dashmap::mapref::one::RefMut<'_, Uuid, crate::models::courier::Courier>> {
    let courier = state.store.couriers.get_mut(&courier_id);
    if courier.is_none() {
        warn!(courier_id = %courier_id, "frame for unknown courier dropped");
    }
    courier
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{apply_client_message, ClientMessage};
    use crate::models::courier::Courier;
    use crate::state::AppState;

    fn state_with_courier() -> (AppState, Uuid) {
        let (state, _rx) = AppState::new(16, 16, 520.0);
        let id = Uuid::from_u128(7);
        state.store.couriers.insert(
            id,
            Courier {
                id,
                name: "tracked".to_string(),
                available: true,
                location: None,
                supervisor: None,
                updated_at: Utc::now(),
            },
        );
        (state, id)
    }

    fn location_frame(courier_id: Uuid, accuracy: f64) -> ClientMessage {
        ClientMessage::DriverLocation {
            courier_id,
            lat: 41.01,
            lng: 28.97,
            speed: 12.5,
            heading: 180.0,
            accuracy,
        }
    }

    #[test]
    fn accurate_fix_updates_courier_and_broadcasts() {
        let (state, id) = state_with_courier();

        let event = apply_client_message(&state, location_frame(id, 10.0)).unwrap();
        assert!(event.online);
        assert_eq!(event.fix.as_ref().unwrap().lat, 41.01);

        let courier = state.store.couriers.get(&id).unwrap().clone();
        assert_eq!(courier.location.unwrap().lng, 28.97);
    }

    #[test]
    fn low_accuracy_fix_is_discarded() {
        let (state, id) = state_with_courier();

        let event = apply_client_message(&state, location_frame(id, 600.0));
        assert!(event.is_none());

        let courier = state.store.couriers.get(&id).unwrap().clone();
        assert!(courier.location.is_none());
    }

    #[test]
    fn offline_frame_clears_availability() {
        let (state, id) = state_with_courier();

        let event =
            apply_client_message(&state, ClientMessage::DriverOffline { courier_id: id }).unwrap();
        assert!(!event.online);

        let courier = state.store.couriers.get(&id).unwrap().clone();
        assert!(!courier.available);
    }

    #[test]
    fn unknown_courier_frame_is_dropped() {
        let (state, _id) = state_with_courier();

        let event = apply_client_message(&state, location_frame(Uuid::from_u128(99), 10.0));
        assert!(event.is_none());
    }

    #[test]
    fn online_frame_restores_availability() {
        let (state, id) = state_with_courier();
        state.store.couriers.get_mut(&id).unwrap().available = false;

        let event =
            apply_client_message(&state, ClientMessage::DriverOnline { courier_id: id }).unwrap();
        assert!(event.online);

        let courier = state.store.couriers.get(&id).unwrap().clone();
        assert!(courier.available);
    }
}
