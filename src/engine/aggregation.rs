use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::BookingStatus;
use crate::models::parent::ParentStatus;
use crate::store::Store;

/// Derives a parent order's status from its booking statuses.
///
/// The parent only advances once every booking has advanced: all
/// bookings ready makes the parent ready, all bookings at least
/// accepted makes it preparing, anything else leaves it pending.
/// An empty booking set stays pending.
pub fn derive_parent_status(statuses: &[BookingStatus]) -> ParentStatus {
    let Some(min_level) = statuses.iter().map(BookingStatus::level).min() else {
        return ParentStatus::Pending;
    };

    match min_level {
        3 => ParentStatus::Ready,
        2 => ParentStatus::Preparing,
        _ => ParentStatus::Pending,
    }
}

/// Recomputes and stores the derived status for one parent order.
pub fn recompute_parent(store: &Store, parent_id: Uuid) -> Result<ParentStatus, AppError> {
    let statuses: Vec<BookingStatus> = store
        .bookings_for_parent(parent_id)
        .into_iter()
        .map(|booking| booking.status)
        .collect();

    let derived = derive_parent_status(&statuses);

    let mut parent = store
        .parents
        .get_mut(&parent_id)
        .ok_or_else(|| AppError::NotFound(format!("parent order {parent_id} not found")))?;
    parent.status = derived;
    parent.updated_at = Utc::now();

    Ok(derived)
}
