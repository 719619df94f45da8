//! Internal helpers for the availability service.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::availability::{ProfileValidationError, QueryValidationError, SlotBookingError};
use crate::domain::ports::{ProfileStoreError, SlotStoreError};

pub(crate) fn map_profile_store_error(error: ProfileStoreError) -> Error {
    match error {
        ProfileStoreError::Connection { message } => {
            Error::service_unavailable(format!("profile store unavailable: {message}"))
        }
        ProfileStoreError::Query { message } => {
            Error::internal(format!("profile store error: {message}"))
        }
    }
}

pub(crate) fn map_slot_store_error(error: SlotStoreError) -> Error {
    match error {
        SlotStoreError::Connection { message } => {
            Error::service_unavailable(format!("slot store unavailable: {message}"))
        }
        SlotStoreError::Query { message } => Error::internal(format!("slot store error: {message}")),
    }
}

pub(crate) fn map_profile_validation_error(error: ProfileValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "code": "invalid_profile",
    }))
}

pub(crate) fn map_query_validation_error(error: QueryValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "code": "invalid_query",
    }))
}

pub(crate) fn map_booking_error(error: SlotBookingError) -> Error {
    let message = error.to_string();
    match error {
        SlotBookingError::CapacityExceeded { slot_id } => {
            Error::capacity_exceeded(message).with_details(json!({ "slotId": slot_id }))
        }
        SlotBookingError::NotAvailable { slot_id, status } => Error::conflict(message)
            .with_details(json!({ "slotId": slot_id, "status": status.as_str() })),
        SlotBookingError::IncompatibleMeetingType {
            slot_id,
            meeting_type,
        } => Error::invalid_request(message)
            .with_details(json!({ "slotId": slot_id, "meetingType": meeting_type })),
        SlotBookingError::DuplicateBooking {
            slot_id,
            booking_id,
        } => Error::conflict(message)
            .with_details(json!({ "slotId": slot_id, "bookingId": booking_id })),
        SlotBookingError::BookingNotFound {
            slot_id,
            booking_id,
        } => Error::not_found(message)
            .with_details(json!({ "slotId": slot_id, "bookingId": booking_id })),
    }
}

pub(crate) fn profile_not_found(profile_id: Uuid) -> Error {
    Error::not_found(format!("profile {profile_id} not found"))
        .with_details(json!({ "profileId": profile_id }))
}

pub(crate) fn slot_not_found(slot_id: Uuid) -> Error {
    Error::not_found(format!("slot {slot_id} not found")).with_details(json!({ "slotId": slot_id }))
}
