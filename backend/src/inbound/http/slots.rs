//! Slot HTTP handlers.
//!
//! ```text
//! GET  /api/v1/availability/slots/{slot_id}
//! POST /api/v1/availability/slots/{slot_id}/book
//! POST /api/v1/availability/slots/{slot_id}/release
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::availability::AvailabilitySlot;
use crate::domain::ports::{BookSlotRequest, ReleaseSlotRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

#[derive(Debug, Deserialize)]
pub(super) struct SlotPath {
    slot_id: String,
}

/// Request payload for booking a slot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequestBody {
    pub booking_id: String,
    pub meeting_type: Option<String>,
}

/// Request payload for releasing a booking.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSlotRequestBody {
    pub booking_id: String,
}

/// Slot representation returned by every availability endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub profile_id: String,
    pub user_id: String,
    #[schema(format = "date-time")]
    pub start: String,
    #[schema(format = "date-time")]
    pub end: String,
    pub time_zone: String,
    #[schema(example = "available")]
    pub status: String,
    #[schema(example = "pattern")]
    pub source: String,
    pub max_bookings: u32,
    pub current_bookings: u32,
    pub booking_ids: Vec<String>,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub meeting_types: Vec<String>,
}

impl From<&AvailabilitySlot> for SlotResponse {
    fn from(slot: &AvailabilitySlot) -> Self {
        Self {
            id: slot.id().to_string(),
            profile_id: slot.profile_id().to_string(),
            user_id: slot.user_id().to_string(),
            start: slot.start().to_rfc3339(),
            end: slot.end().to_rfc3339(),
            time_zone: slot.time_zone().name().to_owned(),
            status: slot.status().as_str().to_owned(),
            source: slot.source().as_str().to_owned(),
            max_bookings: slot.max_bookings(),
            current_bookings: slot.current_bookings(),
            booking_ids: slot.booking_ids().to_vec(),
            buffer_before_minutes: slot.buffer_before_minutes(),
            buffer_after_minutes: slot.buffer_after_minutes(),
            meeting_types: slot.meeting_types().to_vec(),
        }
    }
}

impl From<AvailabilitySlot> for SlotResponse {
    fn from(slot: AvailabilitySlot) -> Self {
        Self::from(&slot)
    }
}

/// Fetch a single slot.
#[utoipa::path(
    get,
    path = "/api/v1/availability/slots/{slot_id}",
    params(("slot_id" = String, Path, description = "Slot identifier")),
    responses(
        (status = 200, description = "Slot", body = SlotResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["slots"],
    operation_id = "getSlot"
)]
#[get("/availability/slots/{slot_id}")]
pub async fn get_slot(
    state: web::Data<HttpState>,
    path: web::Path<SlotPath>,
) -> ApiResult<web::Json<SlotResponse>> {
    let slot_id = parse_uuid(&path.into_inner().slot_id, FieldName::new("slotId"))?;
    let slot = state.availability_query.get_slot(slot_id).await?;
    Ok(web::Json(SlotResponse::from(slot)))
}

/// Record a booking on a slot.
#[utoipa::path(
    post,
    path = "/api/v1/availability/slots/{slot_id}/book",
    params(("slot_id" = String, Path, description = "Slot identifier")),
    request_body = BookSlotRequestBody,
    responses(
        (status = 200, description = "Booking recorded", body = SlotResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Slot unavailable or full", body = ErrorSchema)
    ),
    tags = ["slots"],
    operation_id = "bookSlot"
)]
#[post("/availability/slots/{slot_id}/book")]
pub async fn book_slot(
    state: web::Data<HttpState>,
    path: web::Path<SlotPath>,
    payload: web::Json<BookSlotRequestBody>,
) -> ApiResult<web::Json<SlotResponse>> {
    let slot_id = parse_uuid(&path.into_inner().slot_id, FieldName::new("slotId"))?;
    let payload = payload.into_inner();
    let slot = state
        .availability
        .book_slot(BookSlotRequest {
            slot_id,
            booking_id: payload.booking_id,
            meeting_type: payload.meeting_type,
        })
        .await?;
    Ok(web::Json(SlotResponse::from(slot)))
}

/// Remove a booking from a slot.
#[utoipa::path(
    post,
    path = "/api/v1/availability/slots/{slot_id}/release",
    params(("slot_id" = String, Path, description = "Slot identifier")),
    request_body = ReleaseSlotRequestBody,
    responses(
        (status = 200, description = "Booking released", body = SlotResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Slot or booking not found", body = ErrorSchema)
    ),
    tags = ["slots"],
    operation_id = "releaseSlot"
)]
#[post("/availability/slots/{slot_id}/release")]
pub async fn release_slot(
    state: web::Data<HttpState>,
    path: web::Path<SlotPath>,
    payload: web::Json<ReleaseSlotRequestBody>,
) -> ApiResult<web::Json<SlotResponse>> {
    let slot_id = parse_uuid(&path.into_inner().slot_id, FieldName::new("slotId"))?;
    let slot = state
        .availability
        .release_slot(ReleaseSlotRequest {
            slot_id,
            booking_id: payload.into_inner().booking_id,
        })
        .await?;
    Ok(web::Json(SlotResponse::from(slot)))
}
