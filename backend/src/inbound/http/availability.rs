//! Availability query HTTP handlers.
//!
//! ```text
//! POST /api/v1/availability/query
//! POST /api/v1/availability/bulk-query
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::availability::{
    AvailabilityQueryRequest, AvailabilityResult, BulkAvailabilityRequest, QueryPreferences,
    Recommendation, SlotConflict, TimeOfDayBucket,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::slots::SlotResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_enum, parse_rfc3339_timestamp, parse_user_id,
};

/// Availability query for one or more users.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQueryBody {
    pub user_ids: Vec<String>,
    #[schema(format = "date-time")]
    pub start_date: String,
    #[schema(format = "date-time")]
    pub end_date: String,
    /// Required meeting length in minutes.
    pub duration: u32,
    pub meeting_type: Option<String>,
    #[serde(default)]
    pub preferences: QueryPreferencesBody,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryPreferencesBody {
    /// Any of `morning`, `afternoon`, `evening`.
    #[serde(default)]
    pub time_of_day: Vec<String>,
    /// Weekday numbers, Sunday is 0.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub include_unavailable: bool,
    #[serde(default)]
    pub group_consecutive: bool,
    pub max_results: Option<usize>,
}

/// Several queries answered in one call.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkQueryBody {
    pub queries: Vec<AvailabilityQueryBody>,
    #[serde(default)]
    pub load_balance: bool,
    pub max_slots_per_query: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    #[schema(format = "uuid")]
    pub slot_id: String,
    #[schema(format = "date-time")]
    pub start: String,
    #[schema(format = "date-time")]
    pub end: String,
    pub status: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    #[schema(example = "shorter_duration")]
    pub kind: String,
    pub message: String,
    pub suggested_duration_minutes: Option<u32>,
    #[schema(format = "date")]
    pub suggested_date: Option<String>,
}

/// Availability of one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResultResponse {
    pub user_id: String,
    pub available_slots: Vec<SlotResponse>,
    pub conflicts: Vec<ConflictResponse>,
    pub next_available: Option<SlotResponse>,
    pub total_available: usize,
    pub recommendations: Vec<RecommendationResponse>,
}

impl From<SlotConflict> for ConflictResponse {
    fn from(conflict: SlotConflict) -> Self {
        Self {
            slot_id: conflict.slot_id.to_string(),
            start: conflict.start.to_rfc3339(),
            end: conflict.end.to_rfc3339(),
            status: conflict.status.as_str().to_owned(),
            reason: conflict.reason,
        }
    }
}

impl From<Recommendation> for RecommendationResponse {
    fn from(recommendation: Recommendation) -> Self {
        Self {
            kind: recommendation.kind.as_str().to_owned(),
            message: recommendation.message,
            suggested_duration_minutes: recommendation.suggested_duration_minutes,
            suggested_date: recommendation.suggested_date.map(|date| date.to_string()),
        }
    }
}

impl From<AvailabilityResult> for AvailabilityResultResponse {
    fn from(result: AvailabilityResult) -> Self {
        Self {
            user_id: result.user_id.to_string(),
            available_slots: result
                .available_slots
                .iter()
                .map(SlotResponse::from)
                .collect(),
            conflicts: result
                .conflicts
                .into_iter()
                .map(ConflictResponse::from)
                .collect(),
            next_available: result.next_available.as_ref().map(SlotResponse::from),
            total_available: result.total_available,
            recommendations: result
                .recommendations
                .into_iter()
                .map(RecommendationResponse::from)
                .collect(),
        }
    }
}

impl AvailabilityQueryBody {
    fn into_request(self) -> ApiResult<AvailabilityQueryRequest> {
        let user_ids = self
            .user_ids
            .iter()
            .map(|raw| parse_user_id(raw, FieldName::new("userIds")))
            .collect::<Result<_, _>>()?;
        let time_of_day = self
            .preferences
            .time_of_day
            .iter()
            .map(|raw| parse_enum::<TimeOfDayBucket>(raw, FieldName::new("timeOfDay")))
            .collect::<Result<_, _>>()?;
        Ok(AvailabilityQueryRequest {
            user_ids,
            start: parse_rfc3339_timestamp(&self.start_date, FieldName::new("startDate"))?,
            end: parse_rfc3339_timestamp(&self.end_date, FieldName::new("endDate"))?,
            duration_minutes: self.duration,
            meeting_type: self.meeting_type,
            preferences: QueryPreferences {
                time_of_day,
                days_of_week: self.preferences.days_of_week.into_iter().collect(),
                include_unavailable: self.preferences.include_unavailable,
                group_consecutive: self.preferences.group_consecutive,
                max_results: self.preferences.max_results,
            },
        })
    }
}

fn into_responses(results: Vec<AvailabilityResult>) -> Vec<AvailabilityResultResponse> {
    results
        .into_iter()
        .map(AvailabilityResultResponse::from)
        .collect()
}

/// Query availability across users.
#[utoipa::path(
    post,
    path = "/api/v1/availability/query",
    request_body = AvailabilityQueryBody,
    responses(
        (status = 200, description = "Per-user availability", body = [AvailabilityResultResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["availability"],
    operation_id = "queryAvailability"
)]
#[post("/availability/query")]
pub async fn query_availability(
    state: web::Data<HttpState>,
    payload: web::Json<AvailabilityQueryBody>,
) -> ApiResult<web::Json<Vec<AvailabilityResultResponse>>> {
    let request = payload.into_inner().into_request()?;
    let results = state.availability_query.query(request).await?;
    Ok(web::Json(into_responses(results)))
}

/// Answer several queries concurrently.
#[utoipa::path(
    post,
    path = "/api/v1/availability/bulk-query",
    request_body = BulkQueryBody,
    responses(
        (status = 200, description = "Results in request order", body = [Vec<AvailabilityResultResponse>]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["availability"],
    operation_id = "bulkQueryAvailability"
)]
#[post("/availability/bulk-query")]
pub async fn bulk_query_availability(
    state: web::Data<HttpState>,
    payload: web::Json<BulkQueryBody>,
) -> ApiResult<web::Json<Vec<Vec<AvailabilityResultResponse>>>> {
    let body = payload.into_inner();
    let queries = body
        .queries
        .into_iter()
        .map(AvailabilityQueryBody::into_request)
        .collect::<Result<_, _>>()?;
    let results = state
        .availability_query
        .bulk_query(BulkAvailabilityRequest {
            queries,
            load_balance: body.load_balance,
            max_slots_per_query: body.max_slots_per_query,
        })
        .await?;
    Ok(web::Json(results.into_iter().map(into_responses).collect()))
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
