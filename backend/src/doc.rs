//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: profile management, availability queries, slot booking and
//!   health probes from the inbound layer
//! - **Schemas**: request/response bodies plus domain type wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::availability::{
    AvailabilityQueryBody, AvailabilityResultResponse, BulkQueryBody, ConflictResponse,
    QueryPreferencesBody, RecommendationResponse,
};
use crate::inbound::http::profiles::{
    CreateFromTemplateRequestBody, CreateProfileRequestBody, ProfileResponse,
    RegenerationResponse, UpdateProfileRequestBody,
};
use crate::inbound::http::rules_dto::{
    BookingPreferenceBody, BreakBody, ExceptionBody, OverrideBody, PatternBody, RulesBody,
    WorkingHoursBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::slots::{BookSlotRequestBody, ReleaseSlotRequestBody, SlotResponse};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meeting availability API",
        description = "Availability profiles, slot generation, availability queries and slot booking.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::profiles::create_profile,
        crate::inbound::http::profiles::list_profiles,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::update_profile,
        crate::inbound::http::profiles::delete_profile,
        crate::inbound::http::profiles::create_profile_from_template,
        crate::inbound::http::profiles::add_exception,
        crate::inbound::http::profiles::add_override,
        crate::inbound::http::profiles::regenerate_profile,
        crate::inbound::http::availability::query_availability,
        crate::inbound::http::availability::bulk_query_availability,
        crate::inbound::http::slots::get_slot,
        crate::inbound::http::slots::book_slot,
        crate::inbound::http::slots::release_slot,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateProfileRequestBody,
        UpdateProfileRequestBody,
        CreateFromTemplateRequestBody,
        ProfileResponse,
        RegenerationResponse,
        RulesBody,
        WorkingHoursBody,
        BreakBody,
        PatternBody,
        ExceptionBody,
        OverrideBody,
        BookingPreferenceBody,
        AvailabilityQueryBody,
        QueryPreferencesBody,
        BulkQueryBody,
        AvailabilityResultResponse,
        ConflictResponse,
        RecommendationResponse,
        SlotResponse,
        BookSlotRequestBody,
        ReleaseSlotRequestBody,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "profiles", description = "Availability profiles and their rules"),
        (name = "availability", description = "Availability queries across users"),
        (name = "slots", description = "Slot lookup, booking and release"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
