//! Availability profile HTTP handlers.
//!
//! ```text
//! POST   /api/v1/availability/profiles
//! GET    /api/v1/availability/profiles
//! GET    /api/v1/availability/profiles/{profile_id}
//! PUT    /api/v1/availability/profiles/{profile_id}
//! DELETE /api/v1/availability/profiles/{profile_id}
//! POST   /api/v1/availability/profiles/templates/{template}
//! POST   /api/v1/availability/profiles/{profile_id}/exceptions
//! POST   /api/v1/availability/profiles/{profile_id}/overrides
//! POST   /api/v1/availability/profiles/{profile_id}/regenerate
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::availability::{AvailabilityProfile, ProfileStatus, ProfileTemplate};
use crate::domain::ports::{
    CreateFromTemplateRequest, CreateProfileRequest, ProfileFilter, RegenerationSummary,
    UpdateProfileRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::rules_dto::{ExceptionBody, OverrideBody, RulesBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_enum, parse_tenant_id, parse_time_zone, parse_user_id, parse_uuid,
};

#[derive(Debug, Deserialize)]
pub(super) struct ProfilePath {
    profile_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TemplatePath {
    template: String,
}

fn active() -> String {
    ProfileStatus::Active.as_str().to_owned()
}

/// Request payload for creating a profile.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequestBody {
    pub tenant_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub rules: RulesBody,
    /// `active`, `inactive` or `draft`.
    #[serde(default = "active")]
    pub status: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial update; omitted fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequestBody {
    pub name: Option<String>,
    pub rules: Option<RulesBody>,
    pub status: Option<String>,
    pub is_default: Option<bool>,
}

/// Request payload for creating a profile from a preset.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFromTemplateRequestBody {
    pub tenant_id: String,
    pub user_id: String,
    pub name: Option<String>,
    pub time_zone: Option<String>,
}

/// Filters for listing profiles.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProfilesQuery {
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub status: Option<String>,
}

/// Profile representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub name: String,
    pub status: String,
    pub is_default: bool,
    pub rules: RulesBody,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<AvailabilityProfile> for ProfileResponse {
    fn from(profile: AvailabilityProfile) -> Self {
        Self {
            id: profile.id().to_string(),
            tenant_id: profile.tenant_id().to_string(),
            user_id: profile.user_id().to_string(),
            name: profile.name().to_owned(),
            status: profile.status().as_str().to_owned(),
            is_default: profile.is_default(),
            rules: RulesBody::from(profile.rules()),
            created_at: profile.created_at().to_rfc3339(),
            updated_at: profile.updated_at().to_rfc3339(),
        }
    }
}

/// Result of a forced regeneration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationResponse {
    #[schema(format = "uuid")]
    pub profile_id: String,
    pub slot_count: usize,
}

impl From<RegenerationSummary> for RegenerationResponse {
    fn from(summary: RegenerationSummary) -> Self {
        Self {
            profile_id: summary.profile_id.to_string(),
            slot_count: summary.slot_count,
        }
    }
}

fn parse_create_request(
    body: CreateProfileRequestBody,
    state: &HttpState,
) -> ApiResult<CreateProfileRequest> {
    Ok(CreateProfileRequest {
        tenant_id: parse_tenant_id(&body.tenant_id, FieldName::new("tenantId"))?,
        user_id: parse_user_id(&body.user_id, FieldName::new("userId"))?,
        name: body.name,
        rules: body.rules.into_rules(state.default_time_zone)?,
        status: parse_enum(&body.status, FieldName::new("status"))?,
        is_default: body.is_default,
    })
}

fn parse_update_request(
    body: UpdateProfileRequestBody,
    state: &HttpState,
) -> ApiResult<UpdateProfileRequest> {
    Ok(UpdateProfileRequest {
        name: body.name,
        rules: body
            .rules
            .map(|rules| rules.into_rules(state.default_time_zone))
            .transpose()?,
        status: body
            .status
            .as_deref()
            .map(|raw| parse_enum(raw, FieldName::new("status")))
            .transpose()?,
        is_default: body.is_default,
    })
}

fn parse_filter(query: ListProfilesQuery) -> ApiResult<ProfileFilter> {
    Ok(ProfileFilter {
        user_id: query
            .user_id
            .as_deref()
            .map(|raw| parse_user_id(raw, FieldName::new("userId")))
            .transpose()?,
        tenant_id: query
            .tenant_id
            .as_deref()
            .map(|raw| parse_tenant_id(raw, FieldName::new("tenantId")))
            .transpose()?,
        status: query
            .status
            .as_deref()
            .map(|raw| parse_enum(raw, FieldName::new("status")))
            .transpose()?,
    })
}

/// Create a profile and generate its slots.
#[utoipa::path(
    post,
    path = "/api/v1/availability/profiles",
    request_body = CreateProfileRequestBody,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "createProfile"
)]
#[post("/availability/profiles")]
pub async fn create_profile(
    state: web::Data<HttpState>,
    payload: web::Json<CreateProfileRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_request(payload.into_inner(), &state)?;
    let profile = state.availability.create_profile(request).await?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// List profiles, optionally filtered by owner and status.
#[utoipa::path(
    get,
    path = "/api/v1/availability/profiles",
    params(ListProfilesQuery),
    responses(
        (status = 200, description = "Profiles, oldest first", body = [ProfileResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "listProfiles"
)]
#[get("/availability/profiles")]
pub async fn list_profiles(
    state: web::Data<HttpState>,
    query: web::Query<ListProfilesQuery>,
) -> ApiResult<web::Json<Vec<ProfileResponse>>> {
    let filter = parse_filter(query.into_inner())?;
    let profiles = state.availability_query.list_profiles(filter).await?;
    Ok(web::Json(
        profiles.into_iter().map(ProfileResponse::from).collect(),
    ))
}

/// Fetch one profile.
#[utoipa::path(
    get,
    path = "/api/v1/availability/profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/availability/profiles/{profile_id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    path: web::Path<ProfilePath>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile_id = parse_uuid(&path.into_inner().profile_id, FieldName::new("profileId"))?;
    let profile = state.availability_query.get_profile(profile_id).await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}

/// Apply a partial update; rule and status changes regenerate slots.
#[utoipa::path(
    put,
    path = "/api/v1/availability/profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile identifier")),
    request_body = UpdateProfileRequestBody,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "updateProfile"
)]
#[put("/availability/profiles/{profile_id}")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    path: web::Path<ProfilePath>,
    payload: web::Json<UpdateProfileRequestBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile_id = parse_uuid(&path.into_inner().profile_id, FieldName::new("profileId"))?;
    let request = parse_update_request(payload.into_inner(), &state)?;
    let profile = state
        .availability
        .update_profile(profile_id, request)
        .await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}

/// Delete a profile and all of its slots.
#[utoipa::path(
    delete,
    path = "/api/v1/availability/profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Profile identifier")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "deleteProfile"
)]
#[delete("/availability/profiles/{profile_id}")]
pub async fn delete_profile(
    state: web::Data<HttpState>,
    path: web::Path<ProfilePath>,
) -> ApiResult<HttpResponse> {
    let profile_id = parse_uuid(&path.into_inner().profile_id, FieldName::new("profileId"))?;
    state.availability.delete_profile(profile_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Create an active profile from a named preset.
#[utoipa::path(
    post,
    path = "/api/v1/availability/profiles/templates/{template}",
    params(("template" = String, Path, description = "standard, extended or part_time")),
    request_body = CreateFromTemplateRequestBody,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "createProfileFromTemplate"
)]
#[post("/availability/profiles/templates/{template}")]
pub async fn create_profile_from_template(
    state: web::Data<HttpState>,
    path: web::Path<TemplatePath>,
    payload: web::Json<CreateFromTemplateRequestBody>,
) -> ApiResult<HttpResponse> {
    let template: ProfileTemplate =
        parse_enum(&path.into_inner().template, FieldName::new("template"))?;
    let body = payload.into_inner();
    let request = CreateFromTemplateRequest {
        template,
        tenant_id: parse_tenant_id(&body.tenant_id, FieldName::new("tenantId"))?,
        user_id: parse_user_id(&body.user_id, FieldName::new("userId"))?,
        name: body.name,
        time_zone: body
            .time_zone
            .as_deref()
            .map(|raw| parse_time_zone(raw, FieldName::new("timeZone")))
            .transpose()?,
    };
    let profile = state
        .availability
        .create_profile_from_template(request)
        .await?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// Append a dated exception and regenerate.
#[utoipa::path(
    post,
    path = "/api/v1/availability/profiles/{profile_id}/exceptions",
    params(("profile_id" = String, Path, description = "Profile identifier")),
    request_body = ExceptionBody,
    responses(
        (status = 200, description = "Exception added", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "addException"
)]
#[post("/availability/profiles/{profile_id}/exceptions")]
pub async fn add_exception(
    state: web::Data<HttpState>,
    path: web::Path<ProfilePath>,
    payload: web::Json<ExceptionBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile_id = parse_uuid(&path.into_inner().profile_id, FieldName::new("profileId"))?;
    let exception = payload.into_inner().into_exception()?;
    let profile = state
        .availability
        .add_exception(profile_id, exception)
        .await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}

/// Append an absolute-datetime override and regenerate.
#[utoipa::path(
    post,
    path = "/api/v1/availability/profiles/{profile_id}/overrides",
    params(("profile_id" = String, Path, description = "Profile identifier")),
    request_body = OverrideBody,
    responses(
        (status = 200, description = "Override added", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "addOverride"
)]
#[post("/availability/profiles/{profile_id}/overrides")]
pub async fn add_override(
    state: web::Data<HttpState>,
    path: web::Path<ProfilePath>,
    payload: web::Json<OverrideBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile_id = parse_uuid(&path.into_inner().profile_id, FieldName::new("profileId"))?;
    let rule = payload.into_inner().into_override()?;
    let profile = state.availability.add_override(profile_id, rule).await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}

/// Force regeneration of a profile's future slots.
#[utoipa::path(
    post,
    path = "/api/v1/availability/profiles/{profile_id}/regenerate",
    params(("profile_id" = String, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "Slots regenerated", body = RegenerationResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "regenerateProfile"
)]
#[post("/availability/profiles/{profile_id}/regenerate")]
pub async fn regenerate_profile(
    state: web::Data<HttpState>,
    path: web::Path<ProfilePath>,
) -> ApiResult<web::Json<RegenerationResponse>> {
    let profile_id = parse_uuid(&path.into_inner().profile_id, FieldName::new("profileId"))?;
    let summary = state.availability.regenerate_profile(profile_id).await?;
    Ok(web::Json(RegenerationResponse::from(summary)))
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
