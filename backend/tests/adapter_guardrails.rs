//! Integration guardrails for the HTTP inbound adapter.
//!
//! Real Actix routes run against recording doubles of the driving ports. The
//! adapter must only translate payloads into port requests and port errors
//! into responses; it never reaches stores or the clock itself.

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use meetings_backend::Trace;
use meetings_backend::domain::availability::{
    AvailabilityException, AvailabilityOverride, AvailabilityProfile, AvailabilityQueryRequest,
    AvailabilityResult, AvailabilitySlot, BulkAvailabilityRequest, TimeOfDayBucket,
};
use meetings_backend::domain::ports::{
    AvailabilityCommand, AvailabilityQuery, BookSlotRequest, CreateFromTemplateRequest,
    CreateProfileRequest, ProfileFilter, RegenerationReport, RegenerationSummary,
    ReleaseSlotRequest, UpdateProfileRequest,
};
use meetings_backend::domain::{Error, TRACE_ID_HEADER};
use meetings_backend::inbound::http::configure;
use meetings_backend::inbound::http::state::HttpState;
use meetings_backend::test_support::availability::at;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

fn unexpected(operation: &str) -> Error {
    Error::internal(format!("unexpected call to {operation}"))
}

/// Records booking requests and fails them as if the slot store were down.
#[derive(Default)]
struct RecordingCommand {
    bookings: Mutex<Vec<BookSlotRequest>>,
}

impl RecordingCommand {
    fn bookings(&self) -> Vec<BookSlotRequest> {
        self.bookings.lock().expect("bookings lock").clone()
    }
}

#[async_trait]
impl AvailabilityCommand for RecordingCommand {
    async fn create_profile(
        &self,
        _request: CreateProfileRequest,
    ) -> Result<AvailabilityProfile, Error> {
        Err(unexpected("create_profile"))
    }

    async fn create_profile_from_template(
        &self,
        _request: CreateFromTemplateRequest,
    ) -> Result<AvailabilityProfile, Error> {
        Err(unexpected("create_profile_from_template"))
    }

    async fn update_profile(
        &self,
        _profile_id: Uuid,
        _request: UpdateProfileRequest,
    ) -> Result<AvailabilityProfile, Error> {
        Err(unexpected("update_profile"))
    }

    async fn delete_profile(&self, _profile_id: Uuid) -> Result<(), Error> {
        Err(unexpected("delete_profile"))
    }

    async fn add_exception(
        &self,
        _profile_id: Uuid,
        _exception: AvailabilityException,
    ) -> Result<AvailabilityProfile, Error> {
        Err(unexpected("add_exception"))
    }

    async fn add_override(
        &self,
        _profile_id: Uuid,
        _rule: AvailabilityOverride,
    ) -> Result<AvailabilityProfile, Error> {
        Err(unexpected("add_override"))
    }

    async fn regenerate_profile(&self, _profile_id: Uuid) -> Result<RegenerationSummary, Error> {
        Err(unexpected("regenerate_profile"))
    }

    async fn regenerate_all_active(&self) -> Result<RegenerationReport, Error> {
        Err(unexpected("regenerate_all_active"))
    }

    async fn book_slot(&self, request: BookSlotRequest) -> Result<AvailabilitySlot, Error> {
        self.bookings.lock().expect("bookings lock").push(request);
        Err(Error::service_unavailable("slot store unavailable"))
    }

    async fn release_slot(&self, _request: ReleaseSlotRequest) -> Result<AvailabilitySlot, Error> {
        Err(unexpected("release_slot"))
    }
}

/// Records queries and answers each with an empty result set.
#[derive(Default)]
struct RecordingQuery {
    queries: Mutex<Vec<AvailabilityQueryRequest>>,
}

impl RecordingQuery {
    fn queries(&self) -> Vec<AvailabilityQueryRequest> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl AvailabilityQuery for RecordingQuery {
    async fn get_profile(&self, _profile_id: Uuid) -> Result<AvailabilityProfile, Error> {
        Err(Error::internal("profile lookup exploded"))
    }

    async fn list_profiles(
        &self,
        _filter: ProfileFilter,
    ) -> Result<Vec<AvailabilityProfile>, Error> {
        Ok(Vec::new())
    }

    async fn get_slot(&self, _slot_id: Uuid) -> Result<AvailabilitySlot, Error> {
        Err(unexpected("get_slot"))
    }

    async fn query(
        &self,
        request: AvailabilityQueryRequest,
    ) -> Result<Vec<AvailabilityResult>, Error> {
        self.queries.lock().expect("queries lock").push(request);
        Ok(Vec::new())
    }

    async fn bulk_query(
        &self,
        _request: BulkAvailabilityRequest,
    ) -> Result<Vec<Vec<AvailabilityResult>>, Error> {
        Err(unexpected("bulk_query"))
    }
}

struct Harness {
    command: Arc<RecordingCommand>,
    query: Arc<RecordingQuery>,
}

#[fixture]
fn harness() -> Harness {
    Harness {
        command: Arc::new(RecordingCommand::default()),
        query: Arc::new(RecordingQuery::default()),
    }
}

macro_rules! app {
    ($harness:expr) => {
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::new(
                    $harness.command.clone(),
                    $harness.query.clone(),
                    chrono_tz::UTC,
                )))
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn query_payload_is_forwarded_verbatim(harness: Harness) {
    let app = app!(harness);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/availability/query")
        .set_json(json!({
            "userIds": ["user-1", "user-2"],
            "startDate": "2024-01-02T09:00:00+01:00",
            "endDate": "2024-01-03T00:00:00Z",
            "duration": 45,
            "meetingType": "interview",
            "preferences": {"timeOfDay": ["morning"], "daysOfWeek": [2], "maxResults": 5}
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let recorded = harness.query.queries();
    assert_eq!(recorded.len(), 1);
    let query = &recorded[0];
    let users: Vec<&str> = query.user_ids.iter().map(|id| id.as_str()).collect();
    assert_eq!(users, ["user-1", "user-2"]);
    assert_eq!(query.start, at("2024-01-02T08:00:00Z"));
    assert_eq!(query.duration_minutes, 45);
    assert_eq!(query.meeting_type.as_deref(), Some("interview"));
    assert!(query.preferences.time_of_day.contains(&TimeOfDayBucket::Morning));
    assert!(query.preferences.days_of_week.contains(&2));
    assert_eq!(query.preferences.max_results, Some(5));
}

#[rstest]
#[actix_web::test]
async fn invalid_payload_never_reaches_the_port(harness: Harness) {
    let app = app!(harness);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/availability/slots/not-a-uuid/book")
        .set_json(json!({"bookingId": "b-1"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.command.bookings().is_empty());
}

#[rstest]
#[actix_web::test]
async fn port_failures_keep_the_request_trace_id(harness: Harness) {
    let app = app!(harness);
    let slot_id = Uuid::new_v4();

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/availability/slots/{slot_id}/book"))
        .set_json(json!({"bookingId": "b-1", "meetingType": "demo"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!("service_unavailable"));
    assert_eq!(body["traceId"], json!(header));

    let bookings = harness.command.bookings();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].slot_id, slot_id);
    assert_eq!(bookings[0].meeting_type.as_deref(), Some("demo"));
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(harness: Harness) {
    let app = app!(harness);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/availability/profiles/{}", Uuid::new_v4()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], json!("Internal server error"));
}
