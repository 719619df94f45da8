//! End-to-end behaviour of the availability service over its real adapters:
//! in-memory stores, the moka cache and the broadcast event bus.

use std::sync::Arc;
use std::time::Duration;

use meetings_backend::domain::availability::{
    AvailabilityEvent, AvailabilityPolicy, AvailabilityQueryRequest, ProfileStatus,
    QueryPreferences,
};
use meetings_backend::domain::ports::{
    AvailabilityCommand, AvailabilityQuery, BookSlotRequest, CreateProfileRequest,
    ReleaseSlotRequest, UpdateProfileRequest,
};
use meetings_backend::domain::{AvailabilityService, ErrorCode};
use meetings_backend::outbound::cache::MokaAvailabilityCache;
use meetings_backend::outbound::events::BroadcastEventBus;
use meetings_backend::outbound::memory::{InMemoryProfileStore, InMemorySlotStore};
use meetings_backend::test_support::availability::{at, fixture_clock, tenant, user, weekday_rules};
use rstest::{fixture, rstest};
use tokio::sync::broadcast;

type Service = AvailabilityService<InMemoryProfileStore, InMemorySlotStore>;

const NOW: &str = "2024-01-01T08:00:00Z";

struct Stack {
    service: Arc<Service>,
    events: broadcast::Receiver<AvailabilityEvent>,
}

#[fixture]
fn stack() -> Stack {
    let bus = Arc::new(BroadcastEventBus::new(64));
    let events = bus.subscribe();
    let service = AvailabilityService::new(
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(InMemorySlotStore::new()),
        fixture_clock(NOW),
        AvailabilityPolicy::default(),
    )
    .with_cache(Arc::new(MokaAvailabilityCache::new(Duration::from_secs(300))))
    .with_events(bus);
    Stack {
        service: Arc::new(service),
        events,
    }
}

fn create_request(user_id: &str) -> CreateProfileRequest {
    CreateProfileRequest {
        tenant_id: tenant(),
        user_id: user(user_id),
        name: "Working hours".to_owned(),
        rules: weekday_rules(),
        status: ProfileStatus::Active,
        is_default: false,
    }
}

fn tuesday_query(user_id: &str) -> AvailabilityQueryRequest {
    AvailabilityQueryRequest {
        user_ids: vec![user(user_id)],
        start: at("2024-01-02T00:00:00Z"),
        end: at("2024-01-03T00:00:00Z"),
        duration_minutes: 30,
        meeting_type: None,
        preferences: QueryPreferences::default(),
    }
}

fn drain(events: &mut broadcast::Receiver<AvailabilityEvent>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.name());
    }
    names
}

#[rstest]
#[tokio::test]
async fn booking_flow_publishes_lifecycle_events(stack: Stack) {
    let Stack {
        service,
        mut events,
    } = stack;

    service
        .create_profile(create_request("user-1"))
        .await
        .expect("profile is created");
    let results = service
        .query(tuesday_query("user-1"))
        .await
        .expect("query succeeds");
    let slot_id = results[0].available_slots[0].id();

    let booked = service
        .book_slot(BookSlotRequest {
            slot_id,
            booking_id: "booking-1".to_owned(),
            meeting_type: None,
        })
        .await
        .expect("slot is booked");
    assert_eq!(booked.current_bookings(), 1);

    service
        .release_slot(ReleaseSlotRequest {
            slot_id,
            booking_id: "booking-1".to_owned(),
        })
        .await
        .expect("booking is released");

    assert_eq!(
        drain(&mut events),
        vec![
            "profileCreated",
            "slotsRegenerated",
            "slotBooked",
            "slotReleased"
        ]
    );
}

#[rstest]
#[tokio::test]
async fn cached_snapshots_are_served_until_expiry(stack: Stack) {
    let service = stack.service;
    service
        .create_profile(create_request("user-1"))
        .await
        .expect("profile is created");

    let first = service
        .query(tuesday_query("user-1"))
        .await
        .expect("query succeeds");
    assert_eq!(first[0].total_available, 14);
    let slot_id = first[0].available_slots[0].id();
    service
        .book_slot(BookSlotRequest {
            slot_id,
            booking_id: "booking-1".to_owned(),
            meeting_type: None,
        })
        .await
        .expect("slot is booked");

    let second = service
        .query(tuesday_query("user-1"))
        .await
        .expect("query succeeds");
    assert_eq!(second[0].total_available, 14);

    let fresh = service.get_slot(slot_id).await.expect("slot exists");
    assert_eq!(fresh.booking_ids(), ["booking-1".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn regeneration_keeps_existing_bookings(stack: Stack) {
    let service = stack.service;
    let profile = service
        .create_profile(create_request("user-1"))
        .await
        .expect("profile is created");
    let slot_id = service
        .query(tuesday_query("user-1"))
        .await
        .expect("query succeeds")[0]
        .available_slots[0]
        .id();
    service
        .book_slot(BookSlotRequest {
            slot_id,
            booking_id: "booking-1".to_owned(),
            meeting_type: None,
        })
        .await
        .expect("slot is booked");

    let summary = service
        .regenerate_profile(profile.id())
        .await
        .expect("regeneration succeeds");
    assert!(summary.slot_count > 0);

    let slot = service.get_slot(slot_id).await.expect("slot survives");
    assert_eq!(slot.current_bookings(), 1);
    assert_eq!(slot.booking_ids(), ["booking-1".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn deactivated_profiles_are_skipped_by_bulk_regeneration(stack: Stack) {
    let service = stack.service;
    let active = service
        .create_profile(create_request("user-1"))
        .await
        .expect("profile is created");
    let paused = service
        .create_profile(create_request("user-2"))
        .await
        .expect("profile is created");
    service
        .update_profile(
            paused.id(),
            UpdateProfileRequest {
                status: Some(ProfileStatus::Inactive),
                ..UpdateProfileRequest::default()
            },
        )
        .await
        .expect("profile is deactivated");

    let report = service
        .regenerate_all_active()
        .await
        .expect("regeneration runs");

    assert_eq!(report.profiles, 1);
    assert!(report.failed.is_empty());
    assert!(report.slots > 0);
    let remaining = service
        .list_profiles(Default::default())
        .await
        .expect("profiles list");
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().any(|p| p.id() == active.id()));
}

#[rstest]
#[tokio::test]
async fn deleting_a_profile_removes_its_slots(stack: Stack) {
    let service = stack.service;
    let profile = service
        .create_profile(create_request("user-1"))
        .await
        .expect("profile is created");
    let slot_id = service
        .query(tuesday_query("user-1"))
        .await
        .expect("query succeeds")[0]
        .available_slots[0]
        .id();

    service
        .delete_profile(profile.id())
        .await
        .expect("profile is deleted");

    let err = service
        .get_slot(slot_id)
        .await
        .expect_err("slot is removed with its profile");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
