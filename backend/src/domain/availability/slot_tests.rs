//! Tests for slot capacity accounting.

use super::*;
use crate::test_support::availability::{at, slot_at};
use rstest::{fixture, rstest};

#[fixture]
fn single_seat() -> AvailabilitySlot {
    slot_at("2024-01-01T09:00:00Z", 30, 1)
}

#[fixture]
fn double_seat() -> AvailabilitySlot {
    slot_at("2024-01-01T09:00:00Z", 30, 2)
}

#[rstest]
fn booking_to_capacity_flips_status(mut single_seat: AvailabilitySlot) {
    single_seat.book("b-1", None).expect("first booking fits");

    assert_eq!(single_seat.status(), SlotStatus::Booked);
    assert_eq!(single_seat.current_bookings(), 1);
    assert_eq!(single_seat.booking_ids(), ["b-1".to_owned()]);
}

#[rstest]
fn booking_full_slot_is_capacity_error(mut single_seat: AvailabilitySlot) {
    single_seat.book("b-1", None).expect("first booking fits");
    let error = single_seat.book("b-2", None).expect_err("slot is full");

    assert!(matches!(error, SlotBookingError::CapacityExceeded { .. }));
    assert_eq!(single_seat.current_bookings(), 1);
}

#[rstest]
fn partial_booking_keeps_slot_available(mut double_seat: AvailabilitySlot) {
    double_seat.book("b-1", None).expect("booking fits");

    assert_eq!(double_seat.status(), SlotStatus::Available);
    double_seat.book("b-2", None).expect("second booking fits");
    assert_eq!(double_seat.status(), SlotStatus::Booked);
}

#[rstest]
fn duplicate_booking_is_rejected(mut double_seat: AvailabilitySlot) {
    double_seat.book("b-1", None).expect("booking fits");
    let error = double_seat.book("b-1", None).expect_err("duplicate booking");

    assert!(matches!(error, SlotBookingError::DuplicateBooking { .. }));
    assert_eq!(double_seat.current_bookings(), 1);
}

#[rstest]
fn blocked_slot_cannot_be_booked(mut single_seat: AvailabilitySlot) {
    single_seat.block();
    let error = single_seat.book("b-1", None).expect_err("blocked slot");

    assert!(matches!(
        error,
        SlotBookingError::NotAvailable {
            status: SlotStatus::Blocked,
            ..
        }
    ));
}

#[rstest]
#[case(vec![], Some("demo"), true)]
#[case(vec!["demo"], Some("demo"), true)]
#[case(vec!["demo"], Some("interview"), false)]
#[case(vec!["demo"], None, true)]
fn meeting_type_compatibility(
    #[case] supported: Vec<&str>,
    #[case] requested: Option<&str>,
    #[case] accepted: bool,
) {
    let mut slot = slot_at("2024-01-01T09:00:00Z", 30, 1);
    slot.meeting_types = supported.into_iter().map(str::to_owned).collect();

    let result = slot.book("b-1", requested);

    assert_eq!(result.is_ok(), accepted);
    if !accepted {
        assert!(matches!(
            result,
            Err(SlotBookingError::IncompatibleMeetingType { .. })
        ));
    }
}

#[rstest]
fn book_then_release_restores_state(mut single_seat: AvailabilitySlot) {
    let before = single_seat.clone();

    single_seat.book("b-1", None).expect("booking fits");
    single_seat.release("b-1").expect("booking present");

    assert_eq!(single_seat, before);
}

#[rstest]
fn releasing_unknown_booking_fails(mut single_seat: AvailabilitySlot) {
    let error = single_seat.release("missing").expect_err("unknown booking");
    assert!(matches!(error, SlotBookingError::BookingNotFound { .. }));
}

#[rstest]
fn limiting_capacity_never_drops_below_one(mut double_seat: AvailabilitySlot) {
    double_seat.limit_capacity(0);
    assert_eq!(double_seat.max_bookings(), 1);
}

#[rstest]
fn absorbing_bookings_raises_capacity(mut single_seat: AvailabilitySlot) {
    let carried = vec!["b-1".to_owned(), "b-2".to_owned()];

    single_seat.absorb_bookings(&carried);

    assert_eq!(single_seat.current_bookings(), 2);
    assert_eq!(single_seat.max_bookings(), 2);
    assert_eq!(single_seat.status(), SlotStatus::Booked);
}

#[rstest]
fn merging_sums_capacity_and_concatenates_bookings() {
    let mut first = slot_at("2024-01-01T09:00:00Z", 30, 1);
    let second = slot_at("2024-01-01T09:30:00Z", 30, 2);
    first.book("b-1", None).expect("booking fits");

    let merged = first.merge_with(&second);

    assert_eq!(merged.start(), at("2024-01-01T09:00:00Z"));
    assert_eq!(merged.end(), at("2024-01-01T10:00:00Z"));
    assert_eq!(merged.max_bookings(), 3);
    assert_eq!(merged.current_bookings(), 1);
    assert_eq!(merged.status(), SlotStatus::Available);
    assert_ne!(merged.id(), first.id());
}
