//! Tests for profile validation and mutation.

use super::*;
use crate::test_support::availability::{at, draft, t, weekday_rules};
use rstest::rstest;

#[rstest]
#[case("")]
#[case("   ")]
fn identifiers_reject_blank_values(#[case] raw: &str) {
    assert!(matches!(
        UserId::new(raw),
        Err(ProfileValidationError::Blank { field: "userId" })
    ));
    assert!(matches!(
        TenantId::new(raw),
        Err(ProfileValidationError::Blank { field: "tenantId" })
    ));
}

#[rstest]
fn identifiers_are_trimmed() {
    let user = UserId::new("  user-1 ").expect("valid user id");
    assert_eq!(user.as_str(), "user-1");
}

#[rstest]
fn new_profile_records_creation_time() {
    let now = at("2024-01-01T08:00:00Z");
    let profile = AvailabilityProfile::new(draft("user-1"), now).expect("valid profile");

    assert_eq!(profile.created_at(), now);
    assert_eq!(profile.updated_at(), now);
    assert!(profile.is_active());
    assert_eq!(profile.name(), "Working hours");
}

#[rstest]
fn rejects_blank_name() {
    let mut input = draft("user-1");
    input.name = "  ".to_owned();
    let result = AvailabilityProfile::new(input, at("2024-01-01T08:00:00Z"));
    assert!(matches!(
        result,
        Err(ProfileValidationError::Blank { field: "name" })
    ));
}

#[rstest]
fn rejects_weekday_out_of_range() {
    let mut rules = weekday_rules();
    rules
        .working_hours
        .insert(7, WorkingHours::new(t("09:00"), t("17:00")));
    assert_eq!(
        rules.validate(),
        Err(ProfileValidationError::InvalidWeekday { day: 7 })
    );
}

#[rstest]
fn rejects_inverted_working_hours() {
    let mut rules = weekday_rules();
    rules
        .working_hours
        .insert(1, WorkingHours::new(t("17:00"), t("09:00")));
    assert!(matches!(
        rules.validate(),
        Err(ProfileValidationError::InvertedRange { .. })
    ));
}

#[rstest]
fn rejects_break_outside_working_hours() {
    let mut rules = weekday_rules();
    rules.working_hours.insert(
        1,
        WorkingHours::new(t("09:00"), t("17:00")).with_break(t("17:00"), t("18:00"), None),
    );
    assert!(matches!(
        rules.validate(),
        Err(ProfileValidationError::BreakOutsideWorkingHours { day: 1, .. })
    ));
}

#[rstest]
fn rejects_pattern_without_days() {
    let mut rules = weekday_rules();
    rules.patterns[0].days_of_week.clear();
    assert!(matches!(
        rules.validate(),
        Err(ProfileValidationError::PatternWithoutDays { .. })
    ));
}

#[rstest]
fn rejects_pattern_with_zero_capacity() {
    let mut rules = weekday_rules();
    rules.patterns[0].max_bookings_per_slot = 0;
    assert!(matches!(
        rules.validate(),
        Err(ProfileValidationError::ZeroCapacity { .. })
    ));
}

#[rstest]
fn rejects_inverted_pattern_validity() {
    let mut rules = weekday_rules();
    rules.patterns[0].valid_from = NaiveDate::from_ymd_opt(2024, 2, 1);
    rules.patterns[0].valid_until = NaiveDate::from_ymd_opt(2024, 1, 1);
    assert!(matches!(
        rules.validate(),
        Err(ProfileValidationError::InvertedValidity { .. })
    ));
}

#[rstest]
fn pattern_respects_validity_window() {
    let mut rules = weekday_rules();
    let pattern = &mut rules.patterns[0];
    pattern.valid_from = NaiveDate::from_ymd_opt(2024, 1, 2);
    pattern.valid_until = NaiveDate::from_ymd_opt(2024, 1, 3);

    let monday = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
    let thursday = NaiveDate::from_ymd_opt(2024, 1, 4).expect("valid date");

    assert!(!pattern.applies_on(monday, 1));
    assert!(pattern.applies_on(tuesday, 2));
    assert!(!pattern.applies_on(thursday, 4));
}

#[rstest]
fn limited_exception_requires_capacity() {
    let exception = AvailabilityException {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        kind: ExceptionKind::Limited,
        start_time: None,
        end_time: None,
        max_bookings: None,
        reason: None,
    };
    assert!(matches!(
        exception.validate(),
        Err(ProfileValidationError::LimitedWithoutCapacity { .. })
    ));
}

#[rstest]
fn exception_requires_complete_range() {
    let exception = AvailabilityException {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        kind: ExceptionKind::Unavailable,
        start_time: Some(t("10:00")),
        end_time: None,
        max_bookings: None,
        reason: None,
    };
    assert!(matches!(
        exception.validate(),
        Err(ProfileValidationError::PartialExceptionRange { .. })
    ));
}

#[rstest]
fn add_override_rejects_inverted_range() {
    let now = at("2024-01-01T08:00:00Z");
    let mut profile = AvailabilityProfile::new(draft("user-1"), now).expect("valid profile");
    let rule = AvailabilityOverride {
        id: Uuid::new_v4(),
        start: at("2024-01-02T10:00:00Z"),
        end: at("2024-01-02T09:00:00Z"),
        kind: OverrideKind::Unavailable,
        max_bookings: None,
        reason: None,
    };

    assert!(profile.add_override(rule, now).is_err());
    assert!(profile.rules().overrides.is_empty());
}

#[rstest]
fn mutators_bump_updated_at() {
    let created = at("2024-01-01T08:00:00Z");
    let later = at("2024-01-01T09:00:00Z");
    let mut profile = AvailabilityProfile::new(draft("user-1"), created).expect("valid profile");

    profile.set_status(ProfileStatus::Inactive, later);

    assert_eq!(profile.created_at(), created);
    assert_eq!(profile.updated_at(), later);
    assert!(!profile.is_active());
}

#[rstest]
#[case("available", Some(PatternKind::Available))]
#[case("blackout", Some(PatternKind::Blackout))]
#[case("Blackout", None)]
fn parses_pattern_kind(#[case] raw: &str, #[case] expected: Option<PatternKind>) {
    assert_eq!(raw.parse::<PatternKind>().ok(), expected);
}
