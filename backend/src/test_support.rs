//! Test utilities for the backend crate.
//!
//! Shared builders and doubles for unit tests. Integration tests can reach them
//! through the `test-support` feature.

pub mod availability {
    //! Builders for profiles, rules and slots.

    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;
    use uuid::Uuid;

    use crate::domain::TimeOfDay;
    use crate::domain::availability::{
        AvailabilityPattern, AvailabilityRules, AvailabilitySlot, PatternKind, ProfileDraft,
        ProfileStatus, SlotDraft, SlotSource, TenantId, UserId, WorkingHours,
    };

    /// Parse an `HH:MM` literal.
    pub fn t(value: &str) -> TimeOfDay {
        match value.parse() {
            Ok(time) => time,
            Err(error) => panic!("fixture time '{value}' is invalid: {error}"),
        }
    }

    /// Parse an RFC 3339 literal into a UTC instant.
    pub fn at(value: &str) -> DateTime<Utc> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(instant) => instant.with_timezone(&Utc),
            Err(error) => panic!("fixture instant '{value}' is invalid: {error}"),
        }
    }

    pub fn user(value: &str) -> UserId {
        match UserId::new(value) {
            Ok(id) => id,
            Err(error) => panic!("fixture user '{value}' is invalid: {error}"),
        }
    }

    pub fn tenant() -> TenantId {
        match TenantId::new("tenant-1") {
            Ok(id) => id,
            Err(error) => panic!("fixture tenant is invalid: {error}"),
        }
    }

    /// Monday to Friday 09:00-17:00 with a 12:00-13:00 lunch break and one
    /// matching weekday pattern, in UTC.
    pub fn weekday_rules() -> AvailabilityRules {
        let mut rules = AvailabilityRules::empty(chrono_tz::UTC);
        for day in 1..=5 {
            rules.working_hours.insert(
                day,
                WorkingHours::new(t("09:00"), t("17:00")).with_break(
                    t("12:00"),
                    t("13:00"),
                    Some("Lunch"),
                ),
            );
        }
        rules.patterns.push(weekday_pattern());
        rules
    }

    pub fn weekday_pattern() -> AvailabilityPattern {
        AvailabilityPattern {
            id: Uuid::new_v4(),
            name: "Weekdays".to_owned(),
            kind: PatternKind::Available,
            days_of_week: (1..=5).collect::<BTreeSet<u8>>(),
            start_time: t("09:00"),
            end_time: t("17:00"),
            valid_from: None,
            valid_until: None,
            max_bookings_per_slot: 1,
            buffer_before_minutes: 0,
            buffer_after_minutes: 0,
            meeting_types: Vec::new(),
        }
    }

    pub fn draft(user_id: &str) -> ProfileDraft {
        ProfileDraft {
            id: Uuid::new_v4(),
            tenant_id: tenant(),
            user_id: user(user_id),
            name: "Working hours".to_owned(),
            rules: weekday_rules(),
            status: ProfileStatus::Active,
            is_default: false,
        }
    }

    /// A manual slot starting at `start` for `user-1`.
    pub fn slot_at(start: &str, minutes: i64, capacity: u32) -> AvailabilitySlot {
        let start = at(start);
        AvailabilitySlot::new(SlotDraft {
            profile_id: Uuid::nil(),
            user_id: user("user-1"),
            start,
            end: start + TimeDelta::minutes(minutes),
            time_zone: chrono_tz::UTC,
            source: SlotSource::Manual,
            max_bookings: capacity,
            buffer_before_minutes: 0,
            buffer_after_minutes: 0,
            meeting_types: Vec::new(),
        })
    }

    /// Clock pinned to a fixed instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixtureClock {
        pub utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    pub fn fixture_clock(now: &str) -> Arc<dyn Clock> {
        Arc::new(FixtureClock { utc_now: at(now) })
    }
}
