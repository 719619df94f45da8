//! Availability engine: profiles, slot generation, queries and booking.
//!
//! Everything here is pure domain logic. Persistence, caching and event
//! delivery are reached through the ports in [`crate::domain::ports`].

mod events;
mod generation;
mod policy;
mod profile;
mod query;
mod slot;
mod templates;

pub use self::events::{AvailabilityEvent, EventContext};
pub use self::generation::{
    GenerationWindow, SlotGenerator, dropped_bookings, local_instant, weekday_number,
};
pub use self::policy::AvailabilityPolicy;
pub use self::profile::{
    AvailabilityException, AvailabilityOverride, AvailabilityPattern, AvailabilityProfile,
    AvailabilityRules, BookingPreference, BreakInterval, ExceptionKind, MAX_WEEKDAY,
    OverrideKind, ParseExceptionKindError, ParseOverrideKindError, ParsePatternKindError,
    ParseProfileStatusError, PatternKind, ProfileDraft, ProfileStatus, ProfileValidationError,
    TenantId, UserId, WorkingHours,
};
pub use self::query::{
    AvailabilityCacheKey, AvailabilityQueryRequest, AvailabilityResult,
    BulkAvailabilityRequest, ParseRecommendationKindError, ParseTimeOfDayBucketError,
    QueryPreferences, QueryValidationError, Recommendation, RecommendationKind,
    SPARSE_RESULT_THRESHOLD, SlotConflict, TimeOfDayBucket, UserWindowSnapshot, balance,
    evaluate, merge_consecutive, optimize,
};
pub use self::slot::{
    AvailabilitySlot, ParseSlotSourceError, ParseSlotStatusError, SlotBookingError, SlotDraft,
    SlotSource, SlotStatus,
};
pub use self::templates::{ParseProfileTemplateError, ProfileTemplate};
