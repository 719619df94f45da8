//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod availability;
pub mod error;
pub mod health;
pub mod profiles;
pub mod rules_dto;
pub mod schemas;
pub mod slots;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register every availability endpoint on `cfg`.
///
/// Mount inside the `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(profiles::create_profile)
        .service(profiles::list_profiles)
        .service(profiles::create_profile_from_template)
        .service(profiles::get_profile)
        .service(profiles::update_profile)
        .service(profiles::delete_profile)
        .service(profiles::add_exception)
        .service(profiles::add_override)
        .service(profiles::regenerate_profile)
        .service(availability::query_availability)
        .service(availability::bulk_query_availability)
        .service(slots::get_slot)
        .service(slots::book_slot)
        .service(slots::release_slot);
}
