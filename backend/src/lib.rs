pub mod catchers;
pub mod config;
pub mod cors;
pub mod database;
pub mod error;
pub mod routes;
pub mod store;
pub mod voter_id;

use rocket::{Build, Rocket, catchers, figment::Figment, routes};
use crate::{
    catchers::{bad_request, internal_error, not_found},
    cors::CORS,
    routes::{all_options, get_info, get_results, health_check, submit_vote, AppState},
};

/// Assembles the HTTP service around `state`.
pub fn build_rocket(figment: Figment, state: AppState) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(CORS)
        .manage(state)
        .mount(
            "/",
            routes![submit_vote, get_results, get_info, health_check, all_options],
        )
        .register(
            "/",
            catchers![bad_request, not_found, internal_error],
        )
}
