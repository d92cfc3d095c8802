#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;

pub use config::Config;

use config::{ConfigFairing, LedgerFairing, SharedStore, StoreFairing};
use logging::LoggerFairing;
use model::clock::Clock;

/// Build the server, with storage and the ledger set up from configuration.
pub fn build() -> Rocket<Build> {
    base().attach(StoreFairing).attach(LedgerFairing::new())
}

/// Build the server around an already-open store and an explicit trusted clock.
pub fn rocket_for_store(store: SharedStore, clock: Arc<dyn Clock>) -> Rocket<Build> {
    base()
        .manage(store)
        .attach(LedgerFairing::with_clock(clock))
}

fn base() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// The time every `#[backend_test]` clock starts at.
#[cfg(test)]
fn test_epoch() -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;

    chrono::Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
}
