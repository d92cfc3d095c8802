use std::sync::Arc;

use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    clock::{Clock, SystemClock},
    identity::Identity,
    mongodb::MongoStore,
    store::{LedgerStore, MemoryStore},
};
use crate::service::LedgerService;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    ledger_owner: Identity,
    auth_ttl: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// The identity allowed to configure the election.
    /// Only used when the ledger is first created.
    pub fn ledger_owner(&self) -> &Identity {
        &self.ledger_owner
    }

    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign and verify JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Ledger owner is configured as '{}'", config.ledger_owner());

        Ok(rocket.manage(config))
    }
}

/// The managed handle through which the ledger is persisted.
pub type SharedStore = Arc<dyn LedgerStore>;

/// Which backend to persist the ledger in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoreKind {
    /// Lost on restart; for development only.
    Memory,
    Mongodb,
}

/// Configuration for ledger storage.
#[derive(Deserialize)]
struct StoreConfig {
    store: StoreKind,
    // secrets
    db_uri: Option<String>,
    #[serde(default = "default_db_name")]
    db_name: String,
}

fn default_db_name() -> String {
    "election_ledger".to_string()
}

/// A fairing that loads the storage config, connects to the backend,
/// performs any setup necessary, and places a [`SharedStore`] into managed state.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Ledger store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let store: SharedStore = match config.store {
            StoreKind::Memory => {
                warn!("Using in-memory store; the ledger will not survive a restart");
                Arc::new(MemoryStore::new())
            }
            StoreKind::Mongodb => {
                let Some(db_uri) = config.db_uri else {
                    error!("`db_uri` must be set when `store` is \"mongodb\"");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                match MongoStore::connect(&db_uri, &config.db_name).await {
                    Ok(store) => {
                        info!("...database connection online!");
                        Arc::new(store)
                    }
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                }
            }
        };

        Ok(rocket.manage(store))
    }
}

/// A fairing that opens the ledger from the managed store and places a
/// [`LedgerService`] into managed state.
///
/// Depends on [`Config`] and [`SharedStore`] already being managed, so must be
/// attached after the fairings responsible for those.
pub struct LedgerFairing {
    clock: Arc<dyn Clock>,
}

impl LedgerFairing {
    /// Use the system clock as the trusted time source.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for LedgerFairing {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl Fairing for LedgerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election ledger",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let (owner, store) = match (rocket.state::<Config>(), rocket.state::<SharedStore>()) {
            (Some(config), Some(store)) => (config.ledger_owner().clone(), store.clone()),
            _ => {
                error!("Config and store must be available before opening the ledger");
                return Err(rocket);
            }
        };

        info!("Opening ledger...");
        let service = match LedgerService::open(store, self.clock.clone(), &owner).await {
            Ok(service) => service,
            Err(e) => {
                error!("Failed to open ledger: {e}");
                return Err(rocket);
            }
        };
        info!("...ledger open!");

        Ok(rocket.manage(service))
    }
}
