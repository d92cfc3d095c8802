pub mod auth;
pub mod clock;
pub mod identity;
pub mod ledger;
pub mod mongodb;
pub mod store;
