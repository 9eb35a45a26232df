pub mod classifier;
pub mod clock;
pub mod config;
pub mod fetcher;
pub mod ledger;
pub mod roster;
pub mod summary;
