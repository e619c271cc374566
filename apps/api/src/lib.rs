//! Résumé and job-description screening API.
//!
//! A thin proxy in front of an external NLP service: requests are validated,
//! forwarded once, logged on success and returned unchanged. The `client`
//! module is the typed caller side of the same contract.

pub mod analysis;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod log_store;
pub mod nlp_client;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;
