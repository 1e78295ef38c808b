//! Lookup relay API library
//!
//! Accepts a CPF, phone number or full name, forwards the query to the
//! upstream lookup API, parses the plain-text report into structured records
//! and optionally notifies a chat webhook.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `consultation`: Lookup workflows (validate, fetch, parse, notify).
//! - `errors`: Error handling types.
//! - `handlers`: HTTP handlers, shared state and router assembly.
//! - `lookup_client`: Upstream lookup API client.
//! - `models`: Records, request bodies and response envelopes.
//! - `notifier`: Chat webhook notifications.
//! - `report_parser`: Label-table parsing of upstream reports.
//! - `validation`: CPF checksum, formatting and query validation.

pub mod config;
pub mod consultation;
pub mod errors;
pub mod handlers;
pub mod lookup_client;
pub mod models;
pub mod notifier;
pub mod report_parser;
pub mod validation;
