//! Help-desk ticketing with a CSAT survey subsystem.
//!
//! Tickets move through a small status workflow; resolving one issues a
//! one-time survey token that the customer redeems exactly once. Around
//! that sit departments, per-priority SLA targets, saved replies and a
//! knowledge base. The services are synchronous and storage-agnostic:
//! [`db::Database`] backs them with SQLite and [`store::MemoryStore`] keeps
//! everything in memory.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod departments;
pub mod error;
pub mod knowledge_base;
pub mod models;
pub mod notify;
pub mod saved_replies;
pub mod sla;
pub mod store;
pub mod surveys;
pub mod telemetry;
pub mod tickets;
pub mod users;
pub mod workflow;

pub use app::Services;
pub use error::{HelpdeskError, Result};
