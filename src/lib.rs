//! Client-side transaction router for a multi-host payment gateway.
//!
//! Requests and responses are flat string-keyed bags exchanged as XML. The
//! [`application::router::TransactionRouter`] adds host failover, GUID-based
//! targeting of follow-up transactions and the confirm step of money-moving
//! transactions.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
