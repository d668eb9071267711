//! Application layer orchestrating gateway transactions.
//!
//! This module defines the `TransactionRouter`, which turns each transaction
//! verb into one or more dispatches against the configured hosts.

pub mod router;
