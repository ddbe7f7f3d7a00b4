//! Reconciliation Service - folds extracted transaction records into per-user balances.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod startup;
