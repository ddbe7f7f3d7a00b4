//! Enrichment Service - turns email text and receipt images into structured records.

pub mod config;
pub mod models;
pub mod services;
pub mod startup;
