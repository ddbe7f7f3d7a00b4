//! Extraction Service - splits spooled email messages into unit-of-work folders.

pub mod config;
pub mod models;
pub mod services;
pub mod startup;
