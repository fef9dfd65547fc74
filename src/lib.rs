//! Job match dashboard backend
//!
//! Serves a user's scored job matches as filtered, sorted, paginated views.
//! Scoring, ingestion and authentication happen elsewhere; this crate reads
//! their output (jobs, per-user evaluations, session tokens).

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
