pub mod auth;
pub mod controller;
pub mod dashboard;
pub mod post_filter;
pub mod query_composer;
