pub mod dashboard;
pub mod filter;
pub mod job;
