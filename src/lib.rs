pub mod apis;
pub mod classify;
pub mod config;
pub mod constants;
pub mod demo;
pub mod error;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod types;

// Domain data shapes shared across layers
pub mod domain;
