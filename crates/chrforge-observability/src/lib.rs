//! # chrforge-observability
//!
//! Structured tracing for the protocol client: subscriber setup filtered by
//! `CHRFORGE_LOG`, span macros per operation, and named log events for the
//! session, dispatch and retry paths.

pub mod tracing_setup;

pub use tracing_setup::{events, init_from_config, init_tracing, init_tracing_with_filter, spans};
