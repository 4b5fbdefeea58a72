//! Revue API Server module
//!
//! HTTP front end for report generation.
//! Run with `revue-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};
