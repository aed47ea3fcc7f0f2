//! HTTP API: identity binding, routing, and request/response mapping.

pub mod allowlist;
pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
