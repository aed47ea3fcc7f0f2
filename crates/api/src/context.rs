//! Request context extraction.

use std::net::SocketAddr;

use axum::http::HeaderMap;

use iamflow_auth::ClientInfo;

pub use iamflow_auth::{IdentityContext, RequestContext};

/// Caller address and user agent.
///
/// The address comes from the first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the socket peer.
pub fn client_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
    let ip = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header(headers, "x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()));

    ClientInfo {
        ip,
        user_agent: header(headers, "user-agent").map(str::to_string),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
