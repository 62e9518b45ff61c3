//! Shared HTTP plumbing for the book manager API

use std::time::Duration;

use crate::models::ItemData;

pub const USER_AGENT: &str = "miskatonic-cli";

/// Build the agent used for all API calls.
///
/// HTTP error statuses come back as normal responses so mutation callers can
/// log them and still run their follow-up reads.
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Encode fields as an `application/x-www-form-urlencoded` body
pub fn form_urlencode(data: &ItemData) -> String {
    data.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode one path segment (ids are opaque server strings)
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
