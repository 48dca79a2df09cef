//! Request origin extraction for building file URLs.

use axum::{
    extract::FromRequestParts,
    http::{header::HOST, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::file::FileLinks;
use crate::web::handlers::AppState;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Link builder for the origin the client used to reach the server.
///
/// Uses the configured public URL when there is one; otherwise
/// `<scheme>://<host>` from the request, where the scheme comes from
/// `X-Forwarded-Proto` (default `http`) and the host from `X-Forwarded-Host`
/// or `Host`.
#[derive(Debug, Clone)]
pub struct RequestLinks(pub FileLinks);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for RequestLinks {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(url) = &state.public_url {
            return Ok(Self(FileLinks::new(url.clone())));
        }

        Ok(Self(FileLinks::new(request_origin(parts))))
    }
}

fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Derive `<scheme>://<host>` from request parts.
pub fn request_origin(parts: &Parts) -> String {
    let scheme = first_header_value(&parts.headers, FORWARDED_PROTO)
        .filter(|p| p.eq_ignore_ascii_case("http") || p.eq_ignore_ascii_case("https"))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "http".to_string());

    let host = first_header_value(&parts.headers, FORWARDED_HOST)
        .or_else(|| first_header_value(&parts.headers, HOST.as_str()))
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    format!("{scheme}://{host}")
}
