//! API Gateway Event Adapter
//!
//! Converts an HTTP API (payload v2) style event into an HTTP request,
//! drives it through the application router and collects the response in
//! the gateway's response shape.

use axum::body::{to_bytes, Body};
use axum::http::{Request, Uri};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tower::ServiceExt;
use tracing::debug;

use crate::shared::error::{PlatformError, Result};

/// Inbound gateway event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    /// `"<METHOD> <path template>"`, e.g. `"POST /modules/{roleName}"`
    #[serde(default)]
    pub route_key: String,

    #[serde(default)]
    pub raw_path: Option<String>,

    #[serde(default)]
    pub raw_query_string: Option<String>,

    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub is_base64_encoded: bool,

    #[serde(default)]
    pub request_context: Option<GatewayRequestContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayRequestContext {
    #[serde(default)]
    pub http: Option<GatewayHttp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayHttp {
    pub method: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Outbound gateway response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl GatewayEvent {
    /// Method from the request context, else the route key prefix.
    pub fn method(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .map(|http| http.method.as_str())
            .or_else(|| self.route_key.split_once(' ').map(|(method, _)| method))
            .filter(|m| !m.is_empty())
    }

    /// Raw path, else the route key template with path parameters filled in.
    pub fn path(&self) -> Option<String> {
        if let Some(path) = self.raw_path.as_deref().filter(|p| !p.is_empty()) {
            return Some(path.to_string());
        }

        let (_, template) = self.route_key.split_once(' ')?;
        let mut path = template.to_string();
        if let Some(params) = &self.path_parameters {
            for (name, value) in params {
                path = path
                    .replace(&format!("{{{}+}}", name), &encode_greedy(value))
                    .replace(&format!("{{{}}}", name), &urlencoding::encode(value));
            }
        }
        Some(path)
    }

    fn decoded_body(&self) -> Result<Vec<u8>> {
        match &self.body {
            None => Ok(Vec::new()),
            Some(body) if self.is_base64_encoded => STANDARD
                .decode(body)
                .map_err(|e| PlatformError::validation(format!("Malformed base64 body: {}", e))),
            Some(body) => Ok(body.clone().into_bytes()),
        }
    }

    fn into_request(self) -> Result<Request<Body>> {
        let method = self
            .method()
            .ok_or_else(|| PlatformError::validation(format!("No implementation found for {}", self.route_key)))?
            .to_string();
        let path = self
            .path()
            .ok_or_else(|| PlatformError::validation(format!("No implementation found for {}", self.route_key)))?;

        let uri = match self.raw_query_string.as_deref().filter(|q| !q.is_empty()) {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };
        let uri: Uri = uri
            .parse()
            .map_err(|e| PlatformError::validation(format!("Invalid request path {}: {}", uri, e)))?;

        let body = self.decoded_body()?;
        let mut builder = Request::builder().method(method.as_str()).uri(uri);
        if let Some(headers) = &self.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        builder
            .body(Body::from(body))
            .map_err(|e| PlatformError::validation(format!("Invalid request: {}", e)))
    }
}

/// Greedy parameters span segments; keep their separators.
fn encode_greedy(value: &str) -> String {
    value
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Handle one gateway event with `router`.
pub async fn handle_event(router: Router, event: GatewayEvent) -> Result<GatewayResponse> {
    debug!(route_key = %event.route_key, "Handling gateway event");
    let request = event.into_request()?;

    let response = match router.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| PlatformError::internal(format!("Failed to read response body: {}", e)))?;

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let (body, is_base64_encoded) = match String::from_utf8(bytes.to_vec()) {
        Ok(text) => (text, false),
        Err(e) => (STANDARD.encode(e.into_bytes()), true),
    };

    Ok(GatewayResponse {
        status_code: parts.status.as_u16(),
        headers,
        body,
        is_base64_encoded,
    })
}
