use crate::config::runtime::RuntimeConfig;
use crate::core::body;
use crate::domain::model::RequestDefinition;
use crate::utils::error::{ReplayError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use url::Url;

pub const VERSION_HEADER: &str = "x-version";
pub const SESSION_HEADER: &str = "x-sessionid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    /// Case-insensitive; anything outside GET/POST/PATCH is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

/// A fully assembled request, ready for a `Dispatcher`.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl BuiltRequest {
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

pub fn build(definition: &RequestDefinition, runtime: &RuntimeConfig) -> Result<BuiltRequest> {
    let method =
        HttpMethod::parse(&definition.method).ok_or_else(|| ReplayError::UnsupportedMethodError {
            definition: definition.name.clone(),
            method: definition.method.clone(),
        })?;

    let body = if method.has_body() {
        Some(body::serialize(&definition.body)?)
    } else {
        None
    };

    let mut url = runtime.base_url()?;
    url.set_path(&definition.uri);
    if !definition.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for param in &definition.query {
            pairs.append_pair(&param.key, &param.value);
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(VERSION_HEADER),
        header_value("X_VERSION", &runtime.version)?,
    );
    headers.insert(
        AUTHORIZATION,
        header_value("AUTHORIZATION", &runtime.authorization)?,
    );
    headers.insert(
        HeaderName::from_static(SESSION_HEADER),
        header_value("SESSION_ID", &runtime.session_id)?,
    );

    tracing::debug!("Built {} {} for '{}'", method.as_str(), url, definition.name);

    Ok(BuiltRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Builds every definition without sending anything, stopping at the first error.
pub fn build_all(
    definitions: &[RequestDefinition],
    runtime: &RuntimeConfig,
) -> Result<Vec<BuiltRequest>> {
    definitions.iter().map(|d| build(d, runtime)).collect()
}

pub(crate) fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ReplayError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("Not a valid HTTP header value: {}", e),
    })
}
