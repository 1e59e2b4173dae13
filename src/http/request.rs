//! Request data handed to handlers.
//!
//! # Responsibilities
//! - Convert the transport request into an owned, immutable [`Request`]
//! - Decode query parameters on first use
//!
//! # Design Decisions
//! - The body is read fully before the handler runs
//! - Query keys and values are form-urlencoded decoded as UTF-8
//! - A missing query key is an error, not a default

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use axum::body::{Body, Bytes};
use axum::http::{Method as HttpMethod, Uri};

use crate::error::{RequestError, TransportError};
use crate::http::headers::HeaderSet;

/// HTTP request data.
#[derive(Debug, Clone)]
pub struct Request {
    method: HttpMethod,
    uri: Uri,
    headers: HeaderSet,
    body: Bytes,
    query: OnceLock<HashMap<String, String>>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Read a transport request into an owned [`Request`].
    pub async fn from_http(request: axum::http::Request<Body>) -> Result<Self, TransportError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(Request::builder()
            .method(parts.method)
            .uri(parts.uri)
            .headers(HeaderSet::from(&parts.headers))
            .body(body)
            .build())
    }

    /// The method as received, including ones no handler operation exists for.
    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// The raw request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The request body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// All query parameters. A key given more than once keeps its last value.
    pub fn query_params(&self) -> &HashMap<String, String> {
        self.query.get_or_init(|| {
            let query = self.uri.query().unwrap_or_default();
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
    }

    /// The value of the query parameter `key`.
    pub fn query_param(&self, key: &str) -> Result<&str, RequestError> {
        self.query_params()
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| RequestError::MissingQueryParam {
                key: key.to_string(),
                query: self.uri.query().unwrap_or_default().to_string(),
            })
    }

    /// The query parameter `key` parsed as `T`.
    pub fn query_param_as<T>(&self, key: &str) -> Result<T, RequestError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.query_param(key)?;
        value.parse().map_err(|e: T::Err| RequestError::InvalidQueryParam {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Copy this request into a builder.
    pub fn to_builder(&self) -> RequestBuilder {
        RequestBuilder {
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    method: HttpMethod,
    uri: Uri,
    headers: HeaderSet,
    body: Bytes,
}

impl RequestBuilder {
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            query: OnceLock::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &'static str) -> Request {
        Request::builder().uri(Uri::from_static(uri)).build()
    }

    #[test]
    fn decodes_query_params() {
        let req = request("/action/foo?name=Rex&age=3&gender=male");
        let params = req.query_params();

        assert_eq!(params.len(), 3);
        assert_eq!(params["name"], "Rex");
        assert_eq!(params["age"], "3");
        assert_eq!(params["gender"], "male");
    }

    #[test]
    fn percent_decodes_keys_and_values() {
        let req = request("/search?full%20name=Rex%20the%20Dog&q=a%3Db&city=New+York");

        assert_eq!(req.query_param("full name").unwrap(), "Rex the Dog");
        assert_eq!(req.query_param("q").unwrap(), "a=b");
        assert_eq!(req.query_param("city").unwrap(), "New York");
    }

    #[test]
    fn splits_on_first_equals_only() {
        let req = request("/x?expr=a=b");
        assert_eq!(req.query_param("expr").unwrap(), "a=b");
    }

    #[test]
    fn missing_key_is_an_error() {
        let req = request("/action/foo?name=Rex");
        let err = req.query_param("age").unwrap_err();
        assert_eq!(
            err,
            RequestError::MissingQueryParam {
                key: "age".into(),
                query: "name=Rex".into(),
            }
        );

        assert!(request("/action/foo").query_params().is_empty());
    }

    #[test]
    fn typed_query_params() {
        let req = request("/x?times=3&delay=fast");
        assert_eq!(req.query_param_as::<u32>("times").unwrap(), 3);
        assert!(matches!(
            req.query_param_as::<u64>("delay"),
            Err(RequestError::InvalidQueryParam { .. })
        ));
    }

    #[tokio::test]
    async fn from_http_reads_everything() {
        let http = axum::http::Request::builder()
            .method("POST")
            .uri("/items?id=7")
            .header("X-Trace", "abc")
            .body(Body::from("payload"))
            .unwrap();

        let req = Request::from_http(http).await.unwrap();
        assert_eq!(req.method(), HttpMethod::POST);
        assert_eq!(req.path(), "/items");
        assert_eq!(req.query_param("id").unwrap(), "7");
        assert_eq!(req.headers().get_only("x-trace").unwrap(), "abc");
        assert_eq!(req.body_text(), "payload");
    }
}
