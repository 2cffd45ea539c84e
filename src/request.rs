use reqwest::Url;
use serde::Serialize;

use crate::ApiError;

const CONTENT_TYPE: &str = "Content-Type";
const ACCEPT: &str = "Accept";
const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";
const APPLICATION_JSON: &str = "application/json";

/// HTTP method supported by the service layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Fully resolved request handed to the executor.
///
/// The executor never inspects or changes a request; every attempt sends an
/// identical clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::Post, url)
    }

    /// Appends a header. Once any header is set, the defaults are no longer applied.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Attaches a body. Bodies are dropped for `GET` requests.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        if self.method != Method::Get {
            self.body = Some(body.into());
        }
        self
    }

    /// Serialises `value` as pretty-printed JSON and attaches it as the body.
    pub fn with_json_body<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec_pretty(value)
            .map_err(|err| ApiError::Serialize(format!("invalid request body: {err}")))?;
        Ok(self.with_body(body))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Headers sent on the wire.
    ///
    /// Without explicit headers the request advertises a form-encoded body and
    /// asks for JSON back.
    pub fn headers(&self) -> Vec<(&str, &str)> {
        if self.headers.is_empty() {
            return vec![(CONTENT_TYPE, FORM_URL_ENCODED), (ACCEPT, APPLICATION_JSON)];
        }
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;
    use serde_json::json;

    use super::{Method, Request};

    fn url() -> Url {
        Url::parse("https://gateway.marvel.com/v1/public/characters").expect("valid url")
    }

    #[test]
    fn default_headers_apply_when_none_set() {
        let request = Request::get(url());
        assert_eq!(
            request.headers(),
            vec![
                ("Content-Type", "application/x-www-form-urlencoded"),
                ("Accept", "application/json"),
            ]
        );
    }

    #[test]
    fn explicit_headers_replace_defaults() {
        let request = Request::get(url()).with_header("Accept", "text/plain");
        assert_eq!(request.headers(), vec![("Accept", "text/plain")]);
    }

    #[test]
    fn get_request_drops_body() {
        let request = Request::get(url()).with_body(b"ignored".to_vec());
        assert_eq!(request.body(), None);
    }

    #[test]
    fn post_request_keeps_json_body() {
        let request = Request::post(url())
            .with_json_body(&json!({"name": "Hulk"}))
            .expect("must serialise");

        assert_eq!(request.method(), Method::Post);
        let body: serde_json::Value =
            serde_json::from_slice(request.body().expect("body must be set")).expect("json body");
        assert_eq!(body, json!({"name": "Hulk"}));
    }
}
