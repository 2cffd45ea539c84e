use std::fmt;

use crate::{
    decode::{check_status, decode_characters, decode_comics},
    service::{build_request, MarvelService, Service, MARVEL_BASE_URL},
    ApiError, Character, Comic, ExecutorConfig, Page, ReqwestTransport, Request,
    RequestExecutor, Response, Result, Timer, TokioTimer, Transport,
};

#[derive(Clone)]
/// Client for the Marvel public API.
///
/// Every request goes through a [`RequestExecutor`], so lookups are retried
/// and bounded by the per-attempt deadline of its [`ExecutorConfig`].
pub struct MarvelClient<T = ReqwestTransport, C = TokioTimer> {
    executor: RequestExecutor<T, C>,
    base_url: String,
    api_key: String,
}

impl<T, C> fmt::Debug for MarvelClient<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarvelClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("executor", &self.executor)
            .finish()
    }
}

impl MarvelClient {
    /// Creates a client for the public gateway using a default `reqwest` transport.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_executor(api_key, RequestExecutor::new(ReqwestTransport::default()))
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `MARVEL_API_KEY` — public API key (required)
    /// - `MARVEL_BASE_URL` — gateway override (optional)
    ///
    /// Returns an error if the key is missing, or if either variable is set
    /// but empty.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use marvel_http::MarvelClient;
    ///
    /// let client = MarvelClient::from_env().expect("missing MARVEL_API_KEY");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let api_key = std::env::var("MARVEL_API_KEY")
            .map_err(|_| "missing MARVEL_API_KEY environment variable".to_owned())?;
        if api_key.trim().is_empty() {
            return Err("MARVEL_API_KEY is set but empty".to_owned());
        }

        let client = Self::new(api_key.trim());
        match std::env::var("MARVEL_BASE_URL") {
            Ok(url) if url.trim().is_empty() => Err("MARVEL_BASE_URL is set but empty".to_owned()),
            Ok(url) => Ok(client.with_base_url(url.trim())),
            Err(_) => Ok(client),
        }
    }
}

impl<T: Transport, C: Timer> MarvelClient<T, C> {
    /// Creates a client around an existing executor, e.g. one with a custom
    /// transport or timer.
    pub fn with_executor(api_key: impl Into<String>, executor: RequestExecutor<T, C>) -> Self {
        Self {
            executor,
            base_url: MARVEL_BASE_URL.to_owned(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Applies timeout and retry settings.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.executor = self.executor.with_config(config);
        self
    }

    pub fn executor(&self) -> &RequestExecutor<T, C> {
        &self.executor
    }

    /// Resolves a service descriptor into a signed request.
    pub fn request<S: Service + ?Sized>(&self, service: &S) -> Result<Request> {
        build_request(service, &self.base_url, &self.api_key)
    }

    /// Executes `service` and returns the raw body of a 2xx response.
    pub async fn load<S: Service + ?Sized>(&self, service: &S) -> Result<Response> {
        let request = self.request(service)?;
        let response = self.executor.send(request).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status = response.status, bytes = response.body.len(), "response received");

        check_status(response)
    }

    /// Characters whose name matches `name` exactly.
    pub async fn characters(&self, name: &str) -> Result<Page<Character>> {
        let service = MarvelService::Characters {
            name: name.to_owned(),
        };
        let response = self.load(&service).await?;
        decode_characters(&response.body)
    }

    /// Looks up a single character.
    pub async fn character(&self, identifier: &str) -> Result<Character> {
        let service = MarvelService::Character {
            identifier: identifier.to_owned(),
        };
        let response = self.load(&service).await?;
        decode_characters(&response.body)?
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Decode(format!("no character in response for '{identifier}'")))
    }

    /// Comics featuring the character with `character_id`.
    pub async fn comics(&self, character_id: i64) -> Result<Page<Comic>> {
        let response = self.load(&MarvelService::Comics { character_id }).await?;
        decode_comics(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::MarvelClient;
    use crate::{
        service::MarvelService, Exchange, ExchangeFuture, ExecutorConfig, Request,
        RequestExecutor, TokioTimer, Transport,
    };

    /// Answers every exchange with the same payload and records the URLs.
    struct CannedTransport {
        payload: &'static str,
        urls: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for CannedTransport {
        fn perform(&self, request: &Request) -> ExchangeFuture {
            self.urls
                .lock()
                .expect("url log mutex must not be poisoned")
                .push(request.url().to_string());
            let payload = self.payload.as_bytes().to_vec();
            Box::pin(async move { Exchange::Completed { payload, status: 200 } })
        }
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = MarvelClient::new("secret-key");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn request_uses_overridden_base_url() {
        let client = MarvelClient::new("k").with_base_url("http://localhost:9000");
        let request = client
            .request(&MarvelService::Character {
                identifier: "42".to_owned(),
            })
            .expect("must build request");
        assert_eq!(
            request.url().as_str(),
            "http://localhost:9000/v1/public/characters/42?apikey=k"
        );
    }

    #[test]
    fn with_config_reaches_executor() {
        let config = ExecutorConfig {
            timeout_ms: 250,
            retry_delay_ms: 5,
            max_retries: 1,
        };
        let client = MarvelClient::new("k").with_config(config.clone());
        assert_eq!(client.executor().config(), &config);
    }

    #[tokio::test]
    async fn with_executor_routes_lookups_through_injected_transport() {
        let urls = Arc::new(Mutex::new(Vec::new()));
        let transport = CannedTransport {
            payload: r#"{"code":200,"data":{"offset":0,"limit":20,"total":1,"count":1,"results":[{"id":7,"title":"Hulk #1"}]}}"#,
            urls: Arc::clone(&urls),
        };
        let client = MarvelClient::with_executor(
            "k",
            RequestExecutor::with_timer(transport, TokioTimer),
        )
        .with_base_url("http://marvel.test");

        let page = client.comics(1009351).await.expect("lookup must succeed");

        assert_eq!(page.results[0].title.as_deref(), Some("Hulk #1"));
        assert_eq!(
            *urls.lock().expect("url log mutex must not be poisoned"),
            vec!["http://marvel.test/v1/public/characters/1009351/comics?apikey=k".to_owned()]
        );
    }
}
