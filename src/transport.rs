use std::{future::Future, pin::Pin};

use crate::Request;

/// What the transport reports for a single exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exchange {
    /// A response arrived; `status` is not interpreted by the executor.
    Completed { payload: Vec<u8>, status: u16 },
    /// The exchange failed at the transport level.
    Failed(String),
    /// Neither payload nor error was reported.
    Empty,
}

/// Future returned by [`Transport::perform`].
pub type ExchangeFuture = Pin<Box<dyn Future<Output = Exchange> + Send + 'static>>;

/// Performs one HTTP exchange.
///
/// The returned future is driven on its own task and may be aborted at any
/// await point when the attempt's deadline expires.
pub trait Transport: Send + Sync + 'static {
    fn perform(&self, request: &Request) -> ExchangeFuture;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn perform(&self, request: &Request) -> ExchangeFuture {
        let mut builder = self
            .http
            .request(request.method().into(), request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        Box::pin(async move {
            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => return Exchange::Failed(err.to_string()),
            };
            let status = response.status().as_u16();
            match response.bytes().await {
                Ok(payload) => Exchange::Completed {
                    payload: payload.to_vec(),
                    status,
                },
                Err(err) => Exchange::Failed(err.to_string()),
            }
        })
    }
}
