//! `marvel-http` is an async client for the Marvel Comics public API.
//!
//! Its core is [`RequestExecutor`], which drives one logical request across
//! transient failures:
//! - each attempt races the [`Transport`] against a per-attempt deadline,
//! - transport errors are retried after a flat delay, deadline expiries
//!   immediately, up to [`ExecutorConfig::max_retries`],
//! - the caller receives exactly one [`Outcome`].
//!
//! [`MarvelClient`] builds requests from [`MarvelService`] descriptors, runs
//! them through the executor and decodes the JSON responses.

mod client;
mod decode;
mod error;
mod executor;
mod options;
mod request;
mod service;
pub mod timer;
mod transport;
mod types;
mod wire;

pub use client::MarvelClient;
pub use error::{ApiError, NetworkError};
pub use executor::{CallHandle, Outcome, RequestExecutor, Response};
pub use options::ExecutorConfig;
pub use request::{Method, Request};
pub use service::{build_request, MarvelService, Service, MARVEL_BASE_URL};
pub use timer::{Timer, TimerHandle, TokioTimer};
pub use transport::{Exchange, ExchangeFuture, ReqwestTransport, Transport};
pub use types::{Character, Comic, Image, Page};

pub use reqwest::Url;

pub type Result<T> = std::result::Result<T, ApiError>;
