//! Retrying, deadline-bounded request execution.
//!
//! Each logical call is driven by a single task that owns all attempt state.
//! The transport exchange and the deadline timer of an attempt only send
//! tagged events into that task's channel, so the first event to settle an
//! attempt wins and anything arriving later is discarded.

use std::{fmt, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    timer::{Timer, TimerHandle, TokioTimer},
    Exchange, ExecutorConfig, NetworkError, Request, Transport,
};

/// Raw response delivered on success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub body: Vec<u8>,
    pub status: u16,
}

/// Terminal result of a logical call.
pub type Outcome = std::result::Result<Response, NetworkError>;

/// Runs requests through a [`Transport`], retrying on transport errors and
/// per-attempt deadline expiry.
pub struct RequestExecutor<T, C = TokioTimer> {
    transport: Arc<T>,
    timer: Arc<C>,
    config: ExecutorConfig,
}

impl<T, C> Clone for RequestExecutor<T, C> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            timer: Arc::clone(&self.timer),
            config: self.config.clone(),
        }
    }
}

impl<T, C> fmt::Debug for RequestExecutor<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self::with_timer(transport, TokioTimer)
    }
}

impl<T: Transport, C: Timer> RequestExecutor<T, C> {
    pub fn with_timer(transport: T, timer: C) -> Self {
        Self {
            transport: Arc::new(transport),
            timer: Arc::new(timer),
            config: ExecutorConfig::default(),
        }
    }

    /// Replaces the configuration used by [`execute`](Self::execute) and
    /// [`send`](Self::send).
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Starts a call in the background and reports its outcome to `on_result`.
    ///
    /// Returns immediately. `on_result` runs exactly once unless the call is
    /// cancelled through the returned handle first. Must be called from within
    /// a Tokio runtime.
    pub fn execute<F>(&self, request: Request, on_result: F) -> CallHandle
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.execute_with_config(request, self.config.clone(), on_result)
    }

    /// Same as [`execute`](Self::execute) with an explicit configuration.
    pub fn execute_with_config<F>(
        &self,
        request: Request,
        config: ExecutorConfig,
        on_result: F,
    ) -> CallHandle
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let call = self.call(request, config);
        let task = tokio::spawn(async move {
            let outcome = call.run().await;
            on_result(outcome);
        });
        CallHandle { task }
    }

    /// Runs a call to completion on the current task.
    ///
    /// Dropping the returned future cancels the call.
    pub async fn send(&self, request: Request) -> Outcome {
        self.call(request, self.config.clone()).run().await
    }

    fn call(&self, request: Request, config: ExecutorConfig) -> Call<T, C> {
        let (events_tx, events) = mpsc::unbounded_channel();
        Call {
            transport: Arc::clone(&self.transport),
            timer: Arc::clone(&self.timer),
            request,
            config,
            events_tx,
            events,
        }
    }
}

/// Handle to a call started with [`RequestExecutor::execute`].
///
/// Dropping the handle detaches the call; it keeps running.
#[derive(Debug)]
pub struct CallHandle {
    task: JoinHandle<()>,
}

impl CallHandle {
    /// Cancels the call: the in-flight exchange and pending timer are dropped
    /// and the result callback is never invoked. No-op once the call finished.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[derive(Debug)]
enum Event {
    Exchange { attempt: usize, exchange: Exchange },
    Deadline { attempt: usize },
    Resume { attempt: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttemptState {
    Pending,
    Settled,
}

impl AttemptState {
    /// Moves to `Settled`. Returns `false` if the attempt was already settled.
    fn settle(&mut self) -> bool {
        match self {
            Self::Pending => {
                *self = Self::Settled;
                true
            }
            Self::Settled => false,
        }
    }
}

struct Attempt {
    state: AttemptState,
    exchange: JoinHandle<()>,
    deadline: TimerHandle,
}

impl Drop for Attempt {
    fn drop(&mut self) {
        // The deadline handle cancels itself on drop.
        self.exchange.abort();
    }
}

#[derive(Debug)]
enum Settlement {
    Exchanged(Exchange),
    DeadlineExpired,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Deliver(Outcome),
    Retry { delay: Duration },
}

struct Call<T, C> {
    transport: Arc<T>,
    timer: Arc<C>,
    request: Request,
    config: ExecutorConfig,
    events_tx: mpsc::UnboundedSender<Event>,
    events: mpsc::UnboundedReceiver<Event>,
}

impl<T: Transport, C: Timer> Call<T, C> {
    async fn run(mut self) -> Outcome {
        let mut attempt = 0usize;
        loop {
            let settlement = self.run_attempt(attempt).await;
            match next_step(&self.config, attempt, settlement) {
                Step::Deliver(outcome) => {
                    #[cfg(feature = "tracing")]
                    if let Err(err) = &outcome {
                        tracing::warn!(attempt, error = %err, "request failed");
                    }
                    return outcome;
                }
                Step::Retry { delay } => {
                    if !delay.is_zero() {
                        self.wait(attempt, delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn run_attempt(&mut self, number: usize) -> Settlement {
        let mut attempt = self.start(number);
        loop {
            match self.next_event().await {
                Event::Exchange {
                    attempt: n,
                    exchange,
                } if n == number => {
                    if attempt.state.settle() {
                        attempt.deadline.cancel();
                        return Settlement::Exchanged(exchange);
                    }
                }
                Event::Deadline { attempt: n } if n == number => {
                    if attempt.state.settle() {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempt = n, "attempt deadline expired");
                        attempt.exchange.abort();
                        return Settlement::DeadlineExpired;
                    }
                }
                stale => discard(stale),
            }
        }
    }

    fn start(&self, number: usize) -> Attempt {
        let exchange = self.transport.perform(&self.request);
        let events = self.events_tx.clone();
        let exchange = tokio::spawn(async move {
            let exchange = exchange.await;
            let _ = events.send(Event::Exchange {
                attempt: number,
                exchange,
            });
        });

        let events = self.events_tx.clone();
        let deadline = self.timer.schedule(
            self.config.per_attempt_timeout(),
            Box::new(move || {
                let _ = events.send(Event::Deadline { attempt: number });
            }),
        );

        Attempt {
            state: AttemptState::Pending,
            exchange,
            deadline,
        }
    }

    /// Waits out the retry delay that follows attempt `attempt`.
    async fn wait(&mut self, attempt: usize, delay: Duration) {
        let events = self.events_tx.clone();
        let _resume = self.timer.schedule(
            delay,
            Box::new(move || {
                let _ = events.send(Event::Resume { attempt });
            }),
        );
        loop {
            match self.next_event().await {
                Event::Resume { attempt: n } if n == attempt => return,
                stale => discard(stale),
            }
        }
    }

    async fn next_event(&mut self) -> Event {
        match self.events.recv().await {
            Some(event) => event,
            // `events_tx` lives in the same struct, so the channel stays open
            // for as long as `self` can be polled.
            None => unreachable!("call event channel closed while the call holds a sender"),
        }
    }
}

fn next_step(config: &ExecutorConfig, attempt: usize, settlement: Settlement) -> Step {
    let can_retry = attempt < config.max_retries;
    match settlement {
        Settlement::Exchanged(Exchange::Completed { payload, status }) => {
            Step::Deliver(Ok(Response {
                body: payload,
                status,
            }))
        }
        // No payload and no error is a protocol anomaly, not a transient fault.
        Settlement::Exchanged(Exchange::Empty) => Step::Deliver(Err(NetworkError::NoData)),
        Settlement::Exchanged(Exchange::Failed(detail)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, can_retry, %detail, "transport error");
            #[cfg(not(feature = "tracing"))]
            let _ = detail;

            if can_retry {
                Step::Retry {
                    delay: config.retry_delay(),
                }
            } else {
                Step::Deliver(Err(NetworkError::ConnectionFailure))
            }
        }
        Settlement::DeadlineExpired => {
            if can_retry {
                Step::Retry {
                    delay: Duration::ZERO,
                }
            } else {
                Step::Deliver(Err(NetworkError::Timeout))
            }
        }
    }
}

fn discard(event: Event) {
    #[cfg(feature = "tracing")]
    tracing::trace!(?event, "discarding event for settled attempt");
    #[cfg(not(feature = "tracing"))]
    let _ = event;
}
