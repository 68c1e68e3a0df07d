//! The analysis thread and the handle that talks to it.
//!
//! Requests are handled strictly in submission order. There is no way to
//! interrupt a running computation; a caller that lost interest simply
//! ignores the reply when it arrives.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use timbre_config::Settings;
use timbre_dsp::{DspContext, SpectrogramOptions, normalization_gain};

use crate::error::WorkerError;
use crate::messages::{
    Reply, Request, RequestId, Response, SpectrogramRequest, SpectrogramResponse, WorkerEvent,
};

/// Name given to the worker's OS thread.
pub const THREAD_NAME: &str = "timbre-worker";

/// Messages on the inbound channel.
enum Inbound {
    Request(RequestId, Request),
    Subscribe(Sender<WorkerEvent>),
}

/// Compute a spectrogram response synchronously.
///
/// This is what the worker runs for [`Request::Spectrogram`]; hosts that
/// already own a background context can call it directly.
pub fn run_spectrogram(
    ctx: &mut DspContext,
    request: &SpectrogramRequest,
    defaults: &SpectrogramOptions,
) -> SpectrogramResponse {
    let options = request.options(defaults);
    ctx.spectrogram(&request.channel_data, request.sample_rate, &options)
        .into()
}

/// State owned by the worker thread.
pub struct Worker {
    ctx: DspContext,
    settings: Settings,
    replies: Sender<Reply>,
    subscribers: Vec<Sender<WorkerEvent>>,
}

impl Worker {
    /// Start a worker thread configured by `settings`.
    ///
    /// # Errors
    /// [`WorkerError::Config`] if `settings` fail validation, and
    /// [`WorkerError::Spawn`] if the thread cannot be started.
    pub fn spawn(settings: Settings) -> Result<WorkerHandle, WorkerError> {
        settings.validate()?;

        let (inbound_tx, inbound_rx) = unbounded();
        let (reply_tx, reply_rx) = unbounded();

        let worker = Worker {
            ctx: DspContext::new(settings.cache),
            settings,
            replies: reply_tx,
            subscribers: Vec::new(),
        };

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || worker.run(&inbound_rx))?;
        tracing::debug!(thread = THREAD_NAME, "worker started");

        Ok(WorkerHandle {
            inbound: inbound_tx,
            replies: reply_rx,
            next_id: AtomicU64::new(1),
            thread: Some(thread),
        })
    }

    fn run(mut self, inbound: &Receiver<Inbound>) {
        while let Ok(message) = inbound.recv() {
            match message {
                Inbound::Subscribe(tx) => self.subscribers.push(tx),
                Inbound::Request(id, request) => {
                    let Some(response) = self.handle(id, request) else {
                        tracing::debug!(%id, "worker shutting down");
                        break;
                    };
                    self.publish_evictions();
                    if self.replies.send(Reply { id, response }).is_err() {
                        tracing::debug!(%id, "reply receiver dropped, stopping");
                        break;
                    }
                }
            }
        }
        tracing::debug!("worker stopped");
    }

    /// `None` means stop.
    fn handle(&mut self, id: RequestId, request: Request) -> Option<Response> {
        let kind = request.kind();
        tracing::debug!(%id, kind, "request received");
        let started = Instant::now();

        let response = match request {
            Request::Spectrogram(req) => Response::Spectrogram(run_spectrogram(
                &mut self.ctx,
                &req,
                &self.settings.spectrogram,
            )),
            Request::Formants {
                samples,
                sample_rate,
                options,
            } => {
                let options = options.unwrap_or_else(|| self.settings.formant.clone());
                match self.ctx.analyze_formants(&samples, sample_rate, &options) {
                    Ok(analysis) => Response::Formants(analysis),
                    Err(err) => Response::Failed(err),
                }
            }
            Request::Loudness { buffer, range } => {
                let range = range.unwrap_or(self.settings.loudness);
                let analysis = self.ctx.analyze_loudness(&buffer, &range);
                let gain = normalization_gain(&analysis, &self.settings.normalization);
                Response::Loudness { analysis, gain }
            }
            Request::JoinCorrection { a, b } => {
                Response::JoinCorrection(self.ctx.join_correction(&a, &b, &self.settings.join))
            }
            Request::ClearCaches => {
                self.ctx.clear_caches();
                self.emit(&WorkerEvent::CachesCleared);
                Response::CachesCleared
            }
            Request::Shutdown => return None,
        };

        let failure = match &response {
            Response::Failed(err) => Some(err.to_string()),
            Response::Spectrogram(SpectrogramResponse::Failure { error }) => Some(error.clone()),
            _ => None,
        };
        match failure {
            Some(error) => {
                tracing::warn!(%id, kind, %error, "request failed");
                self.emit(&WorkerEvent::RequestFailed { id, kind, error });
            }
            None => {
                let elapsed = started.elapsed();
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                tracing::debug!(%id, kind, elapsed_ms, "request completed");
                self.emit(&WorkerEvent::RequestCompleted { id, kind, elapsed });
            }
        }
        Some(response)
    }

    fn publish_evictions(&mut self) {
        for eviction in self.ctx.drain_evictions() {
            tracing::trace!(?eviction, "cache eviction");
            self.emit(&WorkerEvent::CacheEvicted(eviction));
        }
    }

    /// Send to every live subscriber, forgetting the ones that hung up.
    fn emit(&mut self, event: &WorkerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Caller side of a running worker.
///
/// Dropping the handle asks the worker to stop and waits for it.
pub struct WorkerHandle {
    inbound: Sender<Inbound>,
    replies: Receiver<Reply>,
    next_id: AtomicU64,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Queue a request and return its id.
    pub fn submit(&self, request: Request) -> Result<RequestId, WorkerError> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.inbound
            .send(Inbound::Request(id, request))
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(id)
    }

    /// Receive events for every request handled after this call.
    pub fn subscribe(&self) -> Result<Receiver<WorkerEvent>, WorkerError> {
        let (tx, rx) = unbounded();
        self.inbound
            .send(Inbound::Subscribe(tx))
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(rx)
    }

    /// Block until the next reply.
    pub fn recv(&self) -> Result<Reply, WorkerError> {
        self.replies.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Next reply if one is ready.
    pub fn try_recv(&self) -> Result<Option<Reply>, WorkerError> {
        match self.replies.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Wait up to `timeout` for the next reply.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Reply>, WorkerError> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Ok(Some(reply)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Submit `request` and wait for its reply, discarding older replies.
    pub fn call(&self, request: Request) -> Result<Response, WorkerError> {
        let id = self.submit(request)?;
        loop {
            let reply = self.recv()?;
            if reply.id == id {
                return Ok(reply.response);
            }
            tracing::trace!(stale = %reply.id, waiting_for = %id, "discarding stale reply");
        }
    }

    /// Stop the worker after the queued requests and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.submit(Request::Shutdown);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("worker thread panicked");
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
