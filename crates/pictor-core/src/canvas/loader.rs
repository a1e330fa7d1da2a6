//! Polling an image endpoint until a render is ready.
//!
//! Transformed images can take a while to produce; the delivery endpoint
//! answers with an error status or error header until then. Polling is
//! split into a synchronous [`LoadAttempts`] state machine and an async
//! [`poll_image`] driver, so hosts with their own timers can step the
//! machine themselves.

use std::io::Cursor;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LoadConfig;
use crate::error::ResourceError;
use crate::geometry::Size;

/// Statuses that retrying will not fix.
const TERMINAL_STATUSES: [u16; 3] = [400, 401, 403];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[allow(async_fn_in_trait)]
pub trait ImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ResourceError>;
}

#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollDecision {
    Ready(Size),
    Retry { after: Duration },
    Failed(ResourceError),
}

/// Read image dimensions from an encoded body without decoding pixels.
pub fn probe_dimensions(body: &[u8]) -> Result<Size, ResourceError> {
    let reader = image::ImageReader::new(Cursor::new(body))
        .with_guessed_format()
        .map_err(|e| ResourceError::Fetch(e.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ResourceError::Fetch(e.to_string()))?;
    Ok(Size::new(f64::from(width), f64::from(height)))
}

/// Attempt counter for one URL.
#[derive(Debug, Clone)]
pub struct LoadAttempts {
    url: String,
    attempts: u32,
    max_attempts: u32,
    backoff: Duration,
    error_header: String,
}

impl LoadAttempts {
    pub fn new(url: impl Into<String>, config: &LoadConfig) -> Self {
        Self {
            url: url.into(),
            attempts: 0,
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            error_header: config.error_header.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Judge one response.
    ///
    /// Ready means a non-error status, no error header, an `image/*`
    /// content type and a body whose dimensions can be read.
    pub fn evaluate(&mut self, response: &FetchResponse) -> PollDecision {
        self.attempts += 1;

        if TERMINAL_STATUSES.contains(&response.status) {
            warn!(url = %self.url, status = response.status, "image request rejected");
            return PollDecision::Failed(ResourceError::Terminal {
                url: self.url.clone(),
                status: response.status,
            });
        }

        let is_image = response
            .header("content-type")
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"));
        let ok = response.status < 400 && response.header(&self.error_header).is_none() && is_image;

        if ok {
            match probe_dimensions(&response.body) {
                Ok(size) => {
                    debug!(url = %self.url, attempts = self.attempts, "image ready");
                    return PollDecision::Ready(size);
                }
                Err(e) => debug!(error = %e, "unreadable image body"),
            }
        }
        self.retry_or_fail()
    }

    /// Transport failures count as an attempt and are retried.
    pub fn fetch_failed(&mut self, error: &ResourceError) -> PollDecision {
        self.attempts += 1;
        debug!(url = %self.url, %error, "fetch failed");
        self.retry_or_fail()
    }

    fn retry_or_fail(&self) -> PollDecision {
        if self.attempts >= self.max_attempts {
            warn!(url = %self.url, attempts = self.attempts, "giving up on image");
            return PollDecision::Failed(ResourceError::RetriesExhausted {
                url: self.url.clone(),
                attempts: self.attempts,
            });
        }
        PollDecision::Retry {
            after: self.backoff,
        }
    }
}

/// Fetch `url` until it is ready, a terminal status arrives, or the
/// attempt budget runs out.
pub async fn poll_image<F, S>(
    url: &str,
    fetcher: &F,
    sleeper: &S,
    config: &LoadConfig,
) -> Result<Size, ResourceError>
where
    F: ImageFetcher,
    S: Sleeper,
{
    let mut attempts = LoadAttempts::new(url, config);
    loop {
        let decision = match fetcher.fetch(url).await {
            Ok(response) => attempts.evaluate(&response),
            Err(e) => attempts.fetch_failed(&e),
        };
        match decision {
            PollDecision::Ready(size) => return Ok(size),
            PollDecision::Failed(e) => return Err(e),
            PollDecision::Retry { after } => sleeper.sleep(after).await,
        }
    }
}

/// Identifies one load; results for older tickets are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadTicket {
    pub generation: u64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// User-facing message raised by the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use super::*;

    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    pub fn ready(width: u32, height: u32) -> FetchResponse {
        FetchResponse {
            status: 200,
            headers: vec![("Content-Type".into(), "image/png".into())],
            body: png(width, height),
        }
    }

    pub fn status(code: u16) -> FetchResponse {
        FetchResponse {
            status: code,
            headers: vec![("content-type".into(), "text/plain".into())],
            body: Vec::new(),
        }
    }

    /// Replays scripted responses; the last one repeats.
    pub struct Scripted {
        responses: RefCell<VecDeque<Result<FetchResponse, ResourceError>>>,
        pub calls: Cell<u32>,
    }

    impl Scripted {
        pub fn new(responses: Vec<Result<FetchResponse, ResourceError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl ImageFetcher for Scripted {
        async fn fetch(&self, _url: &str) -> Result<FetchResponse, ResourceError> {
            self.calls.set(self.calls.get() + 1);
            let mut queue = self.responses.borrow_mut();
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            }
        }
    }

    #[derive(Default)]
    pub struct InstantSleep {
        pub slept: RefCell<Vec<Duration>>,
    }

    impl Sleeper for InstantSleep {
        async fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
        }
    }
}
