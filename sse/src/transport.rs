//! Streaming HTTP transport for the realtime endpoint.
//!
//! The listener only needs a way to open a connection and read it line by
//! line, so that is all the [`Transport`] trait exposes. [`HttpTransport`] is
//! the reqwest implementation used in production; tests substitute scripted
//! transports.
//!
//! Credentials are passed in ready-made. Nothing here logs in or stores
//! cookies.

use async_trait::async_trait;
use events::error::{self, Error, StreamErrorKind, TimeoutPhase};
use futures_util::stream::{self, Stream, TryStreamExt};
use log::*;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

/// Default realtime stream endpoint.
pub const REALTIME_CONNECT_URL: &str = "https://realtime.www.linkedin.com/realtime/connect";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.116 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-AU,en-GB;q=0.9,en-US;q=0.8,en;q=0.7";
const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Lines of an open stream. `None` marks end of stream.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// Opens connections to the realtime endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new connection. Fails with a connection error carrying the
    /// status when the endpoint does not answer 200.
    async fn open(&self) -> Result<LineStream, Error>;
}

/// Session cookies of an already authenticated user.
#[derive(Clone)]
pub struct Credentials {
    pub li_at: String,
    pub jsessionid: String,
}

impl Credentials {
    pub fn new(li_at: impl Into<String>, jsessionid: impl Into<String>) -> Self {
        Self {
            li_at: li_at.into(),
            jsessionid: jsessionid.into(),
        }
    }

    /// The CSRF token is the `JSESSIONID` value without its quotes.
    pub fn csrf_token(&self) -> &str {
        self.jsessionid.trim_matches('"')
    }

    fn cookie_header(&self) -> String {
        format!("li_at={}; JSESSIONID={}", self.li_at, self.jsessionid)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("li_at", &"<redacted>")
            .field("jsessionid", &"<redacted>")
            .finish()
    }
}

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(
        url: impl Into<String>,
        credentials: &Credentials,
        connect_timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers(credentials)?)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self) -> Result<LineStream, Error> {
        debug!("Connecting to event stream at {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Event stream endpoint answered {status}");
            return Err(error::connection_error(status.as_u16()));
        }

        let body = response.bytes_stream().map_err(std::io::Error::other);
        let lines = StreamReader::new(body).lines();

        Ok(Box::pin(stream::unfold(lines, |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((Ok(line), lines)),
                Ok(None) => None,
                Err(e) => Some((Err(Error::from(e)), lines)),
            }
        })))
    }
}

/// Headers sent with every request, as the web client sends them.
fn default_headers(credentials: &Credentials) -> Result<HeaderMap, Error> {
    let track = serde_json::json!({
        "clientVersion": "1.2.6216",
        "osName": "web",
        "timezoneOffset": 10,
        "deviceFormFactor": "DESKTOP",
        "mpName": "voyager-web",
    });

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    headers.insert(
        HeaderName::from_static("x-li-lang"),
        HeaderValue::from_static("en_US"),
    );
    headers.insert(
        HeaderName::from_static("x-restli-protocol-version"),
        HeaderValue::from_static("2.0.0"),
    );
    headers.insert(
        HeaderName::from_static("x-li-track"),
        header_value(&track.to_string())?,
    );
    headers.insert(
        HeaderName::from_static("csrf-token"),
        header_value(credentials.csrf_token())?,
    );
    let mut cookie = header_value(&credentials.cookie_header())?;
    cookie.set_sensitive(true);
    headers.insert(header::COOKIE, cookie);

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|_| error::config_error("Invalid characters in header value"))
}

/// reqwest timeouts become timeout errors, everything else is a transport error.
pub fn map_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error {
            source: Some(Box::new(err)),
            error_kind: StreamErrorKind::Timeout(TimeoutPhase::Connect),
        }
    } else {
        error::transport_error(err)
    }
}
