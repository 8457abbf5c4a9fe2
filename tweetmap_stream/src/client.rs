//! The streaming client: one filtered subscription, a blocking receive loop and a
//! fixed-delay retry budget.

use crate::{
	CredentialProvider, LineSplitter, ListenerControl, OAuthSigner, StreamListener, listener::dispatch_line,
	oauth::encode,
};
use anyhow::{Context, Result, bail, ensure};
use reqwest::{
	Client, Response, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use std::time::Duration;
use tokio::time::sleep;
use tweetmap_core::GeoBBox;

pub const DEFAULT_STREAM_URL: &str = "https://stream.twitter.com/1.1/statuses/filter.json";
pub const USER_AGENT: &str = concat!("tweetmap/", env!("CARGO_PKG_VERSION"));

/// The server sends a keep-alive at least every 30 seconds, so a silent connection is dead.
const STALL_TIMEOUT: Duration = Duration::from_secs(90);

/// How often and how long to wait before reconnecting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Consecutive failed attempts tolerated before giving up.
	pub retry_count: u32,
	/// Fixed pause between attempts.
	pub retry_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		RetryPolicy {
			retry_count: 10,
			retry_delay: Duration::from_secs(5),
		}
	}
}

/// Lifecycle of a [`StreamClient`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
	/// No connection has been accepted yet.
	Idle,
	/// A connection was accepted; the receive loop is running or reconnecting.
	Streaming,
	/// The loop has ended for good.
	Terminated,
}

/// Why [`StreamClient::filter`] returned without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamOutcome {
	/// A listener hook returned [`ListenerControl::Stop`] while messages were flowing.
	Stopped,
	/// The listener chose to stop after the server answered with `status_code`.
	Rejected { status_code: u16 },
}

enum BodyEnd {
	Stopped,
	Closed,
	Failed(reqwest::Error),
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
	err.is_connect() || err.is_timeout() || err.is_body() || err.is_request()
}

pub struct StreamClientBuilder {
	signer: OAuthSigner,
	url: String,
	retry: RetryPolicy,
}

impl StreamClientBuilder {
	#[must_use]
	pub fn url(mut self, url: &str) -> Self {
		self.url = url.to_string();
		self
	}

	#[must_use]
	pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn build(self) -> Result<StreamClient> {
		match self.url.split_once("://").map(|(scheme, _)| scheme) {
			Some("http" | "https") => (),
			_ => bail!("unsupported stream URL '{}', expected 'http' or 'https'", self.url),
		}

		let client = Client::builder()
			.user_agent(USER_AGENT)
			.tcp_keepalive(Duration::from_secs(600))
			.connect_timeout(Duration::from_secs(30))
			.read_timeout(STALL_TIMEOUT)
			.build()
			.context("Failed to build HTTP client")?;

		Ok(StreamClient {
			client,
			signer: self.signer,
			url: self.url,
			retry: self.retry,
			state: StreamState::Idle,
		})
	}
}

/// Authenticated client for a location-filtered stream.
#[derive(Debug)]
pub struct StreamClient {
	client: Client,
	signer: OAuthSigner,
	url: String,
	retry: RetryPolicy,
	state: StreamState,
}

impl StreamClient {
	/// # Errors
	///
	/// Returns an error if one of the credentials is empty.
	pub fn builder(credentials: &impl CredentialProvider) -> Result<StreamClientBuilder> {
		Ok(StreamClientBuilder {
			signer: OAuthSigner::new(credentials)?,
			url: DEFAULT_STREAM_URL.to_string(),
			retry: RetryPolicy::default(),
		})
	}

	pub fn state(&self) -> StreamState {
		self.state
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Subscribes to all posts inside `locations` and blocks in the receive loop.
	///
	/// Each line of the response is handed to `listener`. Non-200 answers go to
	/// [`StreamListener::on_error`]; when it returns `Continue`, the client waits the fixed
	/// retry delay and reconnects. Transport errors and server-side closes are retried the
	/// same way. After `retry_count` consecutive failures the loop gives up with an error.
	///
	/// # Errors
	///
	/// Returns an error if the retry budget is exhausted, a listener hook fails, or the
	/// client was already terminated.
	pub async fn filter<L: StreamListener + ?Sized>(
		&mut self,
		locations: &GeoBBox,
		listener: &mut L,
	) -> Result<StreamOutcome> {
		ensure!(
			self.state != StreamState::Terminated,
			"stream client was already terminated"
		);

		let result = self.receive_loop(&locations.as_string_list(), listener).await;
		self.state = StreamState::Terminated;
		log::debug!("stream terminated: {result:?}");
		result
	}

	async fn receive_loop<L: StreamListener + ?Sized>(&mut self, locations: &str, listener: &mut L) -> Result<StreamOutcome> {
		let mut errors: u32 = 0;
		let mut last_error = String::new();

		loop {
			if errors > 0 {
				if errors > self.retry.retry_count {
					bail!("giving up after {errors} failed attempts to stream from '{}': {last_error}", self.url);
				}
				log::warn!(
					"retry attempt {errors}/{} for '{}', waiting {:?}",
					self.retry.retry_count,
					self.url,
					self.retry.retry_delay
				);
				sleep(self.retry.retry_delay).await;
			}

			let response = match self.connect(locations).await {
				Ok(response) => response,
				Err(err) if err.downcast_ref::<reqwest::Error>().is_some_and(is_retryable_error) => {
					log::warn!("retryable error: {err}");
					last_error = err.to_string();
					errors += 1;
					continue;
				}
				Err(err) => return Err(err.context("Failed to open stream")),
			};

			let status = response.status();
			if status != StatusCode::OK {
				let status_code = status.as_u16();
				if listener.on_error(status_code) == ListenerControl::Stop {
					log::info!("listener stopped the stream after HTTP status {status_code}");
					return Ok(StreamOutcome::Rejected { status_code });
				}
				last_error = format!("HTTP status {status}");
				errors += 1;
				continue;
			}

			errors = 0;
			self.state = StreamState::Streaming;
			log::info!("connected to '{}', filtering locations {locations}", self.url);
			listener.on_connect();

			match read_body(response, listener).await? {
				BodyEnd::Stopped => {
					log::info!("listener stopped the stream");
					return Ok(StreamOutcome::Stopped);
				}
				BodyEnd::Closed => {
					log::warn!("server closed the stream");
					last_error = String::from("server closed the stream");
				}
				BodyEnd::Failed(err) if is_retryable_error(&err) => {
					log::warn!("retryable error reading stream: {err}");
					last_error = err.to_string();
				}
				BodyEnd::Failed(err) => return Err(err).context("Failed to read stream"),
			}
			errors += 1;
		}
	}

	async fn connect(&self, locations: &str) -> Result<Response> {
		let authorization = self
			.signer
			.authorization("POST", &self.url, &[("locations", locations)])?;

		log::debug!("POST {} locations={locations}", self.url);
		Ok(self
			.client
			.post(&self.url)
			.header(AUTHORIZATION, authorization)
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(format!("locations={}", encode(locations)))
			.send()
			.await?)
	}
}

async fn read_body<L: StreamListener + ?Sized>(mut response: Response, listener: &mut L) -> Result<BodyEnd> {
	let mut splitter = LineSplitter::new();
	loop {
		let chunk = match response.chunk().await {
			Ok(Some(chunk)) => chunk,
			Ok(None) => break,
			Err(err) => return Ok(BodyEnd::Failed(err)),
		};
		for line in splitter.push(&chunk) {
			if dispatch_line(&line, listener)? == ListenerControl::Stop {
				return Ok(BodyEnd::Stopped);
			}
		}
	}

	if let Some(line) = splitter.finish()
		&& dispatch_line(&line, listener)? == ListenerControl::Stop
	{
		return Ok(BodyEnd::Stopped);
	}
	Ok(BodyEnd::Closed)
}
