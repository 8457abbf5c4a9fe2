use anyhow::Result;
use tweetmap_core::{PostEvent, StreamMessage};

/// HTTP status with which the API refuses a request, typically because a limit was reached.
pub const STATUS_REFUSED: u16 = 403;

/// What the receive loop should do after a listener call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerControl {
	Continue,
	Stop,
}

/// Callbacks invoked by the receive loop, once per stream message.
///
/// Only [`on_event`](Self::on_event) is required. Every other hook continues by default.
pub trait StreamListener {
	/// Called after every successful (re)connect.
	fn on_connect(&mut self) {}

	/// Called for every post.
	fn on_event(&mut self, event: &PostEvent) -> Result<ListenerControl>;

	/// Called when the server answers with a non-200 status.
	fn on_error(&mut self, status_code: u16) -> ListenerControl {
		log::warn!("stream request failed with HTTP status {status_code}");
		ListenerControl::Continue
	}

	fn on_delete(&mut self, id: Option<u64>) -> ListenerControl {
		log::trace!("post {id:?} was deleted");
		ListenerControl::Continue
	}

	fn on_limit(&mut self, track: u64) -> ListenerControl {
		log::debug!("rate limit notice: {track} matching posts were not delivered");
		ListenerControl::Continue
	}

	fn on_disconnect(&mut self, code: u64, reason: &str) -> ListenerControl {
		log::warn!("server announced disconnect (code {code}): {reason}");
		ListenerControl::Continue
	}

	fn on_warning(&mut self, code: &str, message: &str) -> ListenerControl {
		log::warn!("stall warning {code}: {message}");
		ListenerControl::Continue
	}
}

/// Routes one decoded message to the matching listener hook.
///
/// Used by the live client and when replaying a recorded stream.
pub fn dispatch_message<L: StreamListener + ?Sized>(message: &StreamMessage, listener: &mut L) -> Result<ListenerControl> {
	Ok(match message {
		StreamMessage::Post(event) => listener.on_event(event)?,
		StreamMessage::Delete { id } => listener.on_delete(*id),
		StreamMessage::Limit { track } => listener.on_limit(*track),
		StreamMessage::Disconnect { code, reason } => listener.on_disconnect(*code, reason),
		StreamMessage::Warning { code, message } => listener.on_warning(code, message),
		StreamMessage::KeepAlive => ListenerControl::Continue,
		StreamMessage::Unknown(line) => {
			log::debug!("ignoring unknown stream message: {line}");
			ListenerControl::Continue
		}
	})
}

/// Decodes one line and dispatches it. Malformed lines are logged and skipped.
pub fn dispatch_line<L: StreamListener + ?Sized>(line: &str, listener: &mut L) -> Result<ListenerControl> {
	match StreamMessage::parse(line) {
		Ok(message) => dispatch_message(&message, listener),
		Err(err) => {
			log::warn!("skipping malformed stream line: {err:#}");
			Ok(ListenerControl::Continue)
		}
	}
}
