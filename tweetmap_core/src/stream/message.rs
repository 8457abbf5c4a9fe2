use crate::PostEvent;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// One decoded line of a stream body.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
	/// A post, with or without coordinates.
	Post(Box<PostEvent>),
	/// A post was deleted.
	Delete { id: Option<u64> },
	/// The filter matched more posts than the stream may deliver; `track` were skipped.
	Limit { track: u64 },
	/// The server is about to close the connection.
	Disconnect { code: u64, reason: String },
	/// The client is falling behind.
	Warning { code: String, message: String },
	/// Blank line sent to keep the connection open.
	KeepAlive,
	/// Any other JSON object.
	Unknown(String),
}

impl StreamMessage {
	/// Decodes one line of the stream body.
	///
	/// # Errors
	///
	/// Returns an error if the line is neither blank nor a JSON object.
	///
	/// # Examples
	///
	/// ```
	/// use tweetmap_core::StreamMessage;
	///
	/// assert_eq!(StreamMessage::parse("\r").unwrap(), StreamMessage::KeepAlive);
	/// assert_eq!(
	///     StreamMessage::parse(r#"{"limit":{"track":5}}"#).unwrap(),
	///     StreamMessage::Limit { track: 5 }
	/// );
	/// ```
	pub fn parse(line: &str) -> Result<StreamMessage> {
		let line = line.trim();
		if line.is_empty() {
			return Ok(StreamMessage::KeepAlive);
		}

		let value: Value = serde_json::from_str(line).with_context(|| format!("invalid JSON in stream line {line:?}"))?;
		let Value::Object(object) = value else {
			bail!("stream line is not a JSON object: {line:?}");
		};

		if let Some(delete) = object.get("delete") {
			let id = delete.pointer("/status/id").and_then(Value::as_u64);
			return Ok(StreamMessage::Delete { id });
		}

		if let Some(limit) = object.get("limit") {
			let track = limit.get("track").and_then(Value::as_u64).unwrap_or(0);
			return Ok(StreamMessage::Limit { track });
		}

		if let Some(disconnect) = object.get("disconnect") {
			return Ok(StreamMessage::Disconnect {
				code: disconnect.get("code").and_then(Value::as_u64).unwrap_or(0),
				reason: string_field(disconnect, "reason"),
			});
		}

		if let Some(warning) = object.get("warning") {
			return Ok(StreamMessage::Warning {
				code: string_field(warning, "code"),
				message: string_field(warning, "message"),
			});
		}

		if is_post(&object) {
			let post: PostEvent = serde_json::from_value(Value::Object(object)).context("invalid post in stream")?;
			return Ok(StreamMessage::Post(Box::new(post)));
		}

		Ok(StreamMessage::Unknown(line.to_string()))
	}
}

fn is_post(object: &Map<String, Value>) -> bool {
	object.contains_key("in_reply_to_status_id") || (object.contains_key("id") && object.contains_key("user"))
}

fn string_field(value: &Value, key: &str) -> String {
	match value.get(key) {
		Some(Value::String(s)) => s.clone(),
		Some(other) => other.to_string(),
		None => String::new(),
	}
}
