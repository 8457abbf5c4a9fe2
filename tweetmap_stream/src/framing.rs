/// Splits a chunked response body into lines.
///
/// Chunk boundaries are arbitrary: a line may arrive in several chunks and a chunk may
/// hold several lines. Lines end with `\n`. A trailing `\r` is removed.
#[derive(Debug, Default)]
pub struct LineSplitter {
	buffer: Vec<u8>,
}

impl LineSplitter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a chunk and returns every line completed by it.
	pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
		self.buffer.extend_from_slice(chunk);

		let mut lines = Vec::new();
		let mut start = 0;
		while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
			let end = start + offset;
			lines.push(decode_line(&self.buffer[start..end]));
			start = end + 1;
		}
		self.buffer.drain(..start);
		lines
	}

	/// Returns the unterminated rest, if any.
	pub fn finish(&mut self) -> Option<String> {
		if self.buffer.is_empty() {
			return None;
		}
		let line = decode_line(&self.buffer);
		self.buffer.clear();
		Some(line)
	}

	/// Number of buffered bytes that do not yet form a complete line.
	pub fn pending(&self) -> usize {
		self.buffer.len()
	}
}

fn decode_line(bytes: &[u8]) -> String {
	let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
	String::from_utf8_lossy(bytes).into_owned()
}
