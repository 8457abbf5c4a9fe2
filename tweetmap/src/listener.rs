use anyhow::Result;
use tweetmap_core::PostEvent;
use tweetmap_image::MapRenderer;
use tweetmap_stream::{ListenerControl, STATUS_REFUSED, StreamListener};

/// Logged when the stream is refused.
pub const REFUSED_MESSAGE: &str =
	"The request is understood, but it has been refused or access is not allowed. Limit is maybe reached";

/// Text of the counter label.
pub fn label_text(count: u64) -> String {
	format!("Tweets : {count}")
}

/// Plots every geotagged post on a map and counts them.
#[derive(Debug)]
pub struct MapListener<R: MapRenderer> {
	renderer: R,
	count: u64,
}

impl<R: MapRenderer> MapListener<R> {
	/// Takes over `renderer` and sets its label to `Tweets : 0`.
	pub fn new(mut renderer: R) -> Self {
		renderer.set_label_text(&label_text(0));
		MapListener { renderer, count: 0 }
	}

	/// Number of geotagged posts seen so far.
	pub fn count(&self) -> u64 {
		self.count
	}

	pub fn renderer(&self) -> &R {
		&self.renderer
	}

	pub fn renderer_mut(&mut self) -> &mut R {
		&mut self.renderer
	}

	pub fn into_renderer(self) -> R {
		self.renderer
	}
}

impl<R: MapRenderer> StreamListener for MapListener<R> {
	fn on_connect(&mut self) {
		log::info!("stream connected, {} posts plotted so far", self.count);
	}

	fn on_event(&mut self, event: &PostEvent) -> Result<ListenerControl> {
		let Some(point) = event.point() else {
			return Ok(ListenerControl::Continue);
		};

		log::info!("{point:?} {}", event.summary());
		let (x, y) = point.as_tuple();
		self.renderer.plot_point(x, y);
		self.count += 1;
		self.renderer.set_label_text(&label_text(self.count));
		self.renderer.refresh()?;
		Ok(ListenerControl::Continue)
	}

	fn on_error(&mut self, status_code: u16) -> ListenerControl {
		if status_code == STATUS_REFUSED {
			log::error!("{REFUSED_MESSAGE}");
			return ListenerControl::Stop;
		}
		log::warn!("stream request failed with HTTP status {status_code}, reconnecting");
		ListenerControl::Continue
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::bail;
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use tweetmap_stream::dispatch_line;

	/// Records renderer calls in order.
	#[derive(Debug, Default)]
	struct Recorder {
		calls: Vec<String>,
		points: Vec<(f64, f64)>,
		label: String,
		/// Points and label visible at each refresh.
		frames: Vec<(usize, String)>,
		fail_refresh: bool,
	}

	impl MapRenderer for Recorder {
		fn plot_point(&mut self, x: f64, y: f64) {
			self.calls.push(format!("plot {x} {y}"));
			self.points.push((x, y));
		}
		fn set_label_text(&mut self, text: &str) {
			self.calls.push(format!("label {text}"));
			self.label = text.to_string();
		}
		fn refresh(&mut self) -> Result<()> {
			if self.fail_refresh {
				bail!("disk full");
			}
			self.calls.push(String::from("refresh"));
			self.frames.push((self.points.len(), self.label.clone()));
			Ok(())
		}
	}

	#[test]
	fn starts_at_zero() {
		let listener = MapListener::new(Recorder::default());
		assert_eq!(listener.count(), 0);
		assert_eq!(listener.renderer().calls, vec!["label Tweets : 0"]);
	}

	#[test]
	fn event_without_coordinates_is_ignored() {
		let mut listener = MapListener::new(Recorder::default());
		let control = listener.on_event(&PostEvent::without_coordinates()).unwrap();
		assert_eq!(control, ListenerControl::Continue);
		assert_eq!(listener.count(), 0);
		assert!(listener.renderer().points.is_empty());
	}

	#[test]
	fn event_with_coordinates_is_plotted_once() {
		let mut listener = MapListener::new(Recorder::default());
		listener.on_event(&PostEvent::at(139.7, 35.7)).unwrap();
		assert_eq!(listener.count(), 1);
		assert_eq!(
			listener.renderer().calls,
			vec!["label Tweets : 0", "plot 139.7 35.7", "label Tweets : 1", "refresh"]
		);
	}

	#[test]
	fn counts_in_order() {
		let mut listener = MapListener::new(Recorder::default());
		for event in [
			PostEvent::without_coordinates(),
			PostEvent::at(139.7, 35.7),
			PostEvent::at(-0.1, 51.5),
		] {
			listener.on_event(&event).unwrap();
		}
		assert_eq!(listener.count(), 2);
		let recorder = listener.into_renderer();
		assert_eq!(recorder.points, vec![(139.7, 35.7), (-0.1, 51.5)]);
		assert_eq!(
			recorder.frames,
			vec![(1, String::from("Tweets : 1")), (2, String::from("Tweets : 2"))]
		);
	}

	#[test]
	fn malformed_coordinates_are_ignored() {
		let mut listener = MapListener::new(Recorder::default());
		let line = r#"{"id":1,"user":{"screen_name":"a"},"coordinates":{"type":"Point","coordinates":[500,0]}}"#;
		assert_eq!(dispatch_line(line, &mut listener).unwrap(), ListenerControl::Continue);
		assert_eq!(listener.count(), 0);
	}

	#[test]
	fn refresh_error_is_propagated() {
		let mut listener = MapListener::new(Recorder {
			fail_refresh: true,
			..Recorder::default()
		});
		let err = listener.on_event(&PostEvent::at(1.0, 2.0)).unwrap_err();
		assert_eq!(err.to_string(), "disk full");
	}

	#[rstest]
	#[case(403, ListenerControl::Stop)]
	#[case(401, ListenerControl::Continue)]
	#[case(420, ListenerControl::Continue)]
	#[case(500, ListenerControl::Continue)]
	#[case(503, ListenerControl::Continue)]
	fn only_refusal_stops(#[case] status_code: u16, #[case] expected: ListenerControl) {
		let mut listener = MapListener::new(Recorder::default());
		assert_eq!(listener.on_error(status_code), expected);
		assert_eq!(listener.count(), 0);
	}

	#[test]
	fn label_format() {
		assert_eq!(label_text(0), "Tweets : 0");
		assert_eq!(label_text(1234), "Tweets : 1234");
	}
}
