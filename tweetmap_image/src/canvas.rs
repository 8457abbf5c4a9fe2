use crate::{
	BackgroundSource, BoxStyle, Projection, Viewport,
	color::from_unit_rgb,
	text::{draw_text_above, draw_text_box},
};
use ab_glyph::FontArc;
use anyhow::{Context, Result, ensure};
use image::{
	ExtendedColorType, ImageEncoder, Rgba, RgbaImage,
	codecs::png::{CompressionType, FilterType, PngEncoder},
};
use imageproc::{
	drawing::{draw_filled_circle_mut, draw_hollow_rect_mut},
	rect::Rect,
};
use std::{
	ffi::OsString,
	path::{Path, PathBuf},
};
use tweetmap_core::{GeoBBox, GeoPoint};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TITLE_FONT_SIZE: f64 = 12.0;
const MAX_PIXELS: u32 = 10_000;

/// The drawing operations a stream listener needs.
pub trait MapRenderer {
	/// Draws a marker at longitude `x`, latitude `y`.
	fn plot_point(&mut self, x: f64, y: f64);

	/// Replaces the text of the counter label.
	fn set_label_text(&mut self, text: &str);

	/// Makes the current state visible.
	fn refresh(&mut self) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
	pub color: Rgba<u8>,
	/// Diameter in points.
	pub size: f64,
}

impl Default for MarkerStyle {
	fn default() -> Self {
		MarkerStyle {
			color: Rgba([255, 0, 0, 255]),
			size: 2.0,
		}
	}
}

/// Placement and look of the counter label.
///
/// The label is centred on `(extent.x_min * scale_x, extent.y_min * scale_y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
	pub scale_x: f64,
	pub scale_y: f64,
	/// Font size in points.
	pub font_size: f64,
	pub colors: BoxStyle,
}

impl Default for LabelStyle {
	fn default() -> Self {
		LabelStyle {
			scale_x: 0.85,
			scale_y: 0.9,
			font_size: 9.0,
			colors: BoxStyle {
				text: from_unit_rgb(0.30, 0.34, 0.42),
				face: from_unit_rgb(0.93, 0.94, 0.96),
				edge: from_unit_rgb(0.85, 0.87, 0.91),
			},
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasOptions {
	/// Figure width in inches.
	pub width: f64,
	/// Figure height in inches.
	pub height: f64,
	pub dpi: u32,
	pub projection: Projection,
	pub extent: GeoBBox,
	pub title: Option<String>,
	pub marker: MarkerStyle,
	pub label: LabelStyle,
	/// Where [`MapRenderer::refresh`] writes the PNG.
	pub output: PathBuf,
}

impl Default for CanvasOptions {
	fn default() -> Self {
		CanvasOptions {
			width: 9.0,
			height: 5.0,
			dpi: 150,
			projection: Projection::PlateCarree,
			extent: GeoBBox::world(),
			title: None,
			marker: MarkerStyle::default(),
			label: LabelStyle::default(),
			output: PathBuf::from("tweets.png"),
		}
	}
}

/// A live map: one figure with a single map axes, markers and a counter label.
pub struct MapCanvas {
	options: CanvasOptions,
	viewport: Viewport,
	width: u32,
	height: u32,
	font: Option<FontArc>,
	font_warned: bool,
	frame: RgbaImage,
	/// Kept for redraws until [`MapCanvas::finish_layout`].
	history: Option<Vec<GeoPoint>>,
	plotted: usize,
	label: String,
}

impl MapCanvas {
	/// Creates the figure. Without `font`, the title and label are not drawn.
	pub fn new(options: CanvasOptions, font: Option<FontArc>) -> Result<MapCanvas> {
		ensure!(options.dpi > 0, "dpi must be positive");
		let width = (options.width * f64::from(options.dpi)).round();
		let height = (options.height * f64::from(options.dpi)).round();
		ensure!(
			width >= 1.0 && height >= 1.0 && width <= f64::from(MAX_PIXELS) && height <= f64::from(MAX_PIXELS),
			"figure size {}x{} in at {} dpi gives {width}x{height} px, expected 1 to {MAX_PIXELS} px per side",
			options.width,
			options.height,
			options.dpi
		);
		ensure!(
			options.output.file_name().is_some(),
			"output path '{}' has no file name",
			options.output.display()
		);
		let (width, height) = (width as u32, height as u32);
		let viewport = options.projection.viewport(&options.extent, width, height)?;

		let mut canvas = MapCanvas {
			options,
			viewport,
			width,
			height,
			font,
			font_warned: false,
			frame: RgbaImage::new(width, height),
			history: Some(Vec::new()),
			plotted: 0,
			label: String::new(),
		};
		canvas.draw_figure();
		log::debug!(
			"created {width}x{height} px canvas, axes at {:?}",
			canvas.viewport.pixel_bounds()
		);
		Ok(canvas)
	}

	/// Changes the visible extent and redraws the markers.
	///
	/// A background that was already painted is discarded, so call this first.
	pub fn set_extent(&mut self, extent: GeoBBox) -> Result<()> {
		self.ensure_layout_open()?;
		self.viewport = self.options.projection.viewport(&extent, self.width, self.height)?;
		self.options.extent = extent;
		self.draw_figure();
		self.draw_markers();
		Ok(())
	}

	/// Paints a background into the axes and redraws the markers on top of it.
	pub async fn add_background(&mut self, source: &dyn BackgroundSource) -> Result<()> {
		self.ensure_layout_open()?;
		log::info!("painting background: {}", source.name());
		source
			.paint(&mut self.frame, &self.viewport)
			.await
			.with_context(|| format!("Failed to paint background {}", source.name()))?;
		self.draw_markers();
		Ok(())
	}

	pub fn extent(&self) -> &GeoBBox {
		&self.options.extent
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Figure size in pixels.
	pub fn size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	pub fn output(&self) -> &Path {
		&self.options.output
	}

	/// Ends the layout phase: the point history is dropped and later points are only drawn.
	///
	/// Extent and background can no longer change afterwards.
	pub fn finish_layout(&mut self) {
		if let Some(history) = self.history.take() {
			log::debug!("layout finished with {} points kept for redraws", history.len());
		}
	}

	/// Points plotted before [`finish_layout`](Self::finish_layout), in order.
	pub fn points(&self) -> &[GeoPoint] {
		self.history.as_deref().unwrap_or_default()
	}

	/// Number of points drawn so far.
	pub fn plotted(&self) -> usize {
		self.plotted
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Marker radius in pixels.
	pub fn marker_radius(&self) -> i32 {
		let radius = self.options.marker.size * f64::from(self.options.dpi) / 72.0 / 2.0;
		(radius.round() as i32).max(1)
	}

	/// Geographic position of the label centre.
	pub fn label_anchor(&self) -> (f64, f64) {
		let extent = &self.options.extent;
		let label = &self.options.label;
		(extent.x_min * label.scale_x, extent.y_min * label.scale_y)
	}

	/// The current frame with the label on top.
	pub fn render(&mut self) -> RgbaImage {
		let mut image = self.frame.clone();
		if self.label.is_empty() {
			return image;
		}
		if let Some(font) = self.text_font() {
			let (x, y) = self.label_anchor();
			let style = &self.options.label;
			draw_text_box(
				&mut image,
				&font,
				&self.label,
				self.points_to_pixels(style.font_size),
				self.viewport.to_pixel(x, y),
				&style.colors,
			);
		}
		image
	}

	fn points_to_pixels(&self, points: f64) -> f32 {
		(points * f64::from(self.options.dpi) / 72.0) as f32
	}

	fn text_font(&mut self) -> Option<FontArc> {
		if self.font.is_none() && !self.font_warned {
			log::warn!("no font available, map text is not drawn; set 'map.font' in the config");
			self.font_warned = true;
		}
		self.font.clone()
	}

	fn draw_figure(&mut self) {
		self.frame = RgbaImage::from_pixel(self.width, self.height, WHITE);

		let (x0, y0, x1, y1) = self.viewport.pixel_bounds();
		let outline = Rect::at(x0 as i32 - 1, y0 as i32 - 1).of_size(x1 - x0 + 2, y1 - y0 + 2);
		draw_hollow_rect_mut(&mut self.frame, outline, BLACK);

		if let Some(title) = self.options.title.clone()
			&& let Some(font) = self.text_font()
		{
			let size = self.points_to_pixels(TITLE_FONT_SIZE);
			draw_text_above(
				&mut self.frame,
				&font,
				&title,
				size,
				BLACK,
				self.viewport.left + self.viewport.width / 2.0,
				self.viewport.top - f64::from(size) / 2.0,
			);
		}
	}

	fn ensure_layout_open(&self) -> Result<()> {
		ensure!(self.history.is_some(), "map layout is already finished");
		Ok(())
	}

	fn draw_markers(&mut self) {
		let Some(history) = self.history.take() else {
			return;
		};
		for point in &history {
			self.draw_marker(point);
		}
		self.history = Some(history);
	}

	fn draw_marker(&mut self, point: &GeoPoint) {
		if !self.options.extent.contains(point) {
			return;
		}
		let (px, py) = self.viewport.to_pixel(point.x, point.y);
		let radius = self.marker_radius();
		draw_filled_circle_mut(
			&mut self.frame,
			(px.round() as i32, py.round() as i32),
			radius,
			self.options.marker.color,
		);
	}
}

impl MapRenderer for MapCanvas {
	fn plot_point(&mut self, x: f64, y: f64) {
		let point = match GeoPoint::new(x, y) {
			Ok(point) => point,
			Err(err) => {
				log::debug!("not plotting ({x}, {y}): {err}");
				return;
			}
		};
		if !self.options.extent.contains(&point) {
			log::debug!("not plotting {point:?}: outside of {:?}", self.options.extent);
			return;
		}
		self.draw_marker(&point);
		self.plotted += 1;
		if let Some(history) = &mut self.history {
			history.push(point);
		}
	}

	fn set_label_text(&mut self, text: &str) {
		self.label = text.to_string();
	}

	fn refresh(&mut self) -> Result<()> {
		let image = self.render();
		let output = self.options.output.clone();
		write_png(&image, &output).with_context(|| format!("Failed to write map to '{}'", output.display()))
	}
}

impl std::fmt::Debug for MapCanvas {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MapCanvas")
			.field("size", &(self.width, self.height))
			.field("extent", &self.options.extent)
			.field("plotted", &self.plotted)
			.field("label", &self.label)
			.finish()
	}
}

/// Encodes `image` as PNG next to `path`, then renames it into place.
fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
	let mut buffer: Vec<u8> = Vec::new();
	PngEncoder::new_with_quality(&mut buffer, CompressionType::Fast, FilterType::Adaptive).write_image(
		image.as_raw(),
		image.width(),
		image.height(),
		ExtendedColorType::Rgba8,
	)?;

	let mut name = OsString::from(".");
	name.push(path.file_name().unwrap_or_default());
	name.push(".tmp");
	let temp = path.with_file_name(name);

	std::fs::write(&temp, &buffer)?;
	std::fs::rename(&temp, path)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{SolidBackground, text::tests::test_font};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
	const SEA: Rgba<u8> = Rgba([164, 198, 227, 255]);

	fn canvas(dir: &tempfile::TempDir) -> MapCanvas {
		MapCanvas::new(
			CanvasOptions {
				output: dir.path().join("map.png"),
				..CanvasOptions::default()
			},
			None,
		)
		.unwrap()
	}

	fn pixel_at(canvas: &mut MapCanvas, x: f64, y: f64) -> Rgba<u8> {
		let (px, py) = canvas.viewport().to_pixel(x, y);
		*canvas.render().get_pixel(px.round() as u32, py.round() as u32)
	}

	#[test]
	fn default_figure() {
		let dir = tempfile::tempdir().unwrap();
		let canvas = canvas(&dir);
		assert_eq!(canvas.size(), (1350, 750));
		assert_eq!(canvas.marker_radius(), 2);
		assert_eq!(canvas.label_anchor(), (-153.0, -81.0));
		assert_eq!(canvas.label(), "");
		assert!(canvas.points().is_empty());
	}

	#[rstest]
	#[case(2.0, 150, 2)]
	#[case(2.0, 72, 1)]
	#[case(0.1, 72, 1)]
	#[case(10.0, 300, 21)]
	fn marker_radius(#[case] size: f64, #[case] dpi: u32, #[case] expected: i32) {
		let dir = tempfile::tempdir().unwrap();
		let options = CanvasOptions {
			dpi,
			marker: MarkerStyle { color: RED, size },
			output: dir.path().join("map.png"),
			..CanvasOptions::default()
		};
		assert_eq!(MapCanvas::new(options, None).unwrap().marker_radius(), expected);
	}

	#[test]
	fn plots_points_in_order() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		assert_eq!(pixel_at(&mut canvas, 139.7, 35.7), WHITE);

		canvas.plot_point(139.7, 35.7);
		canvas.plot_point(-0.1, 51.5);

		let points: Vec<(f64, f64)> = canvas.points().iter().map(GeoPoint::as_tuple).collect();
		assert_eq!(points, vec![(139.7, 35.7), (-0.1, 51.5)]);
		assert_eq!(canvas.plotted(), 2);
		assert_eq!(pixel_at(&mut canvas, 139.7, 35.7), RED);
		assert_eq!(pixel_at(&mut canvas, -0.1, 51.5), RED);
		assert_eq!(pixel_at(&mut canvas, 0.0, 0.0), WHITE);
	}

	#[rstest]
	#[case(100.0, 20.0)]
	#[case(f64::NAN, 0.0)]
	#[case(200.0, 0.0)]
	fn ignores_points_outside_extent(#[case] x: f64, #[case] y: f64) {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		canvas
			.set_extent(GeoBBox::new(122.372118838, 29.9785169793, 150.0007330301, 42.4539733251).unwrap())
			.unwrap();
		canvas.plot_point(x, y);
		assert!(canvas.points().is_empty());
		assert_eq!(canvas.plotted(), 0);
	}

	#[test]
	fn set_extent_redraws_markers() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		canvas.plot_point(139.7, 35.7);
		canvas.set_extent(GeoBBox::new(130.0, 30.0, 145.0, 40.0).unwrap()).unwrap();

		assert_eq!(canvas.extent().as_tuple(), (130.0, 30.0, 145.0, 40.0));
		assert_eq!(canvas.points().len(), 1);
		assert_eq!(pixel_at(&mut canvas, 139.7, 35.7), RED);
	}

	#[tokio::test]
	async fn markers_stay_on_top_of_background() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		canvas.plot_point(10.0, 10.0);
		canvas.add_background(&SolidBackground::new(SEA)).await.unwrap();

		assert_eq!(pixel_at(&mut canvas, 10.0, 10.0), RED);
		assert_eq!(pixel_at(&mut canvas, -10.0, -10.0), SEA);
		assert_eq!(*canvas.render().get_pixel(5, 5), WHITE);
	}

	#[tokio::test]
	async fn finished_layout_drops_history() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		canvas.plot_point(139.7, 35.7);
		canvas.finish_layout();
		canvas.plot_point(-0.1, 51.5);

		assert!(canvas.points().is_empty());
		assert_eq!(canvas.plotted(), 2);
		assert_eq!(pixel_at(&mut canvas, 139.7, 35.7), RED);
		assert_eq!(pixel_at(&mut canvas, -0.1, 51.5), RED);

		let err = canvas.set_extent(GeoBBox::world()).unwrap_err();
		assert_eq!(err.to_string(), "map layout is already finished");
		assert!(canvas.add_background(&SolidBackground::new(SEA)).await.is_err());
		assert_eq!(pixel_at(&mut canvas, 0.0, 0.0), WHITE);
	}

	#[test]
	fn label_box_is_drawn_at_anchor() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = MapCanvas::new(
			CanvasOptions {
				output: dir.path().join("map.png"),
				..CanvasOptions::default()
			},
			Some(test_font()),
		)
		.unwrap();
		let blank = canvas.render();
		let (x, y) = canvas.label_anchor();
		let (px, py) = canvas.viewport().to_pixel(x, y);
		let (px, py) = (px.round() as i64, py.round() as i64);
		assert_eq!(*blank.get_pixel(px as u32, py as u32), WHITE);

		canvas.set_label_text("Tweets : 2");
		let image = canvas.render();
		let colors = LabelStyle::default().colors;
		assert_ne!(*image.get_pixel(px as u32, py as u32), WHITE);
		assert!(image.pixels().any(|p| *p == colors.face));
		assert!(image.pixels().any(|p| *p == colors.edge));
		assert!(image.pixels().any(|p| p.0[0] < 150));

		// 9 pt at 150 dpi: the box stays within a few text heights of the anchor
		for (ix, iy, pixel) in image.enumerate_pixels() {
			if pixel != blank.get_pixel(ix, iy) {
				assert!((i64::from(ix) - px).abs() < 100, "pixel ({ix}, {iy}) changed");
				assert!((i64::from(iy) - py).abs() < 30, "pixel ({ix}, {iy}) changed");
			}
		}

		canvas.set_label_text("");
		assert!(canvas.render() == blank);
	}

	#[test]
	fn title_is_drawn_above_axes() {
		let dir = tempfile::tempdir().unwrap();
		let options = CanvasOptions {
			title: Some(String::from("Tweets worldwide")),
			output: dir.path().join("map.png"),
			..CanvasOptions::default()
		};
		let mut titled = MapCanvas::new(options.clone(), Some(test_font())).unwrap();
		let mut plain = MapCanvas::new(CanvasOptions { title: None, ..options }, Some(test_font())).unwrap();

		let top = titled.viewport().top as u32;
		let (titled, plain) = (titled.render(), plain.render());
		let changed: Vec<u32> = titled
			.enumerate_pixels()
			.filter(|(x, y, p)| *p != plain.get_pixel(*x, *y))
			.map(|(_, y, _)| y)
			.collect();
		assert!(!changed.is_empty());
		assert!(changed.iter().all(|y| *y < top));
	}

	#[test]
	fn refresh_writes_png() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		canvas.set_label_text("Tweets : 1");
		canvas.plot_point(139.7, 35.7);
		canvas.refresh().unwrap();
		canvas.refresh().unwrap();

		let image = image::open(dir.path().join("map.png")).unwrap().to_rgba8();
		assert_eq!(image.dimensions(), (1350, 750));
		let (px, py) = canvas.viewport().to_pixel(139.7, 35.7);
		assert_eq!(*image.get_pixel(px.round() as u32, py.round() as u32), RED);

		let names: Vec<_> = std::fs::read_dir(dir.path())
			.unwrap()
			.map(|e| e.unwrap().file_name())
			.collect();
		assert_eq!(names, vec![OsString::from("map.png")]);
	}

	#[test]
	fn refresh_reports_missing_directory() {
		let dir = tempfile::tempdir().unwrap();
		let output = dir.path().join("missing").join("map.png");
		let mut canvas = MapCanvas::new(
			CanvasOptions {
				output: output.clone(),
				..CanvasOptions::default()
			},
			None,
		)
		.unwrap();
		let err = canvas.refresh().unwrap_err();
		assert_eq!(err.to_string(), format!("Failed to write map to '{}'", output.display()));
	}

	#[test]
	fn label_text_is_tracked_without_font() {
		let dir = tempfile::tempdir().unwrap();
		let mut canvas = canvas(&dir);
		let blank = canvas.render();
		canvas.set_label_text("Tweets : 0");
		assert_eq!(canvas.label(), "Tweets : 0");
		assert!(canvas.render() == blank);
	}

	#[rstest]
	#[case(0.0, 5.0, 150)]
	#[case(9.0, 5.0, 0)]
	#[case(100.0, 5.0, 150)]
	fn rejects_bad_figure_size(#[case] width: f64, #[case] height: f64, #[case] dpi: u32) {
		let options = CanvasOptions {
			width,
			height,
			dpi,
			..CanvasOptions::default()
		};
		assert!(MapCanvas::new(options, None).is_err());
	}

	#[test]
	fn rejects_output_without_file_name() {
		let options = CanvasOptions {
			output: PathBuf::from(".."),
			..CanvasOptions::default()
		};
		assert!(MapCanvas::new(options, None).is_err());
	}
}
