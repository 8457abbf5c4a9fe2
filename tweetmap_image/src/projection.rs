use anyhow::{Result, ensure};
use tweetmap_core::GeoBBox;

// Subplot area as fractions of the figure, measured from the left and from the top.
const SUBPLOT_LEFT: f64 = 0.125;
const SUBPLOT_RIGHT: f64 = 0.9;
const SUBPLOT_TOP: f64 = 0.12;
const SUBPLOT_BOTTOM: f64 = 0.89;

/// Map projection of the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
	/// Equirectangular: longitude and latitude map linearly to x and y.
	#[default]
	PlateCarree,
}

impl Projection {
	/// Places the axes for `extent` inside a figure of the given pixel size.
	///
	/// One degree of longitude is as wide as one degree of latitude is high, so the axes
	/// shrink along one dimension and are centred in the subplot area.
	pub fn viewport(&self, extent: &GeoBBox, figure_width: u32, figure_height: u32) -> Result<Viewport> {
		ensure!(
			extent.width() > 0.0 && extent.height() > 0.0,
			"extent {extent:?} must have a positive width and height"
		);
		ensure!(
			figure_width > 0 && figure_height > 0,
			"figure size {figure_width}x{figure_height} must not be empty"
		);

		match self {
			Projection::PlateCarree => {
				let box_left = SUBPLOT_LEFT * f64::from(figure_width);
				let box_top = SUBPLOT_TOP * f64::from(figure_height);
				let box_width = (SUBPLOT_RIGHT - SUBPLOT_LEFT) * f64::from(figure_width);
				let box_height = (SUBPLOT_BOTTOM - SUBPLOT_TOP) * f64::from(figure_height);

				let aspect = extent.width() / extent.height();
				let (width, height) = if box_width / box_height > aspect {
					(box_height * aspect, box_height)
				} else {
					(box_width, box_width / aspect)
				};

				Ok(Viewport {
					extent: *extent,
					left: box_left + (box_width - width) / 2.0,
					top: box_top + (box_height - height) / 2.0,
					width,
					height,
				})
			}
		}
	}
}

/// The axes rectangle in figure pixels and the extent it shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub extent: GeoBBox,
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	/// Pixel position of a geographic coordinate. `y` grows downward.
	pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
		let e = &self.extent;
		(
			self.left + (x - e.x_min) / e.width() * self.width,
			self.top + (e.y_max - y) / e.height() * self.height,
		)
	}

	/// Geographic coordinate of a pixel position.
	pub fn to_geo(&self, px: f64, py: f64) -> (f64, f64) {
		let e = &self.extent;
		(
			e.x_min + (px - self.left) / self.width * e.width(),
			e.y_max - (py - self.top) / self.height * e.height(),
		)
	}

	/// Whole pixels covered by the axes as `(x0, y0, x1, y1)`, end exclusive.
	pub fn pixel_bounds(&self) -> (u32, u32, u32, u32) {
		let x0 = self.left.round().max(0.0) as u32;
		let y0 = self.top.round().max(0.0) as u32;
		let x1 = (self.left + self.width).round().max(0.0) as u32;
		let y1 = (self.top + self.height).round().max(0.0) as u32;
		(x0, y0, x1, y1)
	}
}
