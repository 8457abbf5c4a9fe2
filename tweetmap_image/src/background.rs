//! Backgrounds painted into the axes area before any marker is drawn.

use crate::Viewport;
use anyhow::{Context, Result, bail, ensure};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use reqwest::{Client, StatusCode};
use std::{collections::HashMap, time::Duration};
use tokio::time::sleep;
use tweetmap_core::{MAX_MERCATOR_LAT, TileCoord};

/// Something that can fill the axes area of a canvas.
#[async_trait]
pub trait BackgroundSource: Send + Sync {
	/// Short description for log lines.
	fn name(&self) -> String;

	/// Paints the pixels of `image` covered by `viewport`.
	async fn paint(&self, image: &mut RgbaImage, viewport: &Viewport) -> Result<()>;
}

/// Fills the axes with a single colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolidBackground {
	pub color: Rgba<u8>,
}

impl SolidBackground {
	pub fn new(color: Rgba<u8>) -> Self {
		SolidBackground { color }
	}
}

#[async_trait]
impl BackgroundSource for SolidBackground {
	fn name(&self) -> String {
		format!("solid {}", crate::color::to_hex(self.color))
	}

	async fn paint(&self, image: &mut RgbaImage, viewport: &Viewport) -> Result<()> {
		let (x0, y0, x1, y1) = viewport.pixel_bounds();
		for y in y0..y1.min(image.height()) {
			for x in x0..x1.min(image.width()) {
				image.put_pixel(x, y, self.color);
			}
		}
		Ok(())
	}
}

const MAX_RETRIES: u32 = 3;
const MAX_TILES: usize = 256;

fn is_retryable_error(err: &reqwest::Error) -> bool {
	err.is_connect() || err.is_timeout() || err.is_body()
}

/// Web Mercator raster tiles, reprojected into the Plate Carrée axes.
#[derive(Debug)]
pub struct TileBackground {
	client: Client,
	url_template: String,
	zoom: u8,
	fallback: Rgba<u8>,
}

impl TileBackground {
	/// `url_template` must contain `{z}`, `{x}` and `{y}`.
	pub fn new(url_template: &str, zoom: u8) -> Result<TileBackground> {
		match url_template.split_once("://").map(|(scheme, _)| scheme) {
			Some("http" | "https") => (),
			_ => bail!("unsupported tile URL '{url_template}', expected 'http' or 'https'"),
		}
		for placeholder in ["{z}", "{x}", "{y}"] {
			ensure!(
				url_template.contains(placeholder),
				"tile URL '{url_template}' is missing the placeholder {placeholder}"
			);
		}
		ensure!(zoom <= 20, "tile zoom level ({zoom}) must be <= 20");

		let client = Client::builder()
			.user_agent(concat!("tweetmap/", env!("CARGO_PKG_VERSION")))
			.tcp_keepalive(Duration::from_secs(600))
			.connect_timeout(Duration::from_secs(30))
			.build()?;

		Ok(TileBackground {
			client,
			url_template: url_template.to_string(),
			zoom,
			fallback: Rgba([255, 255, 255, 255]),
		})
	}

	/// Colour for pixels without tile data, e.g. beyond the Mercator latitude limit.
	#[must_use]
	pub fn with_fallback(mut self, color: Rgba<u8>) -> Self {
		self.fallback = color;
		self
	}

	async fn fetch_tile(&self, coord: &TileCoord) -> Result<RgbaImage> {
		let url = coord.fill_template(&self.url_template);

		for attempt in 0..=MAX_RETRIES {
			if attempt > 0 {
				let backoff = Duration::from_secs(1 << (attempt - 1));
				log::warn!("retry attempt {attempt}/{MAX_RETRIES} fetching '{url}', waiting {backoff:?}");
				sleep(backoff).await;
			}

			let response = match self.client.get(&url).send().await {
				Ok(r) => r,
				Err(e) if is_retryable_error(&e) && attempt < MAX_RETRIES => {
					log::warn!("retryable error: {e}");
					continue;
				}
				Err(e) => return Err(e.into()),
			};

			if response.status() != StatusCode::OK {
				bail!("expected HTTP 200, got {}", response.status());
			}

			let bytes = match response.bytes().await {
				Ok(b) => b,
				Err(e) if is_retryable_error(&e) && attempt < MAX_RETRIES => {
					log::warn!("retryable error: {e}");
					continue;
				}
				Err(e) => return Err(e.into()),
			};

			return Ok(image::load_from_memory(&bytes)?.to_rgba8());
		}

		bail!("failed after {MAX_RETRIES} retries")
	}
}

#[async_trait]
impl BackgroundSource for TileBackground {
	fn name(&self) -> String {
		format!("tiles '{}' at zoom {}", self.url_template, self.zoom)
	}

	async fn paint(&self, image: &mut RgbaImage, viewport: &Viewport) -> Result<()> {
		let coords = TileCoord::covering(&viewport.extent, self.zoom)?;
		ensure!(
			coords.len() <= MAX_TILES,
			"{} tiles needed at zoom {}, at most {MAX_TILES} are allowed",
			coords.len(),
			self.zoom
		);

		let mut tiles: HashMap<(u32, u32), RgbaImage> = HashMap::new();
		for coord in &coords {
			let tile = self
				.fetch_tile(coord)
				.await
				.with_context(|| format!("Failed to fetch background tile {coord:?}"))?;
			tiles.insert((coord.x, coord.y), tile);
		}
		log::info!("fetched {} background tiles from {}", tiles.len(), self.name());

		let last = (1u32 << self.zoom) - 1;
		let (x0, y0, x1, y1) = viewport.pixel_bounds();
		for py in y0..y1.min(image.height()) {
			for px in x0..x1.min(image.width()) {
				let (lon, lat) = viewport.to_geo(f64::from(px) + 0.5, f64::from(py) + 0.5);
				let color = if lat.abs() > MAX_MERCATOR_LAT {
					self.fallback
				} else {
					let (fx, fy) = TileCoord::geo_to_position(lon, lat, self.zoom);
					let tx = (fx.max(0.0).floor() as u32).min(last);
					let ty = (fy.max(0.0).floor() as u32).min(last);
					match tiles.get(&(tx, ty)) {
						Some(tile) => {
							let sx = (((fx - f64::from(tx)) * f64::from(tile.width())) as u32).min(tile.width() - 1);
							let sy = (((fy - f64::from(ty)) * f64::from(tile.height())) as u32).min(tile.height() - 1);
							*tile.get_pixel(sx, sy)
						}
						None => self.fallback,
					}
				};
				image.put_pixel(px, py, color);
			}
		}
		Ok(())
	}
}
