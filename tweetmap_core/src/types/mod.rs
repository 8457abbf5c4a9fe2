//! Contains types like coordinates, bounding boxes (bboxes) and tile coordinates.

mod geo_bbox;
pub use geo_bbox::*;

mod geo_point;
pub use geo_point::*;

mod tile_coord;
pub use tile_coord::*;
