//! Contains geographic types (bounding boxes, points, tile coordinates) and the
//! messages that arrive on a filtered post stream.

pub mod stream;
pub mod types;

pub use stream::*;
pub use types::*;
