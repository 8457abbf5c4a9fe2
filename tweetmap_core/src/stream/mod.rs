//! Messages delivered on a filtered post stream.
//!
//! Every non-empty line of the stream body is one JSON document. Most of them are posts,
//! the rest are control messages (deletions, rate limit notices, disconnects, stall warnings).

mod message;
mod post_event;

pub use message::*;
pub use post_event::*;
