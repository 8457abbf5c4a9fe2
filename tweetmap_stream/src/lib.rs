//! Authenticated access to a location-filtered post stream.
//!
//! - [`CredentialProvider`] supplies the four OAuth 1.0a secrets.
//! - [`OAuthSigner`] signs every connection attempt.
//! - [`StreamClient`] opens the subscription and blocks in its receive loop.
//! - [`StreamListener`] is implemented by the application and called once per message.
//!
//! ```rust,no_run
//! use tweetmap_core::{GeoBBox, PostEvent};
//! use tweetmap_stream::{Credentials, ListenerControl, StreamClient, StreamListener};
//!
//! struct Printer;
//!
//! impl StreamListener for Printer {
//!     fn on_event(&mut self, event: &PostEvent) -> anyhow::Result<ListenerControl> {
//!         println!("{:?}", event.point());
//!         Ok(ListenerControl::Continue)
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::new("key", "secret", "token", "token secret");
//!     let mut client = StreamClient::builder(&credentials)?.build()?;
//!     client.filter(&GeoBBox::world(), &mut Printer).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod credentials;
mod framing;
mod listener;
mod oauth;

pub use client::*;
pub use credentials::*;
pub use framing::LineSplitter;
pub use listener::*;
pub use oauth::OAuthSigner;
