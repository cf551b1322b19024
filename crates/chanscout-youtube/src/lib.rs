//! Minimal client for the `YouTube` Data API v3.
//!
//! Covers the four read endpoints channel discovery needs: `search`,
//! `channels`, `playlistItems`, and `videos`. Every call costs quota on the
//! platform side; this crate does not track it, callers do.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

mod channels;
mod search;
mod uploads;

pub use client::YoutubeClient;
pub use error::YoutubeError;
