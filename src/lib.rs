//! HLS reverse proxy.
//!
//! Targets are addressed by opaque tokens ([`token`]); upstream requests get
//! spoofed per-host headers ([`domains`]); playlists are rewritten so every
//! nested reference routes back through the proxy ([`hls`]).

pub mod config;
pub mod domains;
pub mod error;
pub mod hls;
pub mod metrics;
pub mod server;
pub mod token;
