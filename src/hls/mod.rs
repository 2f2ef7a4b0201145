pub mod attributes;
pub mod classify;
pub mod rewriter;

pub use classify::{is_playlist, is_playlist_response};
pub use rewriter::{PlaylistRewriter, RewriteOutcome, rewrite};
