//! Range math and piece/segment planning.
//!
//! `piece` splits a download into fixed-size pieces (the unit the Segment
//! Manager schedules and verifies); `range`'s fixed-*count* equal split and
//! `bitmap`'s completion bitmap remain available for ad-hoc range
//! partitioning and DB-blob-backed progress caches.

mod bitmap;
mod piece;
mod range;

pub use bitmap::SegmentBitmap;
pub use piece::{clamp_piece_size, plan_pieces, Piece, PieceState};
pub use range::{plan_segments, Segment};
