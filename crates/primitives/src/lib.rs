//! Core types for text annotations: node ids, offset ranges, spans, and marker types.

/// Rectangle type for cached render geometry.
pub mod geometry;
/// Identifier types for document nodes.
pub mod ids;
/// Marker type tags and bitmasks.
pub mod marker_type;
/// Half-open character offset ranges.
pub mod range;
/// Ranges spanning one or more document nodes.
pub mod span;
/// Sentence and word boundary detection.
pub mod text;

pub use geometry::Rect;
pub use ids::NodeId;
pub use marker_type::{MarkerType, MarkerTypes};
pub use range::{CharIdx, CharLen, Delta, OffsetRange};
pub use ropey::{Rope, RopeSlice};
pub use span::NodeSpan;
