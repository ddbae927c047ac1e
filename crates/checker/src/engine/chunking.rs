use lectern_markers::MarkerStore;
use lectern_primitives::text::{sentence_boundaries, snap_to_sentence_end};
use lectern_primitives::{CharIdx, NodeId, OffsetRange};

use crate::request::{CheckTypes, PriorMarker};

/// Splits `text` into ranges of about `chunk_size` chars for batch checking.
///
/// Each chunk end is pushed forward to the next sentence boundary so no sentence
/// straddles two requests. Chunks are contiguous, non-empty and cover the whole text.
pub fn plan_chunks(text: &str, chunk_size: usize) -> Vec<OffsetRange> {
	let len = text.chars().count();
	if len == 0 {
		return Vec::new();
	}
	let chunk_size = chunk_size.max(1);
	if len <= chunk_size {
		return vec![OffsetRange::new(0, len)];
	}

	let boundaries = sentence_boundaries(text);
	let mut chunks = Vec::with_capacity(len / chunk_size + 1);
	let mut start: CharIdx = 0;
	while start < len {
		let tentative = (start + chunk_size).min(len);
		let end = snap_to_sentence_end(&boundaries, tentative).min(len);
		chunks.push(OffsetRange::new(start, end));
		start = end;
	}
	chunks
}

/// Markers of the requested types already covering `range` of `node`, rebased so that
/// `range.start` is offset 0.
pub(super) fn prior_markers(store: &MarkerStore, node: NodeId, range: OffsetRange, types: CheckTypes) -> Vec<PriorMarker> {
	store
		.markers_for(node, types.marker_types())
		.into_iter()
		.filter_map(|marker| {
			let clipped = marker.range().intersection(&range)?;
			Some(PriorMarker {
				fingerprint: marker.fingerprint(),
				range: OffsetRange::new(clipped.start - range.start, clipped.end - range.start),
			})
		})
		.collect()
}
