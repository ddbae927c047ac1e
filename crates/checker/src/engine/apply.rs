//! Turning backend results into markers.

use lectern_markers::{Marker, MarkerStore, OverlapRule};
use lectern_primitives::text::slice_chars;
use lectern_primitives::{CharIdx, Delta, MarkerType, MarkerTypes, NodeId, OffsetRange};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::CheckEngine;
use crate::backend::{CheckResult, Decoration};
use crate::host::{Caret, DocumentHost};
use crate::request::{CheckTypes, Request};

/// One autocorrection applied to the node text.
#[derive(Debug, Clone, Copy)]
struct Correction {
	/// Replaced range in pre-correction node offsets.
	original: OffsetRange,
	/// Replacement range in post-correction node offsets.
	replaced: OffsetRange,
}

impl Correction {
	fn delta(&self) -> Delta {
		self.replaced.len() as Delta - self.original.len() as Delta
	}
}

impl CheckEngine {
	/// Applies `results` for `request`, returning how many markers were added.
	///
	/// Results whose snapshot no longer matches the node text are dropped. Otherwise
	/// markers of the requested types in the checked range are replaced by the new
	/// results. With [`CheckTypes::CORRECTION`], spelling results away from the caret
	/// that have an autocorrect suggestion are fixed in the text instead of marked.
	pub fn apply_results(
		&mut self,
		store: &mut MarkerStore,
		host: &mut dyn DocumentHost,
		request: &Request,
		mut results: Vec<CheckResult>,
	) -> usize {
		let scope = *request.scope();
		let node = scope.node;
		let Some(text) = host.text(node) else {
			debug!(seq = %request.sequence(), node = %node, "check.apply.node_gone");
			return 0;
		};
		let snapshot = OffsetRange::with_len(scope.text_start, request.text().chars().count());
		if snapshot.end > text.len_chars() || text.slice(snapshot.start..snapshot.end) != request.text() {
			debug!(seq = %request.sequence(), node = %node, "check.apply.stale");
			return 0;
		}

		let base = scope.text_start as Delta;
		let check = request.check_range();
		let checked = check.shift(base);
		store.remove_markers_in_range(
			node,
			checked.start,
			checked.len(),
			request.types().marker_types(),
			OverlapRule::KeepResidue,
		);

		let caret = host.selection().filter(|caret| caret.node == node);
		let ambiguous_end = caret.and_then(|caret| self.ambiguous_boundary_before(request, caret.offset));
		let correcting = request.types().contains(CheckTypes::CORRECTION);

		results.sort_by_key(|result| result.location);
		let mut delta: Delta = 0;
		let mut corrections: SmallVec<[Correction; 2]> = SmallVec::new();
		let mut added = 0;

		for result in &results {
			let Some(range) = result
				.range()
				.filter(|range| !range.is_empty() && check.contains_range(range))
			else {
				trace!(seq = %request.sequence(), location = result.location, "check.apply.outside");
				continue;
			};
			let original = range.shift(base);

			match result.decoration {
				Decoration::Grammar if result.details.is_empty() => {
					mark(store, node, MarkerType::Grammar, original.shift(delta), &result.replacement, result.fingerprint);
					added += 1;
				}
				Decoration::Grammar => {
					for detail in &result.details {
						let Some(detail_range) = range
							.start
							.checked_add(detail.location)
							.and_then(|start| OffsetRange::checked_with_len(start, detail.length))
							.filter(|detail_range| !detail_range.is_empty() && check.contains_range(detail_range))
						else {
							continue;
						};
						mark(
							store,
							node,
							MarkerType::Grammar,
							detail_range.shift(base + delta),
							&detail.description,
							result.fingerprint,
						);
						added += 1;
					}
				}
				Decoration::Spelling if ambiguous_end == Some(range.end) => {
					trace!(seq = %request.sequence(), location = result.location, "check.apply.ambiguous");
				}
				Decoration::Spelling | Decoration::InvisibleSpellcheck => {
					let near_caret = caret.is_some_and(|caret| original.start <= caret.offset && caret.offset <= original.end);
					if correcting
						&& result.decoration == Decoration::Spelling
						&& !near_caret
						&& let Some(correction) =
							self.auto_correct(store, host, node, slice_chars(request.text(), range), original, delta)
					{
						delta += correction.delta();
						corrections.push(correction);
						continue;
					}
					mark(
						store,
						node,
						result.decoration.marker_type(),
						original.shift(delta),
						&result.replacement,
						result.fingerprint,
					);
					added += 1;
				}
			}
		}

		if let Some(caret) = caret
			&& !corrections.is_empty()
		{
			restore_caret(host, caret, &corrections);
		}

		trace!(
			seq = %request.sequence(),
			node = %node,
			results = results.len(),
			added,
			corrections = corrections.len(),
			"check.apply"
		);
		added
	}

	/// Offset (relative to the request text) of an ambiguous boundary char right
	/// before the caret.
	fn ambiguous_boundary_before(&self, request: &Request, caret: CharIdx) -> Option<CharIdx> {
		let before = caret.checked_sub(request.scope().text_start)?.checked_sub(1)?;
		let c = request.text().chars().nth(before)?;
		self.config.is_ambiguous_boundary(c).then_some(before)
	}

	/// Replaces a misspelled word with the backend's autocorrection.
	///
	/// `original` is in pre-correction offsets; `delta` is the shift accumulated by
	/// earlier corrections in the same batch.
	fn auto_correct(
		&mut self,
		store: &mut MarkerStore,
		host: &mut dyn DocumentHost,
		node: NodeId,
		word: &str,
		original: OffsetRange,
		delta: Delta,
	) -> Option<Correction> {
		let replacement = self.backend.auto_correct_suggestion(word)?;
		if replacement.is_empty() || replacement == word {
			return None;
		}

		let target = original.shift(delta);
		let replaced = OffsetRange::with_len(target.start, replacement.chars().count());
		host.replace_text(node, target, &replacement);
		store.remove_markers_in_range(node, target.start, target.len(), MarkerTypes::all(), OverlapRule::KeepResidue);

		let correction = Correction { original, replaced };
		store.shift_markers(node, target.end, correction.delta());
		debug!(node = %node, from = word, to = %replacement, at = target.start, "check.autocorrect");
		Some(correction)
	}
}

fn mark(store: &mut MarkerStore, node: NodeId, ty: MarkerType, range: OffsetRange, description: &str, fingerprint: u32) {
	store.add_marker(
		node,
		Marker::new(ty, range)
			.with_description(description)
			.with_fingerprint(fingerprint),
	);
}

/// Puts the caret back at its position relative to the corrected text.
///
/// A caret that no longer maps into the node lands one char after the last
/// replacement.
fn restore_caret(host: &mut dyn DocumentHost, caret: Caret, corrections: &[Correction]) {
	let len = host.text(caret.node).map_or(0, |text| text.len_chars());
	let mut mapped = Some(caret.offset);
	for correction in corrections {
		if correction.original.end <= caret.offset {
			mapped = mapped.and_then(|offset| offset.checked_add_signed(correction.delta()));
		}
	}

	let offset = match mapped.filter(|offset| *offset <= len) {
		Some(offset) => offset,
		None => {
			let last_end = corrections.last().map_or(0, |c| c.replaced.end);
			(last_end + 1).min(len)
		}
	};
	trace!(node = %caret.node, from = caret.offset, to = offset, "check.caret.restore");
	host.set_caret(Caret::new(caret.node, offset));
}
