use ropey::RopeSlice;
use unicode_segmentation::UnicodeSegmentation;

use crate::range::{CharIdx, OffsetRange};

/// Returns the char offsets at which sentences end in `text`.
///
/// The list is strictly increasing and always ends with the text length (for non-empty
/// text). Offset 0 is never included.
pub fn sentence_boundaries(text: &str) -> Vec<CharIdx> {
	let mut boundaries = Vec::new();
	let mut chars: CharIdx = 0;
	for sentence in text.split_sentence_bounds() {
		chars += sentence.chars().count();
		boundaries.push(chars);
	}
	boundaries
}

/// Snaps `idx` outward to the first sentence boundary at or after it.
///
/// Falls back to `idx` itself when no boundary follows (only possible when `idx` is
/// beyond the analyzed text).
pub fn snap_to_sentence_end(boundaries: &[CharIdx], idx: CharIdx) -> CharIdx {
	let pos = boundaries.partition_point(|b| *b < idx);
	boundaries.get(pos).copied().unwrap_or(idx)
}

/// Returns the word containing `char_idx`, or the word ending exactly at it.
///
/// Words follow Unicode word boundaries, so contractions such as `don't` stay whole.
pub fn word_range_at(text: RopeSlice, char_idx: CharIdx) -> Option<OffsetRange> {
	let len = text.len_chars();
	if len == 0 || char_idx > len {
		return None;
	}

	// Words never cross lines, so only the surrounding line needs segmenting.
	let line_idx = text.char_to_line(char_idx.min(len.saturating_sub(1)));
	let line_start = text.line_to_char(line_idx);
	let line: String = text.line(line_idx).into();

	let mut offset = line_start;
	for segment in line.split_word_bounds() {
		let seg_len = segment.chars().count();
		let range = OffsetRange::with_len(offset, seg_len);
		let is_word = segment.chars().any(char::is_alphanumeric);
		if is_word && (range.contains(char_idx) || range.end == char_idx) {
			return Some(range);
		}
		offset += seg_len;
		if offset > char_idx {
			break;
		}
	}
	None
}

/// Converts a char range into a byte range of `text`, clamping to the text length.
pub fn byte_range(text: &str, range: OffsetRange) -> std::ops::Range<usize> {
	let mut indices = text.char_indices().map(|(b, _)| b).chain(std::iter::once(text.len()));
	let start = indices.nth(range.start).unwrap_or(text.len());
	let end = if range.is_empty() {
		start
	} else {
		indices.nth(range.len() - 1).unwrap_or(text.len())
	};
	start..end
}

/// Slices `text` by char offsets.
pub fn slice_chars(text: &str, range: OffsetRange) -> &str {
	&text[byte_range(text, range)]
}
