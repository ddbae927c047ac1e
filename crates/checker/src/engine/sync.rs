use lectern_primitives::OffsetRange;
use lectern_primitives::text::slice_chars;
use tracing::trace;

use super::CheckEngine;
use crate::backend::CheckResult;
use crate::request::CheckTypes;

impl CheckEngine {
	/// Checks `text` inline with repeated synchronous backend calls.
	///
	/// Produces the same result schema as the asynchronous path: spelling results
	/// first, then grammar results, each in text order.
	pub fn check_text_sync(&mut self, text: &str, types: CheckTypes) -> Vec<CheckResult> {
		let len = text.chars().count();
		let mut results = Vec::new();

		if types.contains(CheckTypes::SPELLING) {
			let mut offset = 0;
			while offset < len {
				let rest = slice_chars(text, OffsetRange::new(offset, len));
				let Some((location, length)) = self.backend.check_spelling(rest) else {
					break;
				};
				let Some(found) = offset
					.checked_add(location)
					.and_then(|start| OffsetRange::checked_with_len(start, length))
					.filter(|found| !found.is_empty() && found.end <= len)
				else {
					break;
				};
				results.push(CheckResult::spelling(found.start, found.len()));
				offset = found.end;
			}
		}

		if types.contains(CheckTypes::GRAMMAR) {
			let mut offset = 0;
			while offset < len {
				let rest = slice_chars(text, OffsetRange::new(offset, len));
				let check = self.backend.check_grammar(rest);
				let Some(bad) = check
					.bad_span
					.filter(|span| !span.is_empty() && span.end <= len - offset)
				else {
					break;
				};
				results.push(CheckResult::grammar(offset + bad.start, bad.len(), check.details));
				offset += bad.end;
			}
		}

		trace!(chars = len, results = results.len(), "check.sync");
		results
	}
}
