//! Access to the document being checked.

use lectern_primitives::{CharIdx, NodeId, OffsetRange, Rope};

/// A collapsed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
	pub node: NodeId,
	pub offset: CharIdx,
}

impl Caret {
	pub fn new(node: NodeId, offset: CharIdx) -> Self {
		Self { node, offset }
	}
}

/// The document surface the checker reads from and writes to.
pub trait DocumentHost {
	/// Current text of `node`, or `None` if the node is gone.
	fn text(&self, node: NodeId) -> Option<Rope>;

	/// Editable root containing `node`. Requests are coalesced per root.
	fn editable_root(&self, node: NodeId) -> NodeId;

	/// Paragraph of `node` containing `offset`.
	///
	/// Paragraphs default to lines of the node text, without the line break.
	fn paragraph_range(&self, node: NodeId, offset: CharIdx) -> Option<OffsetRange> {
		let text = self.text(node)?;
		let len = text.len_chars();
		if offset > len {
			return None;
		}
		let line = text.char_to_line(offset);
		let start = text.line_to_char(line);
		let mut end = if line + 1 < text.len_lines() {
			text.line_to_char(line + 1)
		} else {
			len
		};
		while end > start && matches!(text.char(end - 1), '\n' | '\r') {
			end -= 1;
		}
		Some(OffsetRange::new(start, end))
	}

	/// The caret, if the selection is collapsed.
	fn selection(&self) -> Option<Caret>;

	fn set_caret(&mut self, caret: Caret);

	/// Replaces `range` of `node` with `replacement`.
	fn replace_text(&mut self, node: NodeId, range: OffsetRange, replacement: &str);
}
