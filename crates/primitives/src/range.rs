/// A position in node text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for markers and check requests.
pub type CharIdx = usize;

/// A length or count in node text, measured in characters (not bytes).
pub type CharLen = usize;

/// A signed offset adjustment applied when text is inserted or removed.
pub type Delta = isize;

/// A half-open character range `[start, end)` within a single node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OffsetRange {
	/// First character covered by the range.
	pub start: CharIdx,
	/// One past the last character covered by the range.
	pub end: CharIdx,
}

impl OffsetRange {
	/// Creates a new range. `end` is clamped up to `start`.
	pub fn new(start: CharIdx, end: CharIdx) -> Self {
		debug_assert!(end >= start, "inverted range {start}..{end}");
		Self {
			start,
			end: end.max(start),
		}
	}

	/// Creates a range from a start offset and a length.
	///
	/// The end saturates, so `len = usize::MAX` means "to the end of the node".
	pub fn with_len(start: CharIdx, len: CharLen) -> Self {
		Self {
			start,
			end: start.saturating_add(len),
		}
	}

	/// Creates a range from a start offset and a length, or `None` if the end overflows.
	pub fn checked_with_len(start: CharIdx, len: CharLen) -> Option<Self> {
		Some(Self {
			start,
			end: start.checked_add(len)?,
		})
	}

	/// Creates an empty range at `pos`.
	pub fn point(pos: CharIdx) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns the length of the range in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	/// Returns true if the range covers no characters.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `pos` is within the range (exclusive of end).
	#[inline]
	pub fn contains(&self, pos: CharIdx) -> bool {
		pos >= self.start && pos < self.end
	}

	/// Returns true if `other` lies entirely inside this range.
	#[inline]
	pub fn contains_range(&self, other: &OffsetRange) -> bool {
		other.start >= self.start && other.end <= self.end
	}

	/// Returns true if the two ranges share at least one character.
	#[inline]
	pub fn overlaps(&self, other: &OffsetRange) -> bool {
		self.start < other.end && other.start < self.end
	}

	/// Returns true if the ranges overlap or abut.
	#[inline]
	pub fn touches(&self, other: &OffsetRange) -> bool {
		self.start <= other.end && other.start <= self.end
	}

	/// Smallest range covering both ranges.
	pub fn union(&self, other: &OffsetRange) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Shared part of two ranges, if any characters are shared.
	pub fn intersection(&self, other: &OffsetRange) -> Option<Self> {
		let start = self.start.max(other.start);
		let end = self.end.min(other.end);
		(start < end).then_some(Self { start, end })
	}

	/// Adds `delta` to both bounds.
	///
	/// Negative results are the caller's responsibility; they wrap in release builds.
	#[inline]
	pub fn shift(&self, delta: Delta) -> Self {
		debug_assert!(
			self.start.checked_add_signed(delta).is_some(),
			"shift {delta} underflows {self:?}"
		);
		Self {
			start: self.start.wrapping_add_signed(delta),
			end: self.end.wrapping_add_signed(delta),
		}
	}

	/// Clamps both bounds to `[0, max]`.
	pub fn clamp(&self, max: CharIdx) -> Self {
		Self {
			start: self.start.min(max),
			end: self.end.min(max),
		}
	}
}

impl From<std::ops::Range<CharIdx>> for OffsetRange {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl From<OffsetRange> for std::ops::Range<CharIdx> {
	fn from(range: OffsetRange) -> Self {
		range.start..range.end
	}
}
