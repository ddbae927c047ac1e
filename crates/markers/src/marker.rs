use lectern_primitives::{CharIdx, Delta, MarkerType, OffsetRange, Rect};
use smallvec::SmallVec;

/// Optional payload carried by a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MarkerDetail {
	/// No payload.
	#[default]
	None,
	/// Free-text description, e.g. a grammar explanation or replacement suggestion.
	Description(String),
	/// Whether a text-match highlight is the active match.
	ActiveMatch(bool),
}

/// Lazily computed render geometry for a marker.
///
/// Starts out invalid; the renderer fills it in and any offset change invalidates it.
#[derive(Debug, Clone, Default)]
pub struct RenderedRects {
	rects: SmallVec<[Rect; 1]>,
	valid: bool,
}

impl RenderedRects {
	/// Returns the cached rects, or `None` if they need recomputing.
	pub fn get(&self) -> Option<&[Rect]> {
		self.valid.then_some(self.rects.as_slice())
	}

	/// Returns true if the cache holds current geometry.
	pub fn is_valid(&self) -> bool {
		self.valid
	}

	fn set(&mut self, rects: impl IntoIterator<Item = Rect>) {
		self.rects.clear();
		self.rects.extend(rects);
		self.valid = true;
	}

	fn invalidate(&mut self) {
		self.rects.clear();
		self.valid = false;
	}
}

/// An annotation over a half-open character range of one node's text.
///
/// Identity is `(type, start, end)`: two markers with equal type and range compare equal
/// even if their detail or fingerprint differ.
#[derive(Debug, Clone)]
pub struct Marker {
	ty: MarkerType,
	range: OffsetRange,
	detail: MarkerDetail,
	fingerprint: u32,
	rects: RenderedRects,
}

impl Marker {
	/// Creates a marker without detail.
	pub fn new(ty: MarkerType, range: impl Into<OffsetRange>) -> Self {
		Self {
			ty,
			range: range.into(),
			detail: MarkerDetail::None,
			fingerprint: 0,
			rects: RenderedRects::default(),
		}
	}

	/// Creates a text-match marker carrying an active flag.
	pub fn text_match(range: impl Into<OffsetRange>, active: bool) -> Self {
		Self::new(MarkerType::TextMatch, range).with_detail(MarkerDetail::ActiveMatch(active))
	}

	/// Attaches a description. An empty description leaves the marker without detail.
	pub fn with_description(self, description: impl Into<String>) -> Self {
		let description = description.into();
		if description.is_empty() {
			self
		} else {
			self.with_detail(MarkerDetail::Description(description))
		}
	}

	/// Attaches the backend content fingerprint.
	pub fn with_fingerprint(mut self, fingerprint: u32) -> Self {
		self.fingerprint = fingerprint;
		self
	}

	/// Replaces the detail payload.
	pub fn with_detail(mut self, detail: MarkerDetail) -> Self {
		self.detail = detail;
		self
	}

	#[inline]
	pub fn marker_type(&self) -> MarkerType {
		self.ty
	}

	#[inline]
	pub fn start(&self) -> CharIdx {
		self.range.start
	}

	#[inline]
	pub fn end(&self) -> CharIdx {
		self.range.end
	}

	#[inline]
	pub fn range(&self) -> OffsetRange {
		self.range
	}

	pub fn detail(&self) -> &MarkerDetail {
		&self.detail
	}

	pub fn fingerprint(&self) -> u32 {
		self.fingerprint
	}

	/// Description text, or `""` when the marker has no description.
	pub fn description(&self) -> &str {
		match &self.detail {
			MarkerDetail::Description(text) => text,
			_ => "",
		}
	}

	/// Active flag, or `false` when the marker is not an active-match marker.
	pub fn active_match(&self) -> bool {
		matches!(self.detail, MarkerDetail::ActiveMatch(true))
	}

	/// Sets the active flag. No-op unless the marker already carries an active flag.
	pub fn set_active_match(&mut self, active: bool) {
		if let MarkerDetail::ActiveMatch(flag) = &mut self.detail {
			*flag = active;
		}
	}

	/// Replaces the description. Text-match markers keep their active flag instead.
	pub fn set_description(&mut self, description: impl Into<String>) {
		if matches!(self.detail, MarkerDetail::ActiveMatch(_)) {
			return;
		}
		let description = description.into();
		self.detail = if description.is_empty() {
			MarkerDetail::None
		} else {
			MarkerDetail::Description(description)
		};
	}

	/// Drops a description payload, keeping any other detail.
	pub fn clear_description(&mut self) -> bool {
		if matches!(self.detail, MarkerDetail::Description(_)) {
			self.detail = MarkerDetail::None;
			true
		} else {
			false
		}
	}

	/// Adds `delta` to both bounds. Bounds checking is the caller's job.
	pub fn shift_offsets(&mut self, delta: Delta) {
		self.range = self.range.shift(delta);
	}

	pub fn rendered_rects(&self) -> &RenderedRects {
		&self.rects
	}

	pub fn set_rendered_rects(&mut self, rects: impl IntoIterator<Item = Rect>) {
		self.rects.set(rects);
	}

	pub fn invalidate_rendered_rects(&mut self) {
		self.rects.invalidate();
	}

	/// Copy of this marker restricted to `range`, keeping detail and fingerprint.
	pub(crate) fn with_range(&self, range: OffsetRange) -> Self {
		Self {
			ty: self.ty,
			range,
			detail: self.detail.clone(),
			fingerprint: self.fingerprint,
			rects: RenderedRects::default(),
		}
	}

	/// Widens this marker to cover `other` as well.
	pub(crate) fn absorb(&mut self, other: &OffsetRange) {
		self.range = self.range.union(other);
		self.rects.invalidate();
	}
}

impl PartialEq for Marker {
	fn eq(&self, other: &Self) -> bool {
		self.ty == other.ty && self.range == other.range
	}
}

impl Eq for Marker {}
