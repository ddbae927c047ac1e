/// Kind of annotation attached to a span of node text.
///
/// Each type is stored in its own sorted list per node. All types except
/// [`MarkerType::TextMatch`] keep their list free of overlapping markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerType {
	/// Misspelled word.
	Spelling,
	/// Grammar problem, usually carrying a description.
	Grammar,
	/// Live search-match highlight; overlap is allowed.
	TextMatch,
	/// Spelling result tracked but never painted.
	InvisibleSpellcheck,
}

impl MarkerType {
	/// Number of marker types, and therefore of per-node lists.
	pub const COUNT: usize = 4;

	/// All marker types in list order.
	pub const ALL: [MarkerType; Self::COUNT] = [
		MarkerType::Spelling,
		MarkerType::Grammar,
		MarkerType::TextMatch,
		MarkerType::InvisibleSpellcheck,
	];

	/// Index of this type's list within a node's list array.
	#[inline]
	pub fn index(self) -> usize {
		match self {
			MarkerType::Spelling => 0,
			MarkerType::Grammar => 1,
			MarkerType::TextMatch => 2,
			MarkerType::InvisibleSpellcheck => 3,
		}
	}

	/// Inverse of [`MarkerType::index`].
	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}

	/// Whether markers of this type are merged on insertion.
	#[inline]
	pub fn merges_overlaps(self) -> bool {
		self != MarkerType::TextMatch
	}
}

bitflags::bitflags! {
	/// A set of marker types.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct MarkerTypes: u8 {
		/// [`MarkerType::Spelling`].
		const SPELLING = 1 << 0;
		/// [`MarkerType::Grammar`].
		const GRAMMAR = 1 << 1;
		/// [`MarkerType::TextMatch`].
		const TEXT_MATCH = 1 << 2;
		/// [`MarkerType::InvisibleSpellcheck`].
		const INVISIBLE_SPELLCHECK = 1 << 3;
	}
}

impl MarkerTypes {
	/// Types produced by spell and grammar checking.
	pub const CHECKING: MarkerTypes = MarkerTypes::SPELLING
		.union(MarkerTypes::GRAMMAR)
		.union(MarkerTypes::INVISIBLE_SPELLCHECK);

	/// Returns true if `ty` is a member of this set.
	#[inline]
	pub fn has(self, ty: MarkerType) -> bool {
		self.contains(MarkerTypes::from(ty))
	}

	/// Iterates the member types in list order.
	pub fn iter_types(self) -> impl Iterator<Item = MarkerType> {
		MarkerType::ALL.into_iter().filter(move |ty| self.has(*ty))
	}
}

impl From<MarkerType> for MarkerTypes {
	fn from(ty: MarkerType) -> Self {
		MarkerTypes::from_bits_truncate(1 << ty.index())
	}
}
