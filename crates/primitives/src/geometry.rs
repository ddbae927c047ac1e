/// An axis-aligned rectangle in document layout coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
	pub x: f32,
	pub y: f32,
	pub width: f32,
	pub height: f32,
}

impl Rect {
	/// Creates a new rectangle.
	pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Returns true if the rectangle has no area.
	pub fn is_empty(&self) -> bool {
		self.width <= 0.0 || self.height <= 0.0
	}

	/// Returns true if the point lies inside the rectangle.
	pub fn contains(&self, x: f32, y: f32) -> bool {
		x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
	}
}
