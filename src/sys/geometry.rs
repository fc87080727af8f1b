//! Integer screen geometry, in the coordinate space the OS reports windows in.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Saturates at the edge of the `i32` range.
    pub fn max(&self) -> Point {
        Point::new(self.x.saturating_add(self.width), self.y.saturating_add(self.height))
    }

    pub fn mid(&self) -> Point {
        Point::new(self.x.saturating_add(self.width / 2), self.y.saturating_add(self.height / 2))
    }

    /// Right and bottom edges are exclusive.
    pub fn contains(&self, point: Point) -> bool {
        let max = self.max();
        (self.x..max.x).contains(&point.x) && (self.y..max.y).contains(&point.y)
    }

    /// A rect of `size` whose center matches this rect's center.
    ///
    /// Both halves are truncated independently, so an odd-sized child sits
    /// one pixel up and to the left of true center.
    pub fn centered(&self, size: Size) -> Rect {
        let mid = self.mid();
        Rect::new(
            mid.x.saturating_sub(size.width / 2),
            mid.y.saturating_sub(size.height / 2),
            size.width,
            size.height,
        )
    }
}
