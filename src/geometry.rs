//! Integer pixel geometry.
//!
//! Rectangles are half-open: `min` is inclusive and `max` is exclusive, so a
//! rectangle with `min == max` on either axis is empty. Coordinates are signed
//! because raster bounds are not required to start at the origin.

use std::fmt;

use serde::Serialize;

/// A pixel position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `self` is at least as large as `other` on both axes.
    pub fn covers(&self, other: Size) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A half-open pixel rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// The canonical empty rectangle.
    pub const EMPTY: Rect = Rect {
        min: Point::ORIGIN,
        max: Point::ORIGIN,
    };

    /// Build a rectangle from corner coordinates, swapping them if needed.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn from_size(origin: Point, size: Size) -> Self {
        Self {
            min: origin,
            max: Point::new(
                origin.x + size.width as i32,
                origin.y + size.height as i32,
            ),
        }
    }

    pub fn width(&self) -> u32 {
        (self.max.x - self.min.x).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max.y - self.min.y).max(0) as u32
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x < self.max.x && self.min.y <= p.y && p.y < self.max.y
    }

    /// Whether `other` lies entirely inside `self`. Empty rectangles are inside
    /// everything.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (self.min.x <= other.min.x
                && self.min.y <= other.min.y
                && other.max.x <= self.max.x
                && other.max.y <= self.max.y)
    }

    /// Intersection of two rectangles; [`Rect::EMPTY`] when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() {
            Rect::EMPTY
        } else {
            r
        }
    }

    /// Shift by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            min: Point::new(self.min.x + dx, self.min.y + dy),
            max: Point::new(self.max.x + dx, self.max.y + dy),
        }
    }

    /// Express `self` relative to `origin`.
    pub fn relative_to(&self, origin: Point) -> Rect {
        self.translate(-origin.x, -origin.y)
    }

    /// The image of this rectangle one pyramid level coarser.
    ///
    /// The minimum is floored and the maximum ceiled, so every coarser pixel
    /// touched by any pixel of `self` is included.
    pub fn halve_outward(&self) -> Rect {
        if self.is_empty() {
            return Rect::EMPTY;
        }
        Rect {
            min: Point::new(self.min.x.div_euclid(2), self.min.y.div_euclid(2)),
            max: Point::new(
                (self.max.x + 1).div_euclid(2),
                (self.max.y + 1).div_euclid(2),
            ),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}
