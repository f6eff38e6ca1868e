//! Core geometry types for layout and drawing
//!
//! This module provides the geometric primitives used throughout the
//! layout engine. All units are PDF points unless otherwise noted.
//!
//! # PDF Points
//!
//! A PDF point is 1/72nd of an inch, the default unit of the PDF
//! coordinate space. All widths, heights and border widths in this crate
//! are expressed in points.
//!
//! # Coordinate System
//!
//! The coordinate system is the PDF imaging model's: the origin is at the
//! bottom-left corner of the page and positive Y extends *upward*. A
//! rectangle is stored as its bottom-left corner plus a size, so
//! `rect.y()` is the bottom edge and `rect.top()` is `y + height`.
//!
//! Layout proceeds top-down: content is placed at the top of an area and
//! the area's top edge is lowered as rows are committed, which in this
//! coordinate system means shrinking the height while the origin stays
//! put.

use std::fmt;

/// A 2D point in PDF point space
///
/// # Examples
///
/// ```
/// use folio::geometry::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (increases to the right)
  pub x: f32,
  /// Y coordinate (increases upward)
  pub y: f32,
}

impl Point {
  /// The origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  /// Returns this point translated by the given deltas
  pub fn translated(self, dx: f32, dy: f32) -> Self {
    Self {
      x: self.x + dx,
      y: self.y + dy,
    }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2D size in PDF points
///
/// Both dimensions are expected to be non-negative, though the type does
/// not enforce it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
  /// Width (horizontal extent)
  pub width: f32,
  /// Height (vertical extent)
  pub height: f32,
}

impl Size {
  /// A size with zero width and height
  pub const ZERO: Self = Self {
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new size with the given dimensions
  pub const fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }

  /// Returns true if either dimension is zero
  pub fn is_empty(self) -> bool {
    self.width == 0.0 || self.height == 0.0
  }
}

impl fmt::Display for Size {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}×{}", self.width, self.height)
  }
}

/// An axis-aligned rectangle in PDF point space
///
/// Defined by its bottom-left corner and a size. The adjusters return new
/// values rather than mutating in place, so layout code reads as a chain
/// of small transformations:
///
/// ```
/// use folio::geometry::Rect;
///
/// let area = Rect::from_xywh(0.0, 0.0, 100.0, 80.0);
/// let after_row = area.shrink_height(20.0);
/// assert_eq!(after_row.top(), 60.0);
/// assert_eq!(after_row.bottom(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  /// The bottom-left corner of the rectangle
  pub origin: Point,
  /// The size (width and height) of the rectangle
  pub size: Size,
}

impl Rect {
  /// A zero-sized rectangle at the origin
  pub const ZERO: Self = Self {
    origin: Point::ZERO,
    size: Size::ZERO,
  };

  /// Creates a new rectangle from a bottom-left corner and size
  pub const fn new(origin: Point, size: Size) -> Self {
    Self { origin, size }
  }

  /// Creates a rectangle from x, y, width, height components
  pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      origin: Point::new(x, y),
      size: Size::new(width, height),
    }
  }

  /// X coordinate of the left edge
  pub fn x(&self) -> f32 {
    self.origin.x
  }

  /// Y coordinate of the bottom edge
  pub fn y(&self) -> f32 {
    self.origin.y
  }

  /// Width of the rectangle
  pub fn width(&self) -> f32 {
    self.size.width
  }

  /// Height of the rectangle
  pub fn height(&self) -> f32 {
    self.size.height
  }

  /// X coordinate of the left edge
  pub fn left(&self) -> f32 {
    self.origin.x
  }

  /// X coordinate of the right edge
  pub fn right(&self) -> f32 {
    self.origin.x + self.size.width
  }

  /// Y coordinate of the bottom edge
  pub fn bottom(&self) -> f32 {
    self.origin.y
  }

  /// Y coordinate of the top edge
  pub fn top(&self) -> f32 {
    self.origin.y + self.size.height
  }

  /// Returns this rectangle translated by the given deltas
  pub fn translated(self, dx: f32, dy: f32) -> Self {
    Self {
      origin: self.origin.translated(dx, dy),
      size: self.size,
    }
  }

  /// Lowers the rectangle by `dy` points (both edges move down)
  pub fn move_down(self, dy: f32) -> Self {
    self.translated(0.0, -dy)
  }

  /// Raises the rectangle by `dy` points (both edges move up)
  pub fn move_up(self, dy: f32) -> Self {
    self.translated(0.0, dy)
  }

  /// Extends the height downward: the bottom edge drops, the top stays
  pub fn grow_height(self, dh: f32) -> Self {
    Self {
      origin: Point::new(self.origin.x, self.origin.y - dh),
      size: Size::new(self.size.width, self.size.height + dh),
    }
  }

  /// Reduces the height from the top: the bottom edge stays put
  pub fn shrink_height(self, dh: f32) -> Self {
    Self {
      origin: self.origin,
      size: Size::new(self.size.width, self.size.height - dh),
    }
  }

  /// Reduces the height from the bottom: the top edge stays put
  pub fn raise_bottom(self, dh: f32) -> Self {
    Self {
      origin: Point::new(self.origin.x, self.origin.y + dh),
      size: Size::new(self.size.width, self.size.height - dh),
    }
  }

  /// Replaces the height, keeping the bottom edge
  pub fn with_height(self, height: f32) -> Self {
    Self {
      origin: self.origin,
      size: Size::new(self.size.width, height),
    }
  }

  /// Replaces the width, keeping the origin
  pub fn with_width(self, width: f32) -> Self {
    Self {
      origin: self.origin,
      size: Size::new(width, self.size.height),
    }
  }

  /// Replaces the bottom edge, keeping the size
  pub fn with_y(self, y: f32) -> Self {
    Self {
      origin: Point::new(self.origin.x, y),
      size: self.size,
    }
  }

  /// Shrinks the rectangle inward by the given edge offsets
  pub fn inset(self, edges: EdgeOffsets) -> Self {
    Self::from_xywh(
      self.x() + edges.left,
      self.y() + edges.bottom,
      self.width() - edges.left - edges.right,
      self.height() - edges.top - edges.bottom,
    )
  }

  /// Expands the rectangle outward by the given edge offsets
  pub fn outset(self, edges: EdgeOffsets) -> Self {
    Self::from_xywh(
      self.x() - edges.left,
      self.y() - edges.bottom,
      self.width() + edges.left + edges.right,
      self.height() + edges.top + edges.bottom,
    )
  }

  /// Returns true if `other` lies entirely within this rectangle,
  /// with `eps` tolerance on every edge
  pub fn contains_rect(&self, other: &Rect, eps: f32) -> bool {
    other.left() >= self.left() - eps
      && other.right() <= self.right() + eps
      && other.bottom() >= self.bottom() - eps
      && other.top() <= self.top() + eps
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.origin, self.size)
  }
}

/// Per-side offsets (margins, border halves) in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeOffsets {
  pub top: f32,
  pub right: f32,
  pub bottom: f32,
  pub left: f32,
}

impl EdgeOffsets {
  /// All four offsets zero
  pub const ZERO: Self = Self {
    top: 0.0,
    right: 0.0,
    bottom: 0.0,
    left: 0.0,
  };

  /// Creates offsets in CSS order: top, right, bottom, left
  pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
    Self {
      top,
      right,
      bottom,
      left,
    }
  }
}

/// A layout area: the rectangle handed to `layout`, tagged with the page
/// it belongs to
///
/// Continuation renderers receive areas on later pages; the page number
/// travels with every occupied area so callers can route drawing to the
/// right page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutArea {
  /// The page this area lives on
  pub page_number: usize,
  /// The available rectangle
  pub bbox: Rect,
}

impl LayoutArea {
  /// Creates a layout area on the given page
  pub const fn new(page_number: usize, bbox: Rect) -> Self {
    Self { page_number, bbox }
  }
}
