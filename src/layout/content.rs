//! Content collaborator seam
//!
//! The engine does not lay out cell *content*: text shaping, nested
//! blocks, images and everything else inside a cell belong to the
//! enclosing library. This module defines the trait the engine consumes:
//! every cell carries a [`CellContent`] that is handed an area (and the
//! cell's effective borders, so it can reserve the right insets) and
//! answers with how much of itself fit.
//!
//! # Contract
//!
//! Implementers must:
//! 1. Honour `area.bbox.width()` and never exceed `area.bbox.height()`
//!    when reporting [`LayoutStatus::Full`]
//! 2. Place content at the *top* of the given area (the engine lays rows
//!    out top-down)
//! 3. Return `split`/`overflow` continuations on a partial fit
//! 4. Keep `layout` free of side effects; the engine re-invokes it for
//!    dry-run fit probes and keep-together retries
//! 5. Be `Send + Sync`; the engine never calls collaborators in
//!    parallel, but renderers must be shareable across threads

use std::sync::Arc;

use crate::border::Border;
use crate::draw::Canvas;
use crate::geometry::{LayoutArea, Rect};
use crate::layout::result::LayoutStatus;

/// Effective borders of a cell, after collapse against neighbours and
/// table edges
///
/// Passed to the content collaborator so it can reserve insets for the
/// halves of the borders that are drawn inside the cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellBorders {
  pub top: Option<Border>,
  pub right: Option<Border>,
  pub bottom: Option<Border>,
  pub left: Option<Border>,
}

/// Result of laying out one cell's content into an area
#[derive(Clone)]
pub struct ContentLayout {
  /// How much of the content fit
  pub status: LayoutStatus,
  /// The rectangle actually consumed; meaningless when `status` is
  /// `Nothing`
  pub occupied: Rect,
  /// On `Partial`: the part that fit
  pub split: Option<Arc<dyn CellContent>>,
  /// On `Partial`: the part that did not fit
  pub overflow: Option<Arc<dyn CellContent>>,
  /// On `Nothing`: a diagnostic label for the child that refused layout
  pub cause: Option<String>,
}

impl ContentLayout {
  /// A full fit consuming the given rectangle
  pub fn full(occupied: Rect) -> Self {
    Self {
      status: LayoutStatus::Full,
      occupied,
      split: None,
      overflow: None,
      cause: None,
    }
  }

  /// A partial fit with the two continuation halves
  pub fn partial(
    occupied: Rect,
    split: Arc<dyn CellContent>,
    overflow: Arc<dyn CellContent>,
  ) -> Self {
    Self {
      status: LayoutStatus::Partial,
      occupied,
      split: Some(split),
      overflow: Some(overflow),
      cause: None,
    }
  }

  /// Nothing fit
  pub fn nothing(cause: impl Into<String>) -> Self {
    Self {
      status: LayoutStatus::Nothing,
      occupied: Rect::ZERO,
      split: None,
      overflow: None,
      cause: Some(cause.into()),
    }
  }
}

/// The content-layout collaborator
///
/// One instance per cell (or per split part of a cell). `layout` may be
/// called more than once on the same instance; fit probes and
/// keep-together retries rely on it being repeatable.
pub trait CellContent: Send + Sync {
  /// Lays the content out into the given area.
  ///
  /// `borders` are the cell's effective borders at dispatch time; the
  /// collaborator reserves half of each border width as an inset, the
  /// other half sticks out of the cell box.
  fn layout(&self, area: &LayoutArea, borders: &CellBorders) -> ContentLayout;

  /// Paints the content into its final bounds.
  ///
  /// The default does nothing; content that has no visual form (spacers,
  /// height holders) need not override it.
  fn draw(&self, canvas: &mut dyn Canvas, bounds: Rect) {
    let _ = (canvas, bounds);
  }
}

/// Deterministic fixed-height content
///
/// Stands in for real cell content in tests and examples: it wants a
/// fixed number of points of height, fills whatever width it is given,
/// and can optionally split at an arbitrary point.
///
/// # Examples
///
/// ```
/// use folio::layout::content::{CellBorders, FixedContent, CellContent};
/// use folio::geometry::{LayoutArea, Rect};
/// use folio::layout::result::LayoutStatus;
///
/// let content = FixedContent::new(20.0);
/// let area = LayoutArea::new(0, Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
/// let result = content.layout(&area, &CellBorders::default());
/// assert_eq!(result.status, LayoutStatus::Full);
/// assert_eq!(result.occupied.height(), 20.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedContent {
  /// Height the content wants, in points
  height: f32,
  /// Whether the content may be split across areas
  splittable: bool,
}

impl FixedContent {
  /// Unsplittable content of the given height
  pub fn new(height: f32) -> Self {
    Self {
      height,
      splittable: false,
    }
  }

  /// Splittable content of the given height
  pub fn splittable(height: f32) -> Self {
    Self {
      height,
      splittable: true,
    }
  }
}

impl CellContent for FixedContent {
  fn layout(&self, area: &LayoutArea, _borders: &CellBorders) -> ContentLayout {
    let bbox = area.bbox;
    if self.height <= bbox.height() {
      let occupied = Rect::from_xywh(bbox.x(), bbox.top() - self.height, bbox.width(), self.height);
      return ContentLayout::full(occupied);
    }
    if self.splittable && bbox.height() > 0.0 {
      let fitted = bbox.height();
      let occupied = Rect::from_xywh(bbox.x(), bbox.bottom(), bbox.width(), fitted);
      return ContentLayout::partial(
        occupied,
        Arc::new(FixedContent::splittable(fitted)),
        Arc::new(FixedContent::splittable(self.height - fitted)),
      );
    }
    ContentLayout::nothing(format!("fixed content of {}pt", self.height))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn area(height: f32) -> LayoutArea {
    LayoutArea::new(0, Rect::from_xywh(0.0, 0.0, 100.0, height))
  }

  #[test]
  fn test_fixed_content_full_sits_at_top() {
    let result = FixedContent::new(20.0).layout(&area(50.0), &CellBorders::default());
    assert_eq!(result.status, LayoutStatus::Full);
    assert_eq!(result.occupied.top(), 50.0);
    assert_eq!(result.occupied.bottom(), 30.0);
  }

  #[test]
  fn test_fixed_content_refuses_when_too_tall() {
    let result = FixedContent::new(80.0).layout(&area(50.0), &CellBorders::default());
    assert_eq!(result.status, LayoutStatus::Nothing);
    assert!(result.cause.is_some());
  }

  #[test]
  fn test_fixed_content_splits_when_allowed() {
    let result = FixedContent::splittable(80.0).layout(&area(50.0), &CellBorders::default());
    assert_eq!(result.status, LayoutStatus::Partial);
    assert_eq!(result.occupied.height(), 50.0);
    let overflow = result.overflow.unwrap();
    let rest = overflow.layout(&area(30.0), &CellBorders::default());
    assert_eq!(rest.status, LayoutStatus::Full);
    assert_eq!(rest.occupied.height(), 30.0);
  }

  #[test]
  fn test_layout_is_repeatable() {
    let content = FixedContent::new(20.0);
    let first = content.layout(&area(25.0), &CellBorders::default());
    let second = content.layout(&area(25.0), &CellBorders::default());
    assert_eq!(first.occupied, second.occupied);
  }
}
