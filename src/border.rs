//! Border values and the collapse rule
//!
//! Tables use the collapsing-borders model: where two borders meet (two
//! cells sharing an edge, or a cell meeting the table edge), only one is
//! drawn. The winner is the *wider* border; on a width tie the cell
//! border wins over the table border, and between two cell borders the
//! one already resolved into the grid stands.
//!
//! An absent border is represented as `Option::<Border>::None` throughout
//! the crate; there is no separate "no border" sentinel value.

use std::fmt;

/// An RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
  pub r: f32,
  pub g: f32,
  pub b: f32,
  pub a: f32,
}

impl Rgba {
  pub const BLACK: Self = Self {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
  };

  pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
    Self { r, g, b, a }
  }
}

/// Stroke style of a border line
///
/// The engine only carries the style through to the drawing collaborator;
/// dash patterns and double-rule geometry are the collaborator's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
  Solid,
  Dashed,
  Dotted,
}

/// A single border: width in points, color, and stroke style
///
/// # Examples
///
/// ```
/// use folio::border::Border;
///
/// let b = Border::solid(1.0);
/// assert_eq!(b.width, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
  /// Stroke width in points
  pub width: f32,
  /// Stroke color
  pub color: Rgba,
  /// Stroke style
  pub line: LineStyle,
}

impl Border {
  /// A solid black border of the given width
  pub const fn solid(width: f32) -> Self {
    Self {
      width,
      color: Rgba::BLACK,
      line: LineStyle::Solid,
    }
  }

  /// A border with an explicit color
  pub const fn new(width: f32, color: Rgba, line: LineStyle) -> Self {
    Self { width, color, line }
  }
}

impl fmt::Display for Border {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} {}pt", self.line, self.width)
  }
}

/// Width of an optional border, treating absence as zero
pub fn border_width(border: Option<&Border>) -> f32 {
  border.map_or(0.0, |b| b.width)
}

/// Resolves a cell border against a table edge border.
///
/// The table border wins only when it is strictly wider than the cell's
/// (or the cell has none); on a tie the cell border stands. When both are
/// absent the edge stays borderless.
pub fn collapsed(cell: Option<Border>, table: Option<Border>) -> Option<Border> {
  if let Some(table_border) = table {
    match cell {
      None => return Some(table_border),
      Some(cell_border) if cell_border.width < table_border.width => {
        return Some(table_border);
      }
      _ => {}
    }
  }
  cell
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_collapse_wider_table_wins() {
    let cell = Some(Border::solid(1.0));
    let table = Some(Border::solid(2.0));
    assert_eq!(collapsed(cell, table), table);
  }

  #[test]
  fn test_collapse_tie_cell_wins() {
    let cell = Some(Border::new(1.0, Rgba::new(1.0, 0.0, 0.0, 1.0), LineStyle::Solid));
    let table = Some(Border::solid(1.0));
    assert_eq!(collapsed(cell, table), cell);
  }

  #[test]
  fn test_collapse_absent_cell_takes_table() {
    let table = Some(Border::solid(0.5));
    assert_eq!(collapsed(None, table), table);
  }

  #[test]
  fn test_collapse_both_absent() {
    assert_eq!(collapsed(None, None), None);
  }

  #[test]
  fn test_collapse_wider_cell_wins() {
    let cell = Some(Border::solid(3.0));
    let table = Some(Border::solid(2.0));
    assert_eq!(collapsed(cell, table), cell);
  }
}
