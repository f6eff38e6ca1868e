//! Drawing collaborator seam and the border stroke planner
//!
//! The engine never rasterises anything itself: committed layout is
//! replayed onto a [`Canvas`], the minimal set of primitives the
//! enclosing library's paint backend must provide. Besides line strokes
//! the canvas carries the accessibility hooks: structure tags for real
//! content and artifact brackets for decoration that must not be
//! announced (repeated headers, re-laid footers, border strokes).
//!
//! # Border drawing order
//!
//! Interior borders are stroked first, row by row and column by column,
//! coalescing runs of equal borders into single strokes. The outermost
//! edges are stroked last so they sit on top of interior borders at the
//! corners, and their endpoints are extended outward by half the
//! perpendicular border's width so corners mitre correctly.

use crate::border::Border;
use crate::geometry::Point;
use crate::layout::borders::BorderGrid;

/// Structure roles the engine reports while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Table,
  HeaderGroup,
  Body,
  Row,
  Cell,
  FooterGroup,
}

/// The drawing collaborator
///
/// Implemented by the enclosing library's paint backend. Coordinates are
/// absolute page coordinates in PDF points, y-up.
pub trait Canvas {
  /// Strokes one border segment from `from` to `to`
  fn stroke_line(&mut self, from: Point, to: Point, border: &Border);

  /// Opens an artifact bracket: everything until the matching close is
  /// decoration, invisible to accessibility
  fn open_artifact(&mut self);

  /// Closes the current artifact bracket
  fn close_artifact(&mut self);

  /// Pushes a structure tag
  fn push_tag(&mut self, role: Role);

  /// Pops the innermost structure tag
  fn pop_tag(&mut self);
}

/// Canvas plus draw-time state
pub struct DrawContext<'a> {
  pub canvas: &'a mut dyn Canvas,
  /// Whether structure tags are being emitted; cleared inside artifact
  /// brackets
  pub tagging_enabled: bool,
}

impl<'a> DrawContext<'a> {
  pub fn new(canvas: &'a mut dyn Canvas, tagging_enabled: bool) -> Self {
    Self {
      canvas,
      tagging_enabled,
    }
  }
}

/// One committed border layout, ready to stroke
///
/// Borrowed views of the renderer's resolved state; `draw` walks the
/// grids and emits coalesced strokes.
pub(crate) struct BorderPlan<'a> {
  pub grid: &'a BorderGrid,
  pub heights: &'a [f32],
  pub column_widths: &'a [f32],
  /// Left edge of the first column
  pub start_x: f32,
  /// Top edge of the first row
  pub start_y: f32,
}

impl BorderPlan<'_> {
  fn column_count(&self) -> usize {
    self.column_widths.len()
  }

  /// Strokes every resolved border: interior lines first, then the four
  /// outer edges on top
  pub fn draw(&self, canvas: &mut dyn Canvas) {
    if self.heights.is_empty() {
      return;
    }

    let h_len = self.grid.horizontal_len();
    let mut y = self.start_y - self.heights[0];
    for i in 1..h_len.saturating_sub(1) {
      self.draw_horizontal(i, y, canvas);
      if i < self.heights.len() {
        y -= self.heights[i];
      }
    }

    let cols = self.column_count();
    let mut x = self.start_x + self.column_widths[0];
    for c in 1..cols {
      self.draw_vertical(c, x, canvas);
      x += self.column_widths[c];
    }

    // Outer edges last, on top of the interior strokes.
    self.draw_vertical(0, self.start_x, canvas);
    self.draw_vertical(cols, x, canvas);
    self.draw_horizontal(0, self.start_y, canvas);
    let bottom = self.start_y - self.heights.iter().sum::<f32>();
    if h_len > 0 {
      self.draw_horizontal(h_len - 1, bottom, canvas);
    }
  }

  /// Strokes horizontal border row `i` at height `y`, coalescing equal
  /// neighbours
  fn draw_horizontal(&self, i: usize, y: f32, canvas: &mut dyn Canvas) {
    let cols = self.column_count();
    let h_len = self.grid.horizontal_len();
    let is_top = i == 0;
    let is_bottom = i + 1 == h_len;

    let mut x1 = self.start_x;
    // Extend the leading endpoint outward over half the perpendicular
    // edge border, so the corner mitres.
    if self.grid.get_h(i, 0).is_some() {
      let perpendicular = if is_top {
        self.grid.get_v(0, 0)
      } else if is_bottom {
        let rows = self.grid.vertical_col_len(0);
        self.grid.get_v(0, rows.saturating_sub(1))
      } else {
        None
      };
      if let Some(edge) = perpendicular {
        x1 -= edge.width / 2.0;
      }
    }

    let mut x2 = self.start_x + self.column_widths[0];
    let mut j = 1;
    while j < cols {
      let prev = self.grid.get_h(i, j - 1);
      let cur = self.grid.get_h(i, j);
      if let Some(prev) = prev {
        if Some(prev) != cur {
          canvas.stroke_line(Point::new(x1, y), Point::new(x2, y), &prev);
          x1 = x2;
        }
      } else {
        x1 += self.column_widths[j - 1];
        x2 = x1;
      }
      if cur.is_some() {
        x2 += self.column_widths[j];
      }
      j += 1;
    }

    if let Some(last) = self.grid.get_h(i, j - 1) {
      let perpendicular = if is_top {
        self.grid.get_v(cols, 0)
      } else if is_bottom && i > 0 {
        self.grid.get_v(cols, i - 1)
      } else {
        None
      };
      if let Some(edge) = perpendicular {
        x2 += edge.width / 2.0;
      }
      canvas.stroke_line(Point::new(x1, y), Point::new(x2, y), &last);
    }
  }

  /// Strokes vertical border column `c` at abscissa `x`
  fn draw_vertical(&self, c: usize, x: f32, canvas: &mut dyn Canvas) {
    let rows = self.heights.len();
    let cols = self.column_count();
    let is_edge = c == 0 || c == cols;
    let edge_col = if c == 0 { 0 } else { cols - 1 };

    let mut y1 = self.start_y;
    if is_edge && self.grid.get_v(c, 0).is_some() {
      if let Some(top) = self.grid.get_h(0, edge_col) {
        y1 += top.width / 2.0;
      }
    }
    let mut y2 = self.start_y - self.heights[0];

    let mut j = 1;
    while j < rows {
      let prev = self.grid.get_v(c, j - 1);
      let cur = self.grid.get_v(c, j);
      if let Some(prev) = prev {
        if Some(prev) != cur {
          canvas.stroke_line(Point::new(x, y1), Point::new(x, y2), &prev);
          y1 = y2;
        }
      } else {
        y1 -= self.heights[j - 1];
        y2 = y1;
      }
      if cur.is_some() {
        y2 -= self.heights[j];
      }
      j += 1;
    }

    if let Some(last) = self.grid.get_v(c, j - 1) {
      if is_edge {
        let h_len = self.grid.horizontal_len();
        if let Some(bottom) = self.grid.get_h(h_len.saturating_sub(1), edge_col) {
          y2 -= bottom.width / 2.0;
        }
      }
      canvas.stroke_line(Point::new(x, y1), Point::new(x, y2), &last);
    }
  }
}

/// A canvas that records every call, for tests and debugging
#[derive(Debug, Default)]
pub struct RecordingCanvas {
  pub events: Vec<CanvasEvent>,
}

/// One recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
  Line {
    from: Point,
    to: Point,
    width: f32,
  },
  OpenArtifact,
  CloseArtifact,
  PushTag(Role),
  PopTag,
}

impl RecordingCanvas {
  pub fn new() -> Self {
    Self::default()
  }

  /// All recorded line strokes
  pub fn lines(&self) -> Vec<&CanvasEvent> {
    self
      .events
      .iter()
      .filter(|e| matches!(e, CanvasEvent::Line { .. }))
      .collect()
  }
}

impl Canvas for RecordingCanvas {
  fn stroke_line(&mut self, from: Point, to: Point, border: &Border) {
    self.events.push(CanvasEvent::Line {
      from,
      to,
      width: border.width,
    });
  }

  fn open_artifact(&mut self) {
    self.events.push(CanvasEvent::OpenArtifact);
  }

  fn close_artifact(&mut self) {
    self.events.push(CanvasEvent::CloseArtifact);
  }

  fn push_tag(&mut self, role: Role) {
    self.events.push(CanvasEvent::PushTag(role));
  }

  fn pop_tag(&mut self) {
    self.events.push(CanvasEvent::PopTag);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn uniform_grid(rows: usize, cols: usize, width: f32) -> BorderGrid {
    let mut grid = BorderGrid::new();
    grid.reset(&[]);
    for i in 0..=rows {
      for j in 0..cols {
        grid.set_h(i, j, Some(Border::solid(width)));
      }
    }
    for c in 0..=cols {
      for r in 0..rows {
        grid.set_v(c, r, Some(Border::solid(width)));
      }
    }
    grid
  }

  #[test]
  fn test_uniform_grid_coalesces_rows() {
    let grid = uniform_grid(2, 3, 1.0);
    let heights = [20.0, 20.0];
    let widths = [30.0, 30.0, 40.0];
    let plan = BorderPlan {
      grid: &grid,
      heights: &heights,
      column_widths: &widths,
      start_x: 0.0,
      start_y: 40.0,
    };
    let mut canvas = RecordingCanvas::new();
    plan.draw(&mut canvas);

    // 3 horizontal rows and 4 vertical columns, one stroke each: equal
    // borders coalesce into a single line per grid row/column.
    assert_eq!(canvas.lines().len(), 7);
  }

  #[test]
  fn test_null_runs_skip_strokes() {
    let mut grid = uniform_grid(1, 3, 1.0);
    // Remove the middle segment of the interior row; the edges remain.
    grid.set_h(1, 1, None);
    let heights = [20.0, 20.0];
    let widths = [30.0, 30.0, 30.0];
    // Grow the grid to three rows so row 1 is interior.
    for j in 0..3 {
      grid.set_h(2, j, Some(Border::solid(1.0)));
    }
    for c in 0..=3 {
      grid.set_v(c, 1, Some(Border::solid(1.0)));
    }
    let plan = BorderPlan {
      grid: &grid,
      heights: &heights,
      column_widths: &widths,
      start_x: 0.0,
      start_y: 40.0,
    };
    let mut canvas = RecordingCanvas::new();
    plan.draw(&mut canvas);

    // Interior row 1 breaks into two strokes around the gap.
    let interior: Vec<_> = canvas
      .events
      .iter()
      .filter(|e| matches!(e, CanvasEvent::Line { from, .. } if from.y == 20.0))
      .collect();
    assert_eq!(interior.len(), 2);
  }

  #[test]
  fn test_outer_edges_mitre_outward() {
    let grid = uniform_grid(1, 2, 2.0);
    let heights = [10.0];
    let widths = [50.0, 50.0];
    let plan = BorderPlan {
      grid: &grid,
      heights: &heights,
      column_widths: &widths,
      start_x: 0.0,
      start_y: 10.0,
    };
    let mut canvas = RecordingCanvas::new();
    plan.draw(&mut canvas);

    // The top edge extends half the vertical edge width on both sides.
    let top = canvas.events.iter().find_map(|e| match e {
      CanvasEvent::Line { from, to, .. } if from.y == 10.0 && to.y == 10.0 => Some((from.x, to.x)),
      _ => None,
    });
    let (x1, x2) = top.expect("top edge stroked");
    assert_eq!(x1, -1.0);
    assert_eq!(x2, 101.0);
  }
}
