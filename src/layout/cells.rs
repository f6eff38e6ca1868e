//! Per-cell layout state
//!
//! A [`CellRenderer`] wraps one model cell for the duration of a layout
//! pass: the effective borders (which change as neighbours win
//! collapses), the occupied rectangle, and the vertical-alignment shift
//! computed once row heights are equalised.
//!
//! In the renderer's cell grid a cell is stored at its *bottom-left
//! anchor* `(row + rowspan - 1, col)`. Anchoring at the last row keeps
//! row-height accounting local: a row's height only considers the cells
//! that end in it, so a tall rowspan cell never reserves height it has
//! not yet finished needing.

use std::sync::Arc;

use crate::draw::Canvas;
use crate::geometry::Rect;
use crate::layout::content::{CellBorders, CellContent};
use crate::model::{Cell, VerticalAlignment};

/// Layout-time state of one cell
#[derive(Clone)]
pub(crate) struct CellRenderer {
  /// The immutable model cell
  pub model: Arc<Cell>,
  /// Content for this renderer: the model's own, or a split part
  pub content: Arc<dyn CellContent>,
  /// Effective borders, seeded from the model and updated by collapse
  pub borders: CellBorders,
  /// Final cell box, set during row layout and stretched during
  /// row-height equalisation
  pub occupied: Option<Rect>,
  /// Natural height the content reported, before equalisation
  pub content_height: f32,
  /// Downward shift of content within the stretched box
  pub valign_shift: f32,
  /// A height-holding shell commits space but draws no content
  pub is_shell: bool,
  /// False on committed copies whose model cell re-emits elsewhere
  pub is_last_for_model: bool,
}

impl CellRenderer {
  /// Fresh renderer over a model cell
  pub fn from_model(model: &Arc<Cell>) -> Self {
    Self {
      model: Arc::clone(model),
      content: Arc::clone(&model.content),
      borders: CellBorders {
        top: model.border_top,
        right: model.border_right,
        bottom: model.border_bottom,
        left: model.border_left,
      },
      occupied: None,
      content_height: 0.0,
      valign_shift: 0.0,
      is_shell: false,
      is_last_for_model: true,
    }
  }

  pub fn rowspan(&self) -> usize {
    self.model.rowspan
  }

  pub fn colspan(&self) -> usize {
    self.model.colspan
  }

  /// Resets the effective top border to the model's
  pub fn reset_border_top(&mut self) {
    self.borders.top = self.model.border_top;
  }

  /// Resets the effective bottom border to the model's
  pub fn reset_border_bottom(&mut self) {
    self.borders.bottom = self.model.border_bottom;
  }

  /// Computes the content shift for the cell's vertical alignment.
  ///
  /// Must run after the cell box has been stretched to the equalised row
  /// heights; the free space is the difference between the box and the
  /// content's natural height.
  pub fn apply_vertical_alignment(&mut self) {
    let Some(occupied) = self.occupied else {
      return;
    };
    let free = (occupied.height() - self.content_height).max(0.0);
    self.valign_shift = match self.model.vertical_alignment {
      VerticalAlignment::Top => 0.0,
      VerticalAlignment::Middle => free / 2.0,
      VerticalAlignment::Bottom => free,
    };
  }

  /// Paints the content at its aligned position within the cell box
  pub fn draw(&self, canvas: &mut dyn Canvas) {
    if self.is_shell {
      return;
    }
    let Some(occupied) = self.occupied else {
      return;
    };
    let bounds = Rect::from_xywh(
      occupied.x(),
      occupied.top() - self.valign_shift - self.content_height,
      occupied.width(),
      self.content_height,
    );
    self.content.draw(canvas, bounds);
  }

  /// Translates the cell box
  pub fn shift(&mut self, dx: f32, dy: f32) {
    if let Some(occupied) = self.occupied {
      self.occupied = Some(occupied.translated(dx, dy));
    }
  }
}

/// Work item of the row-processing queue.
///
/// `finish_row` is the grid anchor of the cell: for cells of the current
/// row it equals the row index; for a cell pulled in from a future row
/// (a big rowspan forced at a page break) it is that future anchor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellWorkItem {
  pub col: usize,
  pub finish_row: usize,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::content::FixedContent;

  fn renderer(alignment: VerticalAlignment) -> CellRenderer {
    let cell = Arc::new(
      Cell::new(0, 0, FixedContent::new(10.0)).with_vertical_alignment(alignment),
    );
    let mut r = CellRenderer::from_model(&cell);
    r.occupied = Some(Rect::from_xywh(0.0, 0.0, 50.0, 30.0));
    r.content_height = 10.0;
    r
  }

  #[test]
  fn test_valign_top_keeps_content_at_top() {
    let mut r = renderer(VerticalAlignment::Top);
    r.apply_vertical_alignment();
    assert_eq!(r.valign_shift, 0.0);
  }

  #[test]
  fn test_valign_middle_centres_content() {
    let mut r = renderer(VerticalAlignment::Middle);
    r.apply_vertical_alignment();
    assert_eq!(r.valign_shift, 10.0);
  }

  #[test]
  fn test_valign_bottom_uses_all_free_space() {
    let mut r = renderer(VerticalAlignment::Bottom);
    r.apply_vertical_alignment();
    assert_eq!(r.valign_shift, 20.0);
  }
}
