//! The table renderer: row-range layout, split/overflow, header/footer
//!
//! A [`TableRenderer`] is bound to one row range of one table model and
//! answers a single question: how much of that range fits the given
//! area, and where does every cell land.
//!
//! # How a layout pass runs
//!
//! 1. The repeating header is laid out (recursively, headers are tables)
//!    and its height subtracted from the area; the footer is laid out at
//!    the bottom of the area and its space reserved.
//! 2. Rows are walked top-down. Each row's cells are dispatched to the
//!    content collaborator through a work queue; the queue exists
//!    because a page break can force *cells from the future* (cells
//!    with a tall rowspan anchored several rows below) to be placed
//!    at least partially before the area ends.
//! 3. As cells are dispatched their borders collapse into the shared
//!    grids; a cell whose border loses adopts the winner so its content
//!    insets stay correct.
//! 4. The first cell that fails to fit turns the row into a split: the
//!    rows committed so far become one renderer, the remainder becomes a
//!    continuation that is laid out on the next area.
//!
//! Splitting never recovers in place: both halves are freshly
//! constructed and the source renderer must not be reused afterwards.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::border::{border_width, collapsed, Border};
use crate::draw::{BorderPlan, DrawContext, Role};
use crate::geometry::{EdgeOffsets, LayoutArea, Rect};
use crate::layout::borders::BorderGrid;
use crate::layout::cells::{CellRenderer, CellWorkItem};
use crate::layout::columns::scaled_column_widths;
use crate::layout::content::ContentLayout;
use crate::layout::result::{FailureCause, LayoutStatus, TableLayout};
use crate::model::{Cell, ColumnWidth, RowRange, Table, TableProperties, VerticalAlignment};
use crate::Result;

/// Heights below this are treated as nothing to draw
const EPS: f32 = 1e-4;

/// Final placement of one committed cell, for inspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPlacement {
  /// Model row of the cell's origin
  pub row: usize,
  /// Model column of the cell's origin
  pub col: usize,
  pub rowspan: usize,
  pub colspan: usize,
  /// The cell's final box in page coordinates
  pub bounds: Rect,
}

/// Renderer for one row range of a table
///
/// Constructed over the whole table (or a sub-range for large tables),
/// laid out with [`layout`](Self::layout), then drawn with
/// [`draw`](Self::draw). A partial layout hands back two fresh renderers
/// (the committed part and the continuation) and the source must not be
/// reused except through them.
pub struct TableRenderer {
  table: Arc<Table>,
  row_range: RowRange,
  /// True for newly created renderers; continuations from a split carry
  /// false, which changes header repetition and margin handling
  is_original_non_split: bool,
  /// False on committed split parts; the final renderer for a model
  /// draws the un-skipped footer and closes the structure tags
  is_last_for_model: bool,
  props: TableProperties,
  /// Cell grid for this range; a cell sits at its bottom-left anchor
  /// `(row + rowspan - 1 - range.start, col)`, every other slot it
  /// covers stays `None`
  grid: Vec<Vec<Option<CellRenderer>>>,
  /// Committed cells in draw order, as grid coordinates
  children: Vec<(usize, usize)>,
  /// Committed row heights
  heights: Vec<f32>,
  column_widths: Vec<f32>,
  borders: BorderGrid,
  occupied: Option<LayoutArea>,
  header_renderer: Option<Box<TableRenderer>>,
  footer_renderer: Option<Box<TableRenderer>>,
}

impl TableRenderer {
  /// Creates a renderer over a row range, validating the model first
  pub fn new(table: Arc<Table>, row_range: RowRange) -> Result<Self> {
    table.validate()?;
    Ok(Self::from_parts(table, row_range))
  }

  /// Creates a renderer over the whole table
  pub fn for_table(table: Arc<Table>) -> Result<Self> {
    let finish = table.row_count().saturating_sub(1);
    Self::new(table, RowRange::new(0, finish))
  }

  /// Internal constructor; the model is assumed valid
  fn from_parts(table: Arc<Table>, row_range: RowRange) -> Self {
    let columns = table.column_count();
    let grid_rows = if table.row_count() == 0 { 0 } else { row_range.len() };
    let mut renderer = Self {
      props: table.properties,
      table,
      row_range,
      is_original_non_split: true,
      is_last_for_model: true,
      grid: vec![vec![None; columns]; grid_rows],
      children: Vec::new(),
      heights: Vec::new(),
      column_widths: Vec::new(),
      borders: BorderGrid::new(),
      occupied: None,
      header_renderer: None,
      footer_renderer: None,
    };
    let model = Arc::clone(&renderer.table);
    for cell in model.cells() {
      let anchor = cell.finish_row();
      if anchor >= renderer.row_range.start && anchor <= renderer.row_range.finish {
        let local = anchor - renderer.row_range.start;
        renderer.grid[local][cell.col] = Some(CellRenderer::from_model(cell));
      }
    }
    renderer
  }

  /// Appends a cell to this renderer's grid.
  ///
  /// Used with incomplete tables whose rows arrive in chunks. A cell
  /// whose anchor row falls outside the renderer's range cannot be
  /// placed; it is ignored with a logged warning.
  pub fn add_cell(&mut self, cell: Cell) {
    let anchor = cell.row + cell.rowspan - 1;
    if anchor < self.row_range.start || anchor > self.row_range.finish {
      log::warn!(
        "ignoring cell at ({}, {}): its anchor row {} is outside the renderer's range [{}, {}]",
        cell.row,
        cell.col,
        anchor,
        self.row_range.start,
        self.row_range.finish,
      );
      return;
    }
    let local = anchor - self.row_range.start;
    let col = cell.col;
    self.grid[local][col] = Some(CellRenderer::from_model(&Arc::new(cell)));
  }

  /// The row range this renderer covers
  pub fn row_range(&self) -> RowRange {
    self.row_range
  }

  /// Mutable access to the renderer's effective properties.
  ///
  /// The keep-together protocol uses this: after a `Nothing`, a caller
  /// may switch `forced_placement` on and invoke `layout` once more on
  /// the same renderer.
  pub fn properties_mut(&mut self) -> &mut TableProperties {
    &mut self.props
  }

  /// The area consumed by the last layout, if any was committed
  pub fn occupied_area(&self) -> Option<LayoutArea> {
    self.occupied
  }

  /// Committed row heights, one entry per committed row
  pub fn row_heights(&self) -> &[f32] {
    &self.heights
  }

  /// Resolved column widths from the last layout
  pub fn column_widths(&self) -> &[f32] {
    &self.column_widths
  }

  /// The resolved border grids from the last layout
  pub fn border_grid(&self) -> &BorderGrid {
    &self.borders
  }

  /// Final placements of the committed cells, in draw order
  pub fn cell_placements(&self) -> Vec<CellPlacement> {
    let mut placements = Vec::new();
    for &(r, c) in &self.children {
      let Some(cell) = self.cell_at(r, c) else {
        continue;
      };
      let Some(bounds) = cell.occupied else {
        continue;
      };
      placements.push(CellPlacement {
        row: cell.model.row,
        col: cell.model.col,
        rowspan: cell.rowspan(),
        colspan: cell.colspan(),
        bounds,
      });
    }
    placements
  }

  fn cell_at(&self, row: usize, col: usize) -> Option<&CellRenderer> {
    self.grid.get(row).and_then(|r| r.get(col)).and_then(|s| s.as_ref())
  }

  /// Lays out this renderer's row range into the given area.
  ///
  /// May be invoked a second time after a keep-together refusal (with
  /// forced placement switched on); committed state from the previous
  /// attempt is cleared on entry.
  pub fn layout(&mut self, area: &LayoutArea) -> TableLayout {
    let table = Arc::clone(&self.table);
    let columns = table.column_count();
    let page = area.page_number;
    let grid_rows = self.grid.len();
    // The live flag is cleared after the first row (it only covers
    // first-row emission); keep-together still honours the request.
    let forced_placement_requested = self.props.forced_placement;

    // An exact height acts as both a minimum and a maximum bound.
    let mut max_height = self.props.max_height;
    let mut min_height = self.props.min_height;
    if let Some(height) = self.props.height {
      max_height = Some(max_height.map_or(height, |m| m.min(height)));
      min_height = Some(min_height.map_or(height, |m| m.max(height)));
    }

    let mut margins = self.props.margins;
    if !table.is_complete {
      margins.bottom = 0.0;
    }
    if self.row_range.start != 0 {
      margins.top = 0.0;
    }

    // A repeated layout call starts from a clean slate.
    self.heights.clear();
    self.children.clear();
    self.header_renderer = None;
    self.footer_renderer = None;

    // Column moves performed while splitting: column -> the previous
    // anchor row of the moved cell (at most one move per column).
    let mut row_moves: FxHashMap<usize, usize> = FxHashMap::default();

    let mut layout_box = area.bbox.inset(margins);

    let edge = table.edge_borders();
    let (left_border_width, right_border_width, top_border_width) =
      self.collapsed_edge_widths(&edge);
    let mut bottom_border_width = border_width(edge[2].as_ref());

    let table_width = self.resolve_table_width(layout_box.width());

    if let Some(max_h) = max_height {
      if max_h < layout_box.height() && !self.props.forced_placement {
        layout_box = layout_box.move_up(layout_box.height() - max_h).with_height(max_h);
      }
    }
    let layout_box_height = layout_box.height();

    let mut occupied = LayoutArea::new(
      page,
      Rect::from_xywh(
        layout_box.x(),
        layout_box.top() - top_border_width / 2.0,
        table_width,
        0.0,
      ),
    );

    // Header: applied on every continuation, and on the original only
    // when it is the first page and the first header is not skipped.
    let is_first_header = self.row_range.start == 0 && self.is_original_non_split;
    let header_applies = !self.grid.is_empty()
      && (!self.is_original_non_split || (is_first_header && !table.skip_first_header));
    if let Some(header) = table.header.as_deref() {
      if header_applies {
        let mut renderer = Self::decoration_renderer(header, &edge);
        match renderer.layout(&LayoutArea::new(page, layout_box)) {
          TableLayout::Full { occupied: header_area } => {
            let header_height = header_area.bbox.height();
            layout_box = layout_box.shrink_height(header_height);
            occupied.bbox = occupied.bbox.grow_height(header_height);
            self.header_renderer = Some(Box::new(renderer));
          }
          _ => return TableLayout::Nothing { cause: FailureCause::Header },
        }
      }
    }

    // Footer: laid out at the top of the free box, then translated to
    // its bottom; the body must not grow into the reserved strip.
    if let Some(footer) = table.footer.as_deref() {
      let mut renderer = Self::decoration_renderer(footer, &edge);
      match renderer.layout(&LayoutArea::new(page, layout_box)) {
        TableLayout::Full { occupied: footer_area } => {
          let footer_height = footer_area.bbox.height();
          renderer.translate(0.0, -(layout_box.height() - footer_height));
          layout_box = layout_box.raise_bottom(footer_height);
          self.footer_renderer = Some(Box::new(renderer));
        }
        _ => return TableLayout::Nothing { cause: FailureCause::Footer },
      }
    }

    // Halves of the collapsed table borders; the other halves sit
    // inside the outermost cells.
    layout_box = layout_box.inset(EdgeOffsets::new(
      top_border_width / 2.0,
      right_border_width / 2.0,
      0.0,
      left_border_width / 2.0,
    ));
    self.column_widths =
      scaled_column_widths(&table, table_width, left_border_width, right_border_width);

    let mut splits: Vec<Option<ContentLayout>> = (0..columns).map(|_| None).collect();
    // Target continuation row per column; differs from the current row
    // exactly for cells pulled in from the future.
    let mut target_overflow_row = vec![0usize; columns];

    self.borders.reset(&table.last_row_bottom_border);

    let mut row = 0;
    while row < grid_rows {
      // Forced placement only covers the first row; later rows would be
      // silently swallowed if the override stayed on.
      if row == 1 && self.props.forced_placement {
        self.props.forced_placement = false;
      }

      let mut row_height = 0.0f32;
      let mut split = false;
      // All cells of the row fit, at least partially.
      let mut has_content = true;
      // A cell from a future row was forced into this one.
      let mut big_rowspan_added = false;
      let mut committed_cols: Vec<usize> = Vec::new();
      let mut first_cause: Option<FailureCause> = None;

      let mut queue: VecDeque<CellWorkItem> = VecDeque::new();
      for col in 0..columns {
        if self.grid[row][col].is_some() {
          queue.push_back(CellWorkItem { col, finish_row: row });
        }
      }
      if !queue.is_empty() {
        bottom_border_width = 0.0;
      }

      'queue: while let Some(item) = queue.pop_front() {
        let col = item.col;
        let Some(mut cell) = self.grid[item.finish_row][col].take() else {
          continue;
        };
        let colspan = cell.colspan();
        let rowspan = cell.rowspan();
        target_overflow_row[col] = item.finish_row;
        let from_future = row != item.finish_row;

        // Collapse against the table edges the cell touches; the bottom
        // edge is handled just before dispatch.
        if row + 1 == rowspan {
          cell.borders.top = collapsed(cell.borders.top, edge[0]);
        }
        if col == 0 {
          cell.borders.left = collapsed(cell.borders.left, edge[3]);
        }
        if col + colspan == columns {
          cell.borders.right = collapsed(cell.borders.right, edge[1]);
        }
        self.build_borders_arrays(&mut cell, item.finish_row, col);

        let cell_width: f32 = self.column_widths[col..col + colspan].iter().sum();
        let col_offset: f32 = self.column_widths[..col].iter().sum();
        // Height already consumed by the earlier rows this cell spans.
        let mut rowspan_offset = 0.0f32;
        let span_low = (item.finish_row + 1).saturating_sub(rowspan);
        for m in span_low..row {
          if let Some(h) = self.heights.get(m) {
            rowspan_offset += h;
          }
        }

        let span_full = !from_future || has_content;
        let cell_box_height = rowspan_offset + if span_full { layout_box.height() } else { 0.0 };
        let cell_box_bottom = layout_box.y() + if span_full { 0.0 } else { layout_box.height() };
        let mut cell_bbox = Rect::from_xywh(
          layout_box.x() + col_offset,
          cell_box_bottom,
          cell_width,
          cell_box_height,
        );

        // Widen the bottom border up to the table's before dispatch, so
        // the content reserves space as if drawn on the final page
        // edge; the reservation is rolled back after layout.
        let old_bottom = cell.borders.bottom;
        let collapsed_bottom = collapsed(old_bottom, edge[2]);
        if let Some(cb) = collapsed_bottom {
          bottom_border_width = bottom_border_width.max(cb.width);
          cell_bbox = cell_bbox.raise_bottom(cb.width / 2.0);
          cell.borders.bottom = Some(cb);
        }

        let cell_area = LayoutArea::new(page, cell_bbox);
        let mut result = cell.content.layout(&cell_area, &cell.borders);
        if collapsed_bottom.is_some() && result.status != LayoutStatus::Nothing {
          let diff =
            (border_width(collapsed_bottom.as_ref()) - border_width(old_bottom.as_ref())) / 2.0;
          result.occupied = result.occupied.move_up(diff).shrink_height(diff);
          cell.borders.bottom = old_bottom;
        }

        let status = result.status;
        if status != LayoutStatus::Nothing {
          cell.occupied = Some(result.occupied.with_width(cell_width));
          cell.content_height = result.occupied.height();
        } else if first_cause.is_none() {
          first_cause = Some(FailureCause::Cell {
            row: cell.model.row,
            col: cell.model.col,
            detail: result.cause.clone(),
          });
        }
        let occupied_height = cell.occupied.map_or(0.0, |b| b.height());

        if from_future {
          if status == LayoutStatus::Partial {
            // The fitted half stays in this row; the source cell keeps
            // its future anchor until the split partitions the grid.
            let mut half = cell.clone();
            if let Some(split_content) = result.split.clone() {
              half.content = split_content;
            }
            self.grid[row][col] = Some(half);
            self.grid[item.finish_row][col] = Some(cell);
            splits[col] = Some(result);
          } else {
            // Whole cell moves into the current row; remember where it
            // came from so an unsplit column can move it back.
            self.grid[row][col] = Some(cell);
            row_moves.insert(col, item.finish_row);
          }
        } else {
          if status != LayoutStatus::Full {
            if !split {
              // The split may exist only because the footer reserved
              // its strip. For a complete table that skips its last
              // footer, probe whether everything fits once the strip
              // is reclaimed, and if so restart the row without it.
              let footer_height = self
                .footer_renderer
                .as_ref()
                .filter(|_| table.skip_last_footer && table.is_complete)
                .and_then(|f| f.occupied)
                .map(|a| a.bbox.height());
              if let Some(footer_height) = footer_height {
                let potential = LayoutArea::new(page, layout_box.grow_height(footer_height));
                self.grid[item.finish_row][col] = Some(cell);
                if self.can_fit_rows_in_area(&potential, row) {
                  layout_box = layout_box.grow_height(footer_height);
                  self.footer_renderer = None;
                  queue.clear();
                  committed_cols.clear();
                  for requeue_col in 0..columns {
                    if self.grid[row][requeue_col].is_some() {
                      queue.push_back(CellWorkItem {
                        col: requeue_col,
                        finish_row: row,
                      });
                    }
                  }
                  continue 'queue;
                }
                let Some(taken) = self.grid[item.finish_row][col].take() else {
                  continue 'queue;
                };
                cell = taken;
              }

              if first_cause.is_none() {
                first_cause = Some(FailureCause::Cell {
                  row: cell.model.row,
                  col: cell.model.col,
                  detail: result.cause.clone(),
                });
              }

              // A keep-together table refuses the split outright, and
              // it must do so before the grid is restructured so a
              // forced retry re-enters an intact renderer.
              if self.props.keep_together && !forced_placement_requested {
                let cause = first_cause.clone().unwrap_or(FailureCause::Cell {
                  row: cell.model.row,
                  col: cell.model.col,
                  detail: None,
                });
                self.grid[item.finish_row][col] = Some(cell);
                return TableLayout::Nothing { cause };
              }

              // Cells from the future: columns that look empty in this
              // row may be covered by a tall rowspan cell anchored
              // further down. Pull such a cell in when it is
              // bottom-aligned or would not naturally finish past this
              // row, so it does not vanish at the page boundary.
              self.enqueue_future_cells(row, &mut queue, &mut big_rowspan_added);
            }
            split = true;
            if status == LayoutStatus::Nothing {
              has_content = false;
            }
            splits[col] = Some(result);
          }
          self.grid[item.finish_row][col] = Some(cell);
        }

        committed_cols.push(col);
        if status != LayoutStatus::Nothing {
          row_height = row_height.max(occupied_height - rowspan_offset);
        }
      }

      if has_content || big_rowspan_added {
        self.heights.push(row_height);
        occupied.bbox = occupied.bbox.grow_height(row_height);
        layout_box = layout_box.shrink_height(row_height);
      }

      if split || row + 1 == grid_rows {
        self.correct_committed_rows(
          row,
          has_content,
          big_rowspan_added,
          &edge,
          &mut occupied,
          &mut layout_box,
        );
      }

      if split {
        let (committed, mut continuation) = self.construct_split(
          row,
          has_content,
          big_rowspan_added,
          &mut splits,
          &target_overflow_row,
          &row_moves,
          &edge,
          top_border_width,
          &mut bottom_border_width,
          &mut occupied,
          &mut layout_box,
        );

        let nothing_committed = committed.children.is_empty()
          && (table.is_complete || committed.footer_renderer.is_none());
        let max_height_reached = max_height.is_some_and(|mh| layout_box_height == mh);
        if (nothing_committed && self.props.forced_placement) || max_height_reached {
          *self = *committed;
          return TableLayout::Full { occupied };
        }
        if let Some(height) = self.props.height {
          continuation.props.height = Some(height - occupied.bbox.height());
        }
        if nothing_committed {
          let cause = first_cause.unwrap_or(FailureCause::Cell {
            row: self.row_range.start + row,
            col: 0,
            detail: None,
          });
          return TableLayout::Nothing { cause };
        }
        return TableLayout::Partial {
          occupied,
          split: committed,
          overflow: continuation,
        };
      } else {
        self.children.extend(committed_cols.into_iter().map(|c| (row, c)));
      }

      row += 1;
    }

    // A table with no committed cells and no decorations still resolves
    // its edge borders into the grids.
    if self.children.is_empty() && self.header_renderer.is_none() && self.footer_renderer.is_none()
    {
      self.borders.set_h_row(0, vec![edge[0]; columns]);
      self.borders.push_h_row(vec![edge[2]; columns]);
      self.borders.push_v(0, edge[3]);
      self.borders.push_v(columns, edge[1]);
    }

    // Min-height shortfall: stretch into the area when it fits, else
    // commit what the area allows and push the rest to a continuation.
    let mut overflow_for_min_height: Option<TableRenderer> = None;
    if let Some(min_h) = min_height {
      if min_h > occupied.bbox.height() {
        let block_bottom = occupied.bbox.bottom() - (min_h - occupied.bbox.height());
        if block_bottom >= area.bbox.bottom() {
          let extra = min_h - occupied.bbox.height();
          if !self.children.is_empty() {
            self.heights.push(extra);
          } else if let Some(last) = self.heights.last_mut() {
            *last = extra;
          }
          occupied.bbox = occupied.bbox.with_y(block_bottom).with_height(min_h);
        } else {
          let extra = occupied.bbox.bottom() - area.bbox.bottom();
          if !self.children.is_empty() {
            self.heights.push(extra);
          } else if let Some(last) = self.heights.last_mut() {
            *last = extra;
          }
          occupied.bbox = occupied.bbox.grow_height(extra);

          let row_count = table.row_count();
          let mut over = Self::from_parts(Arc::clone(&table), RowRange::new(row_count, row_count));
          over.is_original_non_split = false;
          over.props.min_height = Some(min_h - occupied.bbox.height());
          if let Some(height) = self.props.height {
            over.props.height = Some(height - occupied.bbox.height());
          }
          overflow_for_min_height = Some(over);
        }

        if !self.children.is_empty() && !self.grid.is_empty() {
          // Close the stretched block with the table's own borders.
          self.borders.push_v(0, edge[3]);
          self.borders.push_v(columns, edge[1]);
          let last_row_index = self.grid.len() - 1;
          let mut last_row_borders = vec![None; columns];
          for (col, border) in last_row_borders.iter_mut().enumerate() {
            if let Some(cell) = self.grid[last_row_index][col].as_mut() {
              cell.reset_border_bottom();
              *border = cell.borders.bottom;
            }
          }
          let h_last = self.borders.horizontal_len().saturating_sub(1);
          self.borders.set_h_row(h_last, last_row_borders);
          self.borders.push_h_row(vec![edge[2]; columns]);
        }
      }
    }

    // The outer halves of the top and bottom borders.
    occupied.bbox = occupied.bbox.grow_height(bottom_border_width / 2.0);
    occupied.bbox = occupied.bbox.with_height(occupied.bbox.height() + top_border_width / 2.0);
    layout_box = layout_box.shrink_height(bottom_border_width / 2.0);

    if self.props.fill_available_area {
      if let Some(last_row) = self.grid.last_mut() {
        extend_last_row(last_row, &mut self.heights, &mut occupied, &mut layout_box);
      }
    }

    occupied.bbox = occupied.bbox.outset(margins);

    // The footer is dropped on the terminal page of a skip-last-footer
    // table and while the table is still incomplete.
    if table.skip_last_footer || !table.is_complete {
      self.footer_renderer = None;
    }
    self.adjust_footer_and_fix_occupied(&mut occupied, &layout_box);

    if self.children.is_empty() && self.heights.first().copied() == Some(0.0) {
      self.heights.clear();
    }

    self.occupied = Some(occupied);
    match overflow_for_min_height {
      None => TableLayout::Full { occupied },
      Some(over) => {
        let range = self.row_range;
        let husk = Self::from_parts(Arc::clone(&table), range);
        let committed = std::mem::replace(self, husk);
        TableLayout::Partial {
          occupied,
          split: Box::new(committed),
          overflow: Box::new(over),
        }
      }
    }
  }

  /// Draws header, body cells, borders and footer onto the collaborator
  pub fn draw(&self, ctx: &mut DrawContext) {
    self.draw_as(ctx, Role::Table);
  }

  fn draw_as(&self, ctx: &mut DrawContext, role: Role) {
    let tagged = ctx.tagging_enabled;
    if tagged {
      ctx.canvas.push_tag(role);
    }

    if let Some(header) = &self.header_renderer {
      let first_header =
        self.row_range.start == 0 && self.is_original_non_split && !self.table.skip_first_header;
      let as_artifact = ctx.tagging_enabled && !first_header;
      if as_artifact {
        ctx.canvas.open_artifact();
        ctx.tagging_enabled = false;
      }
      header.draw_as(ctx, Role::HeaderGroup);
      if as_artifact {
        ctx.canvas.close_artifact();
        ctx.tagging_enabled = tagged;
      }
    }

    let tag_cells = ctx.tagging_enabled && !self.children.is_empty();
    if tag_cells {
      ctx.canvas.push_tag(Role::Body);
    }
    let mut open_row: Option<usize> = None;
    for &(r, c) in &self.children {
      let Some(cell) = self.cell_at(r, c) else {
        continue;
      };
      if tag_cells {
        if open_row != Some(cell.model.row) {
          if open_row.is_some() {
            ctx.canvas.pop_tag();
          }
          ctx.canvas.push_tag(Role::Row);
          open_row = Some(cell.model.row);
        }
        ctx.canvas.push_tag(Role::Cell);
      }
      cell.draw(ctx.canvas);
      if tag_cells {
        ctx.canvas.pop_tag();
      }
    }
    if tag_cells {
      if open_row.is_some() {
        ctx.canvas.pop_tag();
      }
      ctx.canvas.pop_tag();
    }

    self.draw_borders(ctx);

    if let Some(footer) = &self.footer_renderer {
      let last_footer =
        self.is_last_for_model && self.table.is_complete && !self.table.skip_last_footer;
      let as_artifact = ctx.tagging_enabled && !last_footer;
      if as_artifact {
        ctx.canvas.open_artifact();
        ctx.tagging_enabled = false;
      }
      footer.draw_as(ctx, Role::FooterGroup);
      if as_artifact {
        ctx.canvas.close_artifact();
        ctx.tagging_enabled = tagged;
      }
    }

    if tagged {
      ctx.canvas.pop_tag();
    }
  }

  /// Translates the renderer, its cells and its header/footer uniformly
  pub fn translate(&mut self, dx: f32, dy: f32) {
    if let Some(area) = self.occupied.as_mut() {
      area.bbox = area.bbox.translated(dx, dy);
    }
    for grid_row in &mut self.grid {
      for cell in grid_row.iter_mut().flatten() {
        cell.shift(dx, dy);
      }
    }
    if let Some(header) = self.header_renderer.as_mut() {
      header.translate(dx, dy);
    }
    if let Some(footer) = self.footer_renderer.as_mut() {
      footer.translate(dx, dy);
    }
  }

  /// Renderer for a header or footer table, inheriting the table's edge
  /// borders so the outline collapses consistently
  fn decoration_renderer(sub: &Table, edge: &[Option<Border>; 4]) -> TableRenderer {
    let mut sub_table = sub.clone();
    sub_table.border_top = edge[0];
    sub_table.border_right = edge[1];
    sub_table.border_bottom = edge[2];
    sub_table.border_left = edge[3];
    let finish = sub_table.row_count().saturating_sub(1);
    Self::from_parts(Arc::new(sub_table), RowRange::new(0, finish))
  }

  /// Widths of the collapsed left, right and top table edges.
  ///
  /// Considers as few rows as possible: the borders may still be drawn
  /// outside the layout area, so only the widest candidate matters.
  fn collapsed_edge_widths(&self, edge: &[Option<Border>; 4]) -> (f32, f32, f32) {
    let columns = self.table.column_count();
    let mut left = -1.0f32;
    let mut right = -1.0f32;
    let mut top = -1.0f32;

    let mut row = 0;
    while row < self.grid.len() && (left == -1.0 || right == -1.0) {
      let current = &self.grid[row];
      if row == 0 {
        for cell in current.iter().flatten() {
          top = top.max(cell.borders.top.map_or(-1.0, |b| b.width));
        }
      }
      if let Some(first) = current.first().and_then(|c| c.as_ref()) {
        left = left.max(first.borders.left.map_or(-1.0, |b| b.width));
      }
      // The last cell in the row counts only if it spans to the edge.
      if let Some(last_col) = (0..columns).rev().find(|&c| current[c].is_some()) {
        if let Some(cell) = current[last_col].as_ref() {
          if last_col + cell.colspan() == columns {
            right = right.max(cell.borders.right.map_or(-1.0, |b| b.width));
          }
        }
      }
      row += 1;
    }

    (
      left.max(border_width(edge[3].as_ref())),
      right.max(border_width(edge[1].as_ref())),
      top.max(border_width(edge[0].as_ref())),
    )
  }

  /// The target table width: an explicit width, else the area width,
  /// scaled down to the percent columns' total when they do not cover
  /// the full hundred
  fn resolve_table_width(&self, available: f32) -> f32 {
    if let Some(width) = self.props.width {
      if width > 0.0 {
        return width;
      }
    }
    let mut percent_total = 0.0f32;
    for col in 0..self.table.column_count() {
      if let ColumnWidth::Percent(p) = self.table.column_width(col) {
        percent_total += p;
      }
    }
    if percent_total > 0.0 {
      available * percent_total / 100.0
    } else {
      available
    }
  }

  /// Scans forward from the current row for rowspan cells anchored in
  /// future rows and enqueues the ones that must be placed now
  fn enqueue_future_cells(
    &mut self,
    row: usize,
    queue: &mut VecDeque<CellWorkItem>,
    big_rowspan_added: &mut bool,
  ) {
    let columns = self.table.column_count();
    let grid_rows = self.grid.len();
    for add_col in 0..columns {
      if self.grid[row][add_col].is_none() {
        for add_row in row + 1..grid_rows {
          let Some(add) = self.grid[add_row][add_col].as_ref() else {
            continue;
          };
          let add_rowspan = add.rowspan();
          let bottom = add.borders.bottom;
          let left = add.borders.left;
          let right = add.borders.right;
          let bottom_aligned = add.model.vertical_alignment == VerticalAlignment::Bottom;
          if bottom_aligned {
            if row + add_rowspan - 1 < add_row {
              queue.push_back(CellWorkItem {
                col: add_col,
                finish_row: add_row,
              });
              *big_rowspan_added = true;
            } else {
              // The cell would finish here anyway; only its borders
              // reach into the committed part.
              self.borders.set_h(row + 1, add_col, bottom);
              if add_col == 0 {
                for i in (0..=row).rev() {
                  if !self.borders.try_replace_v(add_col, i, left) {
                    break;
                  }
                }
              } else if add_col + 1 == columns {
                for i in (0..=row).rev() {
                  if !self.borders.try_replace_v(add_col + 1, i, right) {
                    break;
                  }
                }
              }
            }
          } else if row + add_rowspan - 1 >= add_row {
            queue.push_back(CellWorkItem {
              col: add_col,
              finish_row: add_row,
            });
            *big_rowspan_added = true;
          }
          break;
        }
      } else if let Some(current) = self.grid[row][add_col].as_ref() {
        if current.rowspan() > 1 {
          *big_rowspan_added = true;
        }
      }
    }
  }

  /// Folds the widest collapsed bottom border of the last committed row
  /// into the grid and the row height, then stretches every committed
  /// cell to the equalised row heights and applies vertical alignment
  fn correct_committed_rows(
    &mut self,
    row: usize,
    has_content: bool,
    big_rowspan_added: bool,
    edge: &[Option<Border>; 4],
    occupied: &mut LayoutArea,
    layout_box: &mut Rect,
  ) {
    let columns = self.table.column_count();

    if !self.heights.is_empty() {
      let last_added_row = if has_content || big_rowspan_added { row } else { row - 1 };
      let mut bottom_diff = 0.0f32;
      for col in 0..columns {
        let Some(cell) = self.grid[last_added_row][col].as_mut() else {
          continue;
        };
        let cell_bottom = cell.borders.bottom;
        let resolved = collapsed(cell_bottom, edge[2]);
        let cell_bottom_width = border_width(cell_bottom.as_ref());
        let resolved_width = border_width(resolved.as_ref());
        let colspan = cell.colspan();
        let rowspan = cell.rowspan();
        let widened = cell_bottom_width < resolved_width;
        if widened {
          cell.borders.bottom = resolved;
        }
        // The widened half sits inside the cell; grow its box to match.
        let widen = (resolved_width - cell_bottom_width) / 2.0;
        let mut grown_height = 0.0f32;
        if let Some(bbox) = cell.occupied {
          let grown = bbox.grow_height(widen);
          grown_height = grown.height();
          cell.occupied = Some(grown);
        }
        if widened {
          let h_row = if has_content || big_rowspan_added { row + 1 } else { row };
          for i in col..col + colspan {
            self.borders.set_h(h_row, i, resolved);
          }
        }
        let start = self.heights.len().saturating_sub(rowspan);
        let spanned: f32 = self.heights[start..].iter().sum();
        if spanned < grown_height {
          bottom_diff = bottom_diff.max(widen);
        }
      }
      if let Some(last) = self.heights.last_mut() {
        *last += bottom_diff;
      }
      occupied.bbox = occupied.bbox.grow_height(bottom_diff);
      *layout_box = layout_box.shrink_height(bottom_diff);
    }

    // Equalise: every committed cell's box covers exactly the heights
    // of the rows it spans, then content realigns within the box.
    for k in 0..=row {
      if k < row || (k == row && (has_content || big_rowspan_added)) {
        for col in 0..columns {
          let Some(cell) = self.grid[k][col].as_mut() else {
            continue;
          };
          let rowspan = cell.rowspan();
          let low = (k + 1).saturating_sub(rowspan);
          let mut height = 0.0f32;
          for l in low..=k {
            if let Some(h) = self.heights.get(l) {
              height += h;
            }
          }
          let bottom = cell.borders.bottom;
          if let Some(bbox) = cell.occupied {
            let shift = height - bbox.height();
            cell.occupied = Some(bbox.move_down(shift).with_height(height));
          }
          cell.apply_vertical_alignment();

          let row_n = if k == row && !has_content { k } else { k + 1 };
          if self.borders.get_h(row_n, col).is_none() {
            self.borders.set_h(row_n, col, bottom);
          }
        }
      }
    }
  }

  /// Partitions this renderer at `row` into a committed renderer and a
  /// continuation, distributing split cells, overflow cells and
  /// enlarge-column holders between them
  #[allow(clippy::too_many_arguments)]
  fn construct_split(
    &mut self,
    row: usize,
    has_content: bool,
    big_rowspan_added: bool,
    splits: &mut [Option<ContentLayout>],
    target_overflow_row: &[usize],
    row_moves: &FxHashMap<usize, usize>,
    edge: &[Option<Border>; 4],
    top_border_width: f32,
    bottom_border_width: &mut f32,
    occupied: &mut LayoutArea,
    layout_box: &mut Rect,
  ) -> (Box<TableRenderer>, Box<TableRenderer>) {
    let columns = self.table.column_count();
    let grid_rows = self.grid.len();
    let commits_last_row = has_content || big_rowspan_added;

    let mut committed_last: Vec<Option<CellRenderer>> = vec![None; columns];
    let mut last_row_order: Vec<usize> = Vec::new();
    let mut rowspans = vec![0usize; columns];
    let mut enlarge = vec![false; columns];

    for col in 0..columns {
      if let Some(result) = splits[col].take() {
        let target_row = target_overflow_row[col];
        let Some(mut current) = self.grid[row][col].take() else {
          continue;
        };
        let current_occupied = current.occupied;
        if result.status == LayoutStatus::Partial {
          rowspans[col] = current.rowspan();
        }

        if commits_last_row || result.status == LayoutStatus::Nothing {
          let mut overflow = CellRenderer {
            model: Arc::clone(&current.model),
            content: result
              .overflow
              .clone()
              .unwrap_or_else(|| Arc::clone(&current.content)),
            borders: current.borders,
            occupied: current_occupied,
            content_height: 0.0,
            valign_shift: 0.0,
            is_shell: false,
            is_last_for_model: current.is_last_for_model,
          };
          if result.status == LayoutStatus::Partial {
            // The cut edge disappears: the committed half loses its
            // bottom border, the continuation half its top.
            overflow.borders.top = None;
            current.borders.bottom = None;
            if let Some(split_content) = result.split.clone() {
              current.content = split_content;
            }
          } else {
            overflow.reset_border_top();
          }
          overflow.reset_border_bottom();
          let h_row = if !has_content && result.status == LayoutStatus::Partial {
            row
          } else {
            row + 1
          };
          for j in col..col + overflow.colspan() {
            self.borders.set_h(h_row, j, edge[2]);
          }
          if result.status != LayoutStatus::Nothing && commits_last_row {
            last_row_order.push(col);
            committed_last[col] = Some(current);
          }
          self.grid[target_row][col] = Some(overflow);
        } else {
          // The row contributes nothing: the whole cell moves to the
          // continuation, its partial layout discarded.
          self.grid[target_row][col] = Some(current);
        }
      } else if let Some(cell) = self.grid[row][col].as_mut() {
        let rowspan = cell.rowspan();
        let colspan = cell.colspan();
        rowspans[col] = rowspan;
        if has_content {
          enlarge[col] = true;
          // The continuation re-emits this cell at the top of its
          // range, where it meets the table's top edge.
          cell.borders.top = edge[0];
        } else {
          cell.reset_border_top();
        }
        let h_row = row + if !has_content && rowspan > 1 { 0 } else { 1 };
        for j in col..col + colspan {
          self.borders.set_h(h_row, j, edge[2]);
        }
      }
    }

    let min_rowspan = rowspans.iter().copied().filter(|&r| r != 0).min().unwrap_or(usize::MAX);

    // Enlarge columns: the cell fit but its siblings did not. The
    // committed side holds the row heights open; the model cell is
    // re-emitted in the continuation.
    for col in 0..columns {
      if !enlarge[col] {
        continue;
      }
      let Some(mut holder) = self.grid[row][col].take() else {
        continue;
      };
      let cell_occupied = holder.occupied;
      let target_row = target_overflow_row[col];

      if min_rowspan == 1 {
        let top_border = holder.borders.top;
        let model = Arc::clone(&holder.model);
        holder.is_last_for_model = false;
        holder.is_shell = true;
        last_row_order.push(col);
        committed_last[col] = Some(holder);

        let mut fresh = CellRenderer::from_model(&model);
        fresh.borders.top = top_border;
        self.grid[target_row][col] = Some(fresh);
      } else {
        last_row_order.push(col);
        committed_last[col] = Some(holder);
        // Contract the rowspan uniformly: shift the column's pending
        // cells up one slot each.
        let mut i = row;
        while i < row + min_rowspan && i + 1 < grid_rows && self.grid[i + 1][col].is_some() {
          self.grid[i][col] = self.grid[i + 1][col].take();
          i += 1;
        }
        // Fewer pending cells than the contraction needs: re-emit the
        // last one from its model, like the single-row case.
        if i != row + min_rowspan - 1 {
          if let Some(mut stale) = self.grid[i][col].take() {
            let top_border = stale.borders.top;
            let model = Arc::clone(&stale.model);
            stale.is_last_for_model = false;
            let mut fresh = CellRenderer::from_model(&model);
            fresh.borders.top = top_border;
            self.grid[target_row][col] = Some(fresh);
          }
        }
      }
      if let Some(target_cell) = self.grid[target_row][col].as_mut() {
        target_cell.occupied = cell_occupied;
      }
    }

    if commits_last_row {
      *bottom_border_width = border_width(edge[2].as_ref());
    }

    for &col in &last_row_order {
      self.children.push((row, col));
    }

    if !self.children.is_empty() {
      occupied.bbox = occupied.bbox.grow_height(*bottom_border_width / 2.0);
      *layout_box = layout_box.raise_bottom(*bottom_border_width / 2.0);
    } else {
      occupied.bbox = occupied.bbox.shrink_height(top_border_width / 2.0);
      *layout_box = layout_box.with_height(layout_box.height() + top_border_width / 2.0);
    }

    if self.props.fill_available_area || self.props.fill_available_area_on_split {
      extend_last_row(&mut committed_last, &mut self.heights, occupied, layout_box);
    }

    self.adjust_footer_and_fix_occupied(occupied, layout_box);

    // Partition the grid: rows before the split stay committed, the
    // rest (with the overflow cells placed at their target rows) forms
    // the continuation.
    let mut remaining: Vec<Vec<Option<CellRenderer>>> = self.grid.split_off(row);
    for (&col, &previous_row) in row_moves {
      // A column whose future cell was moved down but never split gets
      // the cell back at its canonical row for the continuation.
      let local_previous = previous_row - row;
      if remaining[local_previous][col].is_none() {
        remaining[local_previous][col] = remaining[0][col].take();
      }
    }

    let mut committed_grid = std::mem::take(&mut self.grid);
    if commits_last_row {
      committed_grid.push(committed_last);
    }

    let border_row_n = row + if has_content || row == 0 { 1 } else { 0 };
    let committed = TableRenderer {
      table: Arc::clone(&self.table),
      row_range: RowRange::new(self.row_range.start, self.row_range.start + row),
      is_original_non_split: self.is_original_non_split,
      is_last_for_model: false,
      props: self.props,
      grid: committed_grid,
      children: std::mem::take(&mut self.children),
      heights: std::mem::take(&mut self.heights),
      column_widths: self.column_widths.clone(),
      borders: self.borders.split_top(border_row_n),
      occupied: Some(*occupied),
      header_renderer: self.header_renderer.take(),
      footer_renderer: self.footer_renderer.take(),
    };
    let continuation = TableRenderer {
      table: Arc::clone(&self.table),
      row_range: RowRange::new(self.row_range.start + row, self.row_range.finish),
      is_original_non_split: false,
      is_last_for_model: self.is_last_for_model,
      props: self.props,
      grid: remaining,
      children: Vec::new(),
      heights: Vec::new(),
      column_widths: Vec::new(),
      borders: BorderGrid::new(),
      occupied: None,
      header_renderer: None,
      footer_renderer: None,
    };

    (Box::new(committed), Box::new(continuation))
  }

  /// Resolves a cell's four borders into the grids, propagating winners
  /// back into losing neighbours, then does the same for the immediate
  /// neighbours below and to the right (they may already be affected)
  fn build_borders_arrays(&mut self, cell: &mut CellRenderer, anchor_row: usize, col: usize) {
    self.build_cell_borders(cell, anchor_row, false);

    let rowspan = cell.rowspan();
    let colspan = cell.colspan();
    let grid_rows = self.grid.len();
    if anchor_row + rowspan < grid_rows {
      for j in 0..colspan {
        self.build_borders_for_slot(anchor_row + rowspan, col + j, true);
      }
    }
    if col + colspan < self.table.column_count() {
      for j in 0..rowspan {
        let neighbour_row = anchor_row + 1 + j;
        if neighbour_row >= rowspan {
          self.build_borders_for_slot(neighbour_row - rowspan, col + colspan, false);
        }
      }
    }
  }

  fn build_borders_for_slot(&mut self, row: usize, col: usize, from_future: bool) {
    if let Some(mut cell) = self.grid[row][col].take() {
      self.build_cell_borders(&mut cell, row, from_future);
      self.grid[row][col] = Some(cell);
    }
  }

  fn build_cell_borders(&mut self, cell: &mut CellRenderer, row: usize, from_future: bool) {
    let colspan = cell.colspan();
    let mut rowspan = cell.rowspan();
    let col = cell.model.col;
    // Cells reaching above the renderer's range are clamped to it.
    if row + 1 < rowspan {
      rowspan = row + 1;
    }
    let span_top = row + 1 - rowspan;

    if span_top != 0 {
      let above_row = row - rowspan;
      for i in 0..colspan {
        if self.borders.try_replace_h(span_top, col + i, cell.borders.top) {
          // Our top won; the neighbour above must adopt it as its
          // bottom so its insets stay consistent.
          if let Some(above) = self.grid[above_row][col].as_mut() {
            above.borders.bottom = cell.borders.top;
          }
        } else if !from_future {
          cell.borders.top = self.borders.get_h(span_top, col + i);
        }
      }
    } else {
      for i in 0..colspan {
        if !self.borders.try_replace_h(0, col + i, cell.borders.top) {
          cell.borders.top = self.borders.get_h(0, col + i);
        }
      }
    }

    for i in 0..colspan {
      self.borders.set_h(row + 1, col + i, cell.borders.bottom);
    }

    if col != 0 {
      for j in span_top..=row {
        if self.borders.try_replace_v(col, j, cell.borders.left) {
          if let Some(left_cell) = self.grid[j][col - 1].as_mut() {
            left_cell.borders.right = cell.borders.left;
          }
        } else {
          let stored = self.borders.get_v(col, row);
          if j == row {
            cell.borders.left = stored;
          } else if let Some(other) = self.grid[j][col].as_mut() {
            other.borders.left = stored;
          }
        }
      }
    } else {
      for j in span_top..=row {
        self.borders.set_v(0, j, cell.borders.left);
      }
    }

    for j in span_top..=row {
      self.borders.try_replace_v(col + colspan, j, cell.borders.right);
    }
  }

  /// Dry-run fit probe: would every remaining row report `Full` in the
  /// given area?
  ///
  /// Pure with respect to the renderer: only the returned content
  /// layouts are consulted, nothing is stored back into the cells.
  fn can_fit_rows_in_area(&self, area: &LayoutArea, start_row: usize) -> bool {
    let mut bbox = area.bbox;
    let mut heights = self.heights.clone();
    for row in start_row..self.grid.len() {
      let mut row_height = 0.0f32;
      for col in 0..self.table.column_count() {
        let Some(cell) = self.grid[row][col].as_ref() else {
          continue;
        };
        let colspan = cell.colspan();
        let rowspan = cell.rowspan();
        let cell_width: f32 = self.column_widths[col..col + colspan].iter().sum();
        let col_offset: f32 = self.column_widths[..col].iter().sum();
        let mut rowspan_offset = 0.0f32;
        let low = (row + 1).saturating_sub(rowspan);
        for i in low..row {
          if let Some(h) = heights.get(i) {
            rowspan_offset += h;
          }
        }
        let cell_area = LayoutArea::new(
          area.page_number,
          Rect::from_xywh(
            bbox.x() + col_offset,
            bbox.y(),
            cell_width,
            rowspan_offset + bbox.height(),
          ),
        );
        let result = cell.content.layout(&cell_area, &cell.borders);
        if result.status != LayoutStatus::Full {
          return false;
        }
        row_height = row_height.max(result.occupied.height());
      }
      heights.push(row_height);
      bbox = bbox.raise_bottom(row_height);
    }
    true
  }

  /// Moves the footer up flush against the committed body and accounts
  /// for its height in the occupied area
  fn adjust_footer_and_fix_occupied(&mut self, occupied: &mut LayoutArea, layout_box: &Rect) {
    if let Some(footer) = self.footer_renderer.as_mut() {
      footer.translate(0.0, layout_box.height());
      let footer_height = footer.occupied.map_or(0.0, |a| a.bbox.height());
      occupied.bbox = occupied.bbox.grow_height(footer_height);
    }
  }

  fn draw_borders(&self, ctx: &mut DrawContext) {
    let Some(occupied) = self.occupied else {
      return;
    };
    if occupied.bbox.height() < EPS || self.heights.is_empty() {
      return;
    }

    let mut start_x = occupied.bbox.x();
    let mut start_y = occupied.bbox.top();
    for &(r, c) in &self.children {
      if let Some(cell) = self.cell_at(r, c) {
        if cell.model.row == self.row_range.start {
          if let Some(bounds) = cell.occupied {
            start_y = bounds.top();
          }
          break;
        }
      }
    }
    for &(r, c) in &self.children {
      if let Some(cell) = self.cell_at(r, c) {
        if cell.model.col == 0 {
          if let Some(bounds) = cell.occupied {
            start_x = bounds.x();
          }
          break;
        }
      }
    }

    let as_artifact = ctx.tagging_enabled;
    if as_artifact {
      ctx.canvas.open_artifact();
    }
    BorderPlan {
      grid: &self.borders,
      heights: &self.heights,
      column_widths: &self.column_widths,
      start_x,
      start_y,
    }
    .draw(ctx.canvas);
    if as_artifact {
      ctx.canvas.close_artifact();
    }
  }
}

/// Stretches the last committed row over the remaining free height
fn extend_last_row(
  cells: &mut [Option<CellRenderer>],
  heights: &mut [f32],
  occupied: &mut LayoutArea,
  free: &mut Rect,
) {
  let Some(last) = heights.last_mut() else {
    return;
  };
  let extra = free.height();
  *last += extra;
  occupied.bbox = occupied.bbox.grow_height(extra);
  for cell in cells.iter_mut().flatten() {
    if let Some(bounds) = cell.occupied {
      cell.occupied = Some(bounds.grow_height(extra));
    }
  }
  *free = free.move_up(extra).with_height(0.0);
}
