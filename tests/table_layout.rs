use std::sync::Arc;

use folio::geometry::{LayoutArea, Rect};
use folio::layout::{FixedContent, LayoutStatus, TableLayout, TableRenderer};
use folio::model::{Cell, ColumnWidth, Table};
use folio::Border;

const EPS: f32 = 0.01;

fn area(width: f32, height: f32) -> LayoutArea {
  LayoutArea::new(0, Rect::from_xywh(0.0, 0.0, width, height))
}

/// 3×3 grid with percent columns; every cell wants `cell_height` points.
fn uniform_grid(cell_height: f32, border: Option<Border>) -> Table {
  let mut table = Table::new(vec![
    ColumnWidth::Percent(33.0),
    ColumnWidth::Percent(33.0),
    ColumnWidth::Percent(34.0),
  ]);
  for row in 0..3 {
    for col in 0..3 {
      table.add_cell(Cell::new(row, col, FixedContent::new(cell_height)).with_borders(border));
    }
  }
  table.with_borders(border)
}

#[test]
fn uniform_grid_fits_fully() {
  let mut renderer = TableRenderer::for_table(Arc::new(uniform_grid(20.0, None))).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));

  assert_eq!(result.status(), LayoutStatus::Full);
  let occupied = result.occupied().unwrap();
  assert!((occupied.bbox.width() - 100.0).abs() < EPS);
  assert!((occupied.bbox.height() - 60.0).abs() < EPS);
  assert!((occupied.bbox.y() - 40.0).abs() < EPS);
  assert_eq!(renderer.row_heights(), &[20.0, 20.0, 20.0]);
  assert_eq!(renderer.border_grid().horizontal_len(), 4);
}

#[test]
fn occupied_height_accounts_for_border_halves() {
  let border = Some(Border::solid(1.0));
  let mut renderer = TableRenderer::for_table(Arc::new(uniform_grid(20.0, border))).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));

  assert_eq!(result.status(), LayoutStatus::Full);
  let occupied = result.occupied().unwrap();
  let heights_sum: f32 = renderer.row_heights().iter().sum();
  // Half of the top and bottom collapsed borders live outside the rows.
  assert!((occupied.bbox.height() - (heights_sum + 1.0)).abs() < EPS);
  assert!((occupied.bbox.width() - 100.0).abs() < EPS);
}

#[test]
fn cell_boxes_are_disjoint_and_contained() {
  let border = Some(Border::solid(1.0));
  let mut renderer = TableRenderer::for_table(Arc::new(uniform_grid(20.0, border))).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));
  let occupied = result.occupied().unwrap();

  let placements = renderer.cell_placements();
  assert_eq!(placements.len(), 9);
  for p in &placements {
    assert!(
      occupied.bbox.contains_rect(&p.bounds, EPS),
      "cell ({}, {}) escapes the occupied area",
      p.row,
      p.col
    );
  }
  for (i, a) in placements.iter().enumerate() {
    for b in placements.iter().skip(i + 1) {
      let overlap_x =
        a.bounds.left().max(b.bounds.left()) < a.bounds.right().min(b.bounds.right()) - EPS;
      let overlap_y =
        a.bounds.bottom().max(b.bounds.bottom()) < a.bounds.top().min(b.bounds.top()) - EPS;
      assert!(
        !(overlap_x && overlap_y),
        "cells ({}, {}) and ({}, {}) overlap",
        a.row,
        a.col,
        b.row,
        b.col
      );
    }
  }
}

#[test]
fn layout_is_idempotent_when_everything_fits() {
  let mut renderer = TableRenderer::for_table(Arc::new(uniform_grid(20.0, None))).unwrap();
  let first = renderer.layout(&area(100.0, 100.0));
  let first_occupied = first.occupied().unwrap();
  let first_heights = renderer.row_heights().to_vec();

  let second = renderer.layout(&area(100.0, 100.0));
  assert_eq!(second.status(), LayoutStatus::Full);
  assert_eq!(second.occupied().unwrap(), first_occupied);
  assert_eq!(renderer.row_heights(), first_heights.as_slice());
}

#[test]
fn forced_placement_accepts_oversized_first_row() {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(200.0)));
  table.properties.forced_placement = true;

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));
  assert_eq!(result.status(), LayoutStatus::Full);
}

#[test]
fn refusing_cell_without_force_yields_nothing() {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(200.0)));

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  match renderer.layout(&area(100.0, 100.0)) {
    TableLayout::Nothing { cause } => {
      assert!(format!("{cause}").contains("(0, 0)"));
    }
    other => panic!("expected Nothing, got {other:?}"),
  }
}

#[test]
fn fill_available_area_stretches_last_row() {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(20.0)));
  table.properties.fill_available_area = true;

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));
  assert_eq!(result.status(), LayoutStatus::Full);
  assert_eq!(renderer.row_heights(), &[100.0]);
  assert!((result.occupied().unwrap().bbox.height() - 100.0).abs() < EPS);
}

#[test]
fn min_height_extends_occupied_area() {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(20.0)));
  table.properties.min_height = Some(50.0);

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));
  assert_eq!(result.status(), LayoutStatus::Full);
  assert!((result.occupied().unwrap().bbox.height() - 50.0).abs() < EPS);
  assert_eq!(renderer.row_heights(), &[20.0, 30.0]);
}

#[test]
fn max_height_truncates_as_full() {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  for row in 0..3 {
    table.add_cell(Cell::new(row, 0, FixedContent::new(30.0)));
  }
  table.properties.max_height = Some(65.0);

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));
  // Reaching the clamp turns the would-be split into an accepted cut.
  assert_eq!(result.status(), LayoutStatus::Full);
  assert_eq!(renderer.row_heights(), &[30.0, 30.0]);
}

#[test]
fn margins_are_applied_and_suppressed() {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(20.0)));
  table.properties.margins.top = 10.0;
  table.properties.margins.bottom = 5.0;

  let complete = Arc::new(table.clone());
  let mut renderer = TableRenderer::for_table(complete).unwrap();
  let occupied = renderer.layout(&area(100.0, 100.0)).occupied().unwrap();
  assert!((occupied.bbox.height() - 35.0).abs() < EPS);

  // An incomplete table suppresses its bottom margin.
  table.is_complete = false;
  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let occupied = renderer.layout(&area(100.0, 100.0)).occupied().unwrap();
  assert!((occupied.bbox.height() - 30.0).abs() < EPS);
}

#[test]
fn empty_table_resolves_edge_borders() {
  let table = Table::new(vec![ColumnWidth::Percent(50.0), ColumnWidth::Percent(50.0)])
    .with_borders(Some(Border::solid(2.0)));
  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area(100.0, 100.0));

  assert_eq!(result.status(), LayoutStatus::Full);
  assert!(renderer.row_heights().is_empty());
  let grid = renderer.border_grid();
  assert_eq!(grid.get_h(0, 0), Some(Border::solid(2.0)));
  assert_eq!(grid.get_h(1, 1), Some(Border::solid(2.0)));
  assert_eq!(grid.get_v(0, 0), Some(Border::solid(2.0)));
  assert_eq!(grid.get_v(2, 0), Some(Border::solid(2.0)));
}

#[test]
fn translate_moves_everything_uniformly() {
  let mut renderer = TableRenderer::for_table(Arc::new(uniform_grid(20.0, None))).unwrap();
  renderer.layout(&area(100.0, 100.0));
  let before = renderer.cell_placements();
  let occupied_before = renderer.occupied_area().unwrap();

  renderer.translate(5.0, -7.0);

  let after = renderer.cell_placements();
  for (a, b) in before.iter().zip(after.iter()) {
    assert!((b.bounds.x() - a.bounds.x() - 5.0).abs() < EPS);
    assert!((b.bounds.y() - a.bounds.y() + 7.0).abs() < EPS);
  }
  let occupied_after = renderer.occupied_area().unwrap();
  assert!((occupied_after.bbox.y() - occupied_before.bbox.y() + 7.0).abs() < EPS);
}
