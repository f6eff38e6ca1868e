use std::sync::Arc;

use folio::geometry::{LayoutArea, Rect};
use folio::layout::{FixedContent, LayoutStatus, TableLayout, TableRenderer};
use folio::model::{Cell, ColumnWidth, Table};

const EPS: f32 = 0.01;

fn area_on(page: usize, height: f32) -> LayoutArea {
  LayoutArea::new(page, Rect::from_xywh(0.0, 0.0, 100.0, height))
}

fn single_column_rows(rows: usize, height: f32) -> Table {
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  for row in 0..rows {
    table.add_cell(Cell::new(row, 0, FixedContent::new(height)));
  }
  table
}

fn decoration(height: f32) -> Table {
  single_column_rows(1, height)
}

#[test]
fn header_and_footer_reserve_their_space() {
  let table = single_column_rows(6, 20.0)
    .with_header(decoration(10.0))
    .with_footer(decoration(10.0));
  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();

  // 100 points: header 10, footer 10, body 80 -> exactly four rows.
  let TableLayout::Partial { occupied, split, mut overflow } = renderer.layout(&area_on(0, 100.0))
  else {
    panic!("expected Partial");
  };
  assert_eq!(split.row_heights(), &[20.0, 20.0, 20.0, 20.0]);
  assert!((occupied.bbox.height() - 100.0).abs() < EPS);

  // The continuation repeats the header and re-lays the footer.
  let next = overflow.layout(&area_on(1, 100.0));
  assert_eq!(next.status(), LayoutStatus::Full);
  assert_eq!(overflow.row_heights(), &[20.0, 20.0]);
  assert!((next.occupied().unwrap().bbox.height() - 60.0).abs() < EPS);
}

#[test]
fn header_that_cannot_fit_fails_the_whole_layout() {
  let table = single_column_rows(2, 20.0).with_header(decoration(50.0));
  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  match renderer.layout(&area_on(0, 30.0)) {
    TableLayout::Nothing { cause } => {
      assert_eq!(format!("{cause}"), "header did not fit");
    }
    other => panic!("expected Nothing, got {other:?}"),
  }
}

#[test]
fn skip_first_header_suppresses_the_first_page_only() {
  let table = single_column_rows(6, 20.0).with_header(decoration(10.0));
  let mut with_skip = table.clone();
  with_skip.skip_first_header = true;

  // Without the flag the body loses 10 points to the header.
  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let occupied = renderer.layout(&area_on(0, 90.0)).occupied().unwrap();
  assert!((occupied.bbox.height() - 90.0).abs() < EPS); // header + 4 rows

  // With it, four rows fit and no header is drawn on page one...
  let mut renderer = TableRenderer::for_table(Arc::new(with_skip)).unwrap();
  let TableLayout::Partial { occupied, mut overflow, .. } = renderer.layout(&area_on(0, 90.0))
  else {
    panic!("expected Partial");
  };
  assert!((occupied.bbox.height() - 80.0).abs() < EPS); // 4 rows, no header

  // ...but the continuation still repeats it.
  let next = overflow.layout(&area_on(1, 90.0));
  assert_eq!(next.status(), LayoutStatus::Full);
  assert!((next.occupied().unwrap().bbox.height() - 50.0).abs() < EPS); // header + 2 rows
}

#[test]
fn skip_last_footer_reclaims_the_reserved_strip() {
  // Three rows of 30, 30 and 35 points against a 100 point area: the
  // footer's 10 point strip is what makes the last row overflow, so it
  // is dropped and the table completes on this page.
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(30.0)));
  table.add_cell(Cell::new(1, 0, FixedContent::new(30.0)));
  table.add_cell(Cell::new(2, 0, FixedContent::new(35.0)));
  let mut table = table.with_footer(decoration(10.0));
  table.skip_last_footer = true;

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area_on(0, 100.0));
  assert_eq!(result.status(), LayoutStatus::Full);
  assert_eq!(renderer.row_heights(), &[30.0, 30.0, 35.0]);
  assert!((result.occupied().unwrap().bbox.height() - 95.0).abs() < EPS);
}

#[test]
fn footer_stays_when_remaining_rows_would_not_fit_anyway() {
  // Same shape, but the last row is too tall even without the footer:
  // the split must proceed with the footer in place.
  let mut table = Table::new(vec![ColumnWidth::Percent(100.0)]);
  table.add_cell(Cell::new(0, 0, FixedContent::new(30.0)));
  table.add_cell(Cell::new(1, 0, FixedContent::new(30.0)));
  table.add_cell(Cell::new(2, 0, FixedContent::new(45.0)));
  let mut table = table.with_footer(decoration(10.0));
  table.skip_last_footer = true;

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let TableLayout::Partial { split, mut overflow, .. } = renderer.layout(&area_on(0, 100.0))
  else {
    panic!("expected Partial");
  };
  assert_eq!(split.row_heights(), &[30.0, 30.0]);

  let next = overflow.layout(&area_on(1, 100.0));
  assert_eq!(next.status(), LayoutStatus::Full);
  assert_eq!(overflow.row_heights(), &[45.0]);
}

#[test]
fn incomplete_table_drops_its_footer() {
  let mut table = single_column_rows(2, 20.0).with_footer(decoration(10.0));
  table.is_complete = false;

  let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
  let result = renderer.layout(&area_on(0, 100.0));
  assert_eq!(result.status(), LayoutStatus::Full);
  // Two rows only; the footer is not part of the occupied area.
  assert!((result.occupied().unwrap().bbox.height() - 40.0).abs() < EPS);
}
