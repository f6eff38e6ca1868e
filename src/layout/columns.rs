//! Column width resolution
//!
//! Columns are declared as percentages of the table width or as point
//! weights. Resolution runs in two phases so percent columns keep their
//! visual weight when point columns are present:
//!
//! 1. Percent columns resolve against the full table width.
//! 2. Point columns share the width the percent columns left free,
//!    proportionally to their declared weights.
//!
//! A final uniform scale maps the total onto the drawable interior: the
//! table reserves half of its left and right collapsed borders outside
//! the columns (the other halves live inside the outermost cells).

use crate::model::{ColumnWidth, Table};

/// Resolves the table's column widths into absolute points.
///
/// The returned widths sum to
/// `table_width - left_border_width / 2 - right_border_width / 2`.
pub fn scaled_column_widths(
  table: &Table,
  table_width: f32,
  left_border_width: f32,
  right_border_width: f32,
) -> Vec<f32> {
  let count = table.column_count();
  let mut widths = vec![0.0f32; count];
  let mut width_sum = 0.0f32;
  let mut total_point_width = 0.0f32;

  for col in 0..count {
    match table.column_width(col) {
      ColumnWidth::Percent(percent) => {
        let width = table_width * percent / 100.0;
        widths[col] = width;
        width_sum += width;
      }
      ColumnWidth::Point(points) => total_point_width += points,
    }
  }

  let free_width = table_width - width_sum;
  if total_point_width > 0.0 {
    for col in 0..count {
      if let ColumnWidth::Point(points) = table.column_width(col) {
        let width = free_width / total_point_width * points;
        widths[col] = width;
        width_sum += width;
      }
    }
  }

  let interior = table_width - left_border_width / 2.0 - right_border_width / 2.0;
  for width in &mut widths {
    *width *= interior / width_sum;
  }

  widths
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Table;

  const EPS: f32 = 0.01;

  fn table(columns: Vec<ColumnWidth>) -> Table {
    Table::new(columns)
  }

  #[test]
  fn test_pure_percent_columns() {
    let t = table(vec![
      ColumnWidth::Percent(33.0),
      ColumnWidth::Percent(33.0),
      ColumnWidth::Percent(34.0),
    ]);
    let widths = scaled_column_widths(&t, 100.0, 0.0, 0.0);
    assert!((widths[0] - 33.0).abs() < EPS);
    assert!((widths[2] - 34.0).abs() < EPS);
    assert!((widths.iter().sum::<f32>() - 100.0).abs() < EPS);
  }

  #[test]
  fn test_percent_and_point_mixed() {
    // 50% takes 100 of 200; the two point columns split the rest 10:20.
    let t = table(vec![
      ColumnWidth::Percent(50.0),
      ColumnWidth::Point(10.0),
      ColumnWidth::Point(20.0),
    ]);
    let widths = scaled_column_widths(&t, 200.0, 0.0, 0.0);
    assert!((widths[0] - 100.0).abs() < EPS);
    assert!((widths[1] - 33.33).abs() < 0.01);
    assert!((widths[2] - 66.67).abs() < 0.01);
    assert!((widths.iter().sum::<f32>() - 200.0).abs() < EPS);
  }

  #[test]
  fn test_border_halves_reserved() {
    let t = table(vec![ColumnWidth::Percent(50.0), ColumnWidth::Percent(50.0)]);
    let widths = scaled_column_widths(&t, 100.0, 2.0, 4.0);
    // Interior is 100 - 1 - 2 = 97; split evenly.
    assert!((widths.iter().sum::<f32>() - 97.0).abs() < EPS);
    assert!((widths[0] - widths[1]).abs() < EPS);
  }

  #[test]
  fn test_point_only_columns_fill_width() {
    let t = table(vec![ColumnWidth::Point(1.0), ColumnWidth::Point(3.0)]);
    let widths = scaled_column_widths(&t, 80.0, 0.0, 0.0);
    assert!((widths[0] - 20.0).abs() < EPS);
    assert!((widths[1] - 60.0).abs() < EPS);
  }
}
