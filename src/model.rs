//! Table model types
//!
//! The model is the immutable input to the layout engine: a grid of
//! columns and rows, cells that may span several of each, optional
//! repeating header and footer sub-tables, and per-side borders on the
//! table and on each cell.
//!
//! # Grid Invariants
//!
//! - every cell satisfies `col + colspan <= column_count` and
//!   `row + rowspan <= row_count`,
//! - cells never overlap,
//! - header and footer tables carry no header/footer of their own.
//!
//! These are checked once, at renderer construction, by
//! [`Table::validate`]; layout assumes them afterwards.

use std::fmt;
use std::sync::Arc;

use crate::border::Border;
use crate::error::ModelError;
use crate::geometry::EdgeOffsets;
use crate::layout::content::CellContent;

/// Declared width of a table column
///
/// Percent widths are resolved against the table width; point widths are
/// scaled proportionally into whatever width the percent columns leave
/// free. See the column solver for the exact two-phase rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
  /// Percentage of the table width, `0.0..=100.0`
  Percent(f32),
  /// Weight in points, scaled into the free width
  Point(f32),
}

impl ColumnWidth {
  fn value(&self) -> f32 {
    match self {
      ColumnWidth::Percent(p) => *p,
      ColumnWidth::Point(q) => *q,
    }
  }
}

/// Vertical alignment of cell content within the final cell box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
  #[default]
  Top,
  Middle,
  Bottom,
}

/// An inclusive range of table rows
///
/// A renderer instance is bound to exactly one range. The original
/// renderer starts at row 0; continuation renderers produced by a split
/// cover the remaining rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
  /// First row of the range
  pub start: usize,
  /// Last row of the range, inclusive
  pub finish: usize,
}

impl RowRange {
  pub const fn new(start: usize, finish: usize) -> Self {
    Self { start, finish }
  }

  /// Number of rows covered by the range
  pub fn len(&self) -> usize {
    self.finish + 1 - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.finish < self.start
  }
}

/// A table cell: grid origin, spans, borders, alignment and content
///
/// The content payload is opaque to the engine; it is dispatched to the
/// content-layout collaborator whenever the cell's row is processed.
///
/// # Examples
///
/// ```
/// use folio::model::Cell;
/// use folio::border::Border;
/// use folio::layout::content::FixedContent;
///
/// let cell = Cell::new(0, 1, FixedContent::new(20.0))
///   .with_span(2, 1)
///   .with_borders(Some(Border::solid(1.0)));
/// assert_eq!(cell.rowspan, 2);
/// ```
#[derive(Clone)]
pub struct Cell {
  /// Row of the cell's top-left origin
  pub row: usize,
  /// Column of the cell's top-left origin
  pub col: usize,
  /// Number of rows covered, `>= 1`
  pub rowspan: usize,
  /// Number of columns covered, `>= 1`
  pub colspan: usize,
  pub border_top: Option<Border>,
  pub border_right: Option<Border>,
  pub border_bottom: Option<Border>,
  pub border_left: Option<Border>,
  /// Vertical alignment of content within the final cell box
  pub vertical_alignment: VerticalAlignment,
  /// Opaque content, laid out by the content collaborator
  pub content: Arc<dyn CellContent>,
}

impl Cell {
  /// Creates a 1×1 cell at the given grid origin
  pub fn new(row: usize, col: usize, content: impl CellContent + 'static) -> Self {
    Self {
      row,
      col,
      rowspan: 1,
      colspan: 1,
      border_top: None,
      border_right: None,
      border_bottom: None,
      border_left: None,
      vertical_alignment: VerticalAlignment::Top,
      content: Arc::new(content),
    }
  }

  /// Sets the row and column spans
  pub fn with_span(mut self, rowspan: usize, colspan: usize) -> Self {
    self.rowspan = rowspan;
    self.colspan = colspan;
    self
  }

  /// Sets the same border on all four sides
  pub fn with_borders(mut self, border: Option<Border>) -> Self {
    self.border_top = border;
    self.border_right = border;
    self.border_bottom = border;
    self.border_left = border;
    self
  }

  /// Sets the vertical alignment
  pub fn with_vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
    self.vertical_alignment = alignment;
    self
  }

  /// The last row this cell occupies
  pub fn finish_row(&self) -> usize {
    self.row + self.rowspan - 1
  }
}

impl fmt::Debug for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cell")
      .field("row", &self.row)
      .field("col", &self.col)
      .field("rowspan", &self.rowspan)
      .field("colspan", &self.colspan)
      .field("vertical_alignment", &self.vertical_alignment)
      .finish_non_exhaustive()
  }
}

/// Sizing and placement options recognised on a table
///
/// All fields are optional overrides; the defaults describe an ordinary
/// table that takes the area width, splits freely, and claims no extra
/// height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TableProperties {
  /// Target table width in points; inferred from the area when absent
  pub width: Option<f32>,
  /// Exact height bound; acts as both a minimum and a maximum
  pub height: Option<f32>,
  /// Lower bound on the renderer's occupied height
  pub min_height: Option<f32>,
  /// Upper bound on the renderer's occupied height
  pub max_height: Option<f32>,
  /// Outer margins; top is suppressed on continuations, bottom on
  /// incomplete tables
  pub margins: EdgeOffsets,
  /// Accept a first row even when its content reports `Nothing`
  pub forced_placement: bool,
  /// Refuse to split: a partial fit yields `Nothing` unless forced
  pub keep_together: bool,
  /// Stretch the last row over residual height after a full layout
  pub fill_available_area: bool,
  /// Stretch the committed part's last row after a split
  pub fill_available_area_on_split: bool,
}

/// A table: columns, cells, optional header/footer, edge borders, flags
///
/// Built incrementally with [`Table::add_cell`]; the row count grows to
/// cover every added cell. Header and footer are tables themselves and
/// are laid out by recursion.
#[derive(Debug, Clone)]
pub struct Table {
  columns: Vec<ColumnWidth>,
  cells: Vec<Arc<Cell>>,
  row_count: usize,
  pub header: Option<Box<Table>>,
  pub footer: Option<Box<Table>>,
  pub border_top: Option<Border>,
  pub border_right: Option<Border>,
  pub border_bottom: Option<Border>,
  pub border_left: Option<Border>,
  /// No more rows will be appended later
  pub is_complete: bool,
  /// Do not repeat the header on the first page
  pub skip_first_header: bool,
  /// Drop the footer on the terminal page when the remaining rows fit
  pub skip_last_footer: bool,
  /// Bottom borders carried over from previously flushed rows of an
  /// incomplete table; seeds the first horizontal border row
  pub last_row_bottom_border: Vec<Option<Border>>,
  pub properties: TableProperties,
}

impl Table {
  /// Creates an empty table with the given column widths
  pub fn new(columns: Vec<ColumnWidth>) -> Self {
    Self {
      columns,
      cells: Vec::new(),
      row_count: 0,
      header: None,
      footer: None,
      border_top: None,
      border_right: None,
      border_bottom: None,
      border_left: None,
      is_complete: true,
      skip_first_header: false,
      skip_last_footer: false,
      last_row_bottom_border: Vec::new(),
      properties: TableProperties::default(),
    }
  }

  /// Adds a cell, growing the row count to cover it
  pub fn add_cell(&mut self, cell: Cell) -> &mut Self {
    self.row_count = self.row_count.max(cell.row + cell.rowspan);
    self.cells.push(Arc::new(cell));
    self
  }

  /// Sets the same border on all four table edges
  pub fn with_borders(mut self, border: Option<Border>) -> Self {
    self.border_top = border;
    self.border_right = border;
    self.border_bottom = border;
    self.border_left = border;
    self
  }

  /// Attaches a repeating header table
  pub fn with_header(mut self, header: Table) -> Self {
    self.header = Some(Box::new(header));
    self
  }

  /// Attaches a repeating footer table
  pub fn with_footer(mut self, footer: Table) -> Self {
    self.footer = Some(Box::new(footer));
    self
  }

  /// Number of columns
  pub fn column_count(&self) -> usize {
    self.columns.len()
  }

  /// Number of rows (highest row any cell reaches)
  pub fn row_count(&self) -> usize {
    self.row_count
  }

  /// Declared width of one column
  pub fn column_width(&self, col: usize) -> ColumnWidth {
    self.columns[col]
  }

  /// All cells, in insertion order
  pub fn cells(&self) -> &[Arc<Cell>] {
    &self.cells
  }

  /// Table edge borders in top/right/bottom/left order
  pub fn edge_borders(&self) -> [Option<Border>; 4] {
    [
      self.border_top,
      self.border_right,
      self.border_bottom,
      self.border_left,
    ]
  }

  /// Checks the grid invariants, surfacing the first offending cell.
  ///
  /// Called once at renderer construction; layout assumes a valid model.
  pub fn validate(&self) -> Result<(), ModelError> {
    if self.columns.is_empty() {
      return Err(ModelError::NoColumns);
    }
    for (index, column) in self.columns.iter().enumerate() {
      if column.value() <= 0.0 {
        return Err(ModelError::ZeroWidthColumn { index });
      }
    }

    let cols = self.columns.len();
    let mut occupancy = vec![vec![false; cols]; self.row_count];
    for cell in &self.cells {
      if cell.rowspan == 0 || cell.colspan == 0 {
        return Err(ModelError::ZeroSpan {
          row: cell.row,
          col: cell.col,
        });
      }
      if cell.col + cell.colspan > cols || cell.row + cell.rowspan > self.row_count {
        return Err(ModelError::SpanOutOfBounds {
          row: cell.row,
          col: cell.col,
        });
      }
      for r in cell.row..cell.row + cell.rowspan {
        for c in cell.col..cell.col + cell.colspan {
          if occupancy[r][c] {
            return Err(ModelError::OverlappingCells { row: r, col: c });
          }
          occupancy[r][c] = true;
        }
      }
    }

    for (decoration, kind) in [(&self.header, "header"), (&self.footer, "footer")] {
      if let Some(sub) = decoration {
        if sub.header.is_some() || sub.footer.is_some() {
          return Err(ModelError::NestedDecoration { kind });
        }
        sub.validate()?;
      }
    }

    Ok(())
  }
}
