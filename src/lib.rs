//! # folio
//!
//! Paginated table layout engine for PDF document composition.
//!
//! Given a table model (rows, columns, cells that may span several of
//! each, optional repeating header and footer, per-side borders) and a
//! rectangular area on the current page, the engine decides how much of
//! the table fits, exactly where every cell lands, which borders survive
//! the collapsing-borders resolution, and what remains as a continuation
//! table for the next area.
//!
//! Cell *content* is not laid out here: every cell carries an opaque
//! payload behind the [`layout::CellContent`] trait, and drawing goes
//! through the [`draw::Canvas`] trait. Both sides are collaborators
//! provided by the enclosing library.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use folio::geometry::{LayoutArea, Rect};
//! use folio::layout::{FixedContent, TableRenderer};
//! use folio::model::{Cell, ColumnWidth, Table};
//!
//! let mut table = Table::new(vec![ColumnWidth::Percent(50.0), ColumnWidth::Percent(50.0)]);
//! table.add_cell(Cell::new(0, 0, FixedContent::new(20.0)));
//! table.add_cell(Cell::new(0, 1, FixedContent::new(20.0)));
//!
//! let mut renderer = TableRenderer::for_table(Arc::new(table)).unwrap();
//! let area = LayoutArea::new(0, Rect::from_xywh(0.0, 0.0, 200.0, 100.0));
//! let result = renderer.layout(&area);
//! assert!(result.occupied().is_some());
//! ```

pub mod border;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;

pub use border::{Border, LineStyle, Rgba};
pub use error::{Error, ModelError, Result};
pub use geometry::{EdgeOffsets, LayoutArea, Point, Rect, Size};
pub use layout::{
  CellBorders, CellContent, ContentLayout, FailureCause, FixedContent, LayoutStatus, TableLayout,
  TableRenderer,
};
pub use model::{Cell, ColumnWidth, RowRange, Table, TableProperties, VerticalAlignment};
