//! Table layout algorithms
//!
//! This module contains everything between the table model and the
//! drawing collaborator: resolving column widths, dispatching cells to
//! the content collaborator row by row, collapsing borders into the
//! shared grids, and splitting the table into a committed part and a
//! continuation when an area runs out.
//!
//! # Control Flow
//!
//! A [`table::TableRenderer`] is bound to one row range of one table.
//! `layout(area)` lays out the header, reserves the footer, then walks
//! the rows top-down; each row's cells are dispatched through the
//! [`content::CellContent`] seam. The first cell that fails to fit turns
//! the row into a split: the rows laid out so far become a committed
//! renderer, the rest a continuation to lay out on the next area.
//!
//! # Module Organization
//!
//! - `columns` - percent/point column width resolution
//! - `borders` - the shared horizontal/vertical border grids
//! - `cells` - per-cell layout state and the row work queue
//! - `content` - the content collaborator seam
//! - `result` - layout outcome values
//! - `table` - the renderer itself: row loop, split/overflow, header
//!   and footer orchestration

pub mod borders;
pub mod cells;
pub mod columns;
pub mod content;
pub mod result;
pub mod table;

pub use content::{CellBorders, CellContent, ContentLayout, FixedContent};
pub use result::{FailureCause, LayoutStatus, TableLayout};
pub use table::{CellPlacement, TableRenderer};
