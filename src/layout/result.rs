//! Layout outcome values
//!
//! Every fit decision in the engine is expressed as a value: a cell, a
//! header, or a whole table reports `Full`, `Partial` or `Nothing`, and
//! failures carry a typed cause instead of unwinding. There is no
//! exception control flow anywhere in the split path.

use std::fmt;

use crate::geometry::LayoutArea;
use crate::layout::table::TableRenderer;

/// How much of a renderer's content fit the given area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStatus {
  /// Everything fit
  Full,
  /// A leading part fit; the rest continues elsewhere
  Partial,
  /// Nothing fit
  Nothing,
}

/// Why a table layout produced `Nothing`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
  /// The first cell that refused layout, by model grid origin
  Cell {
    row: usize,
    col: usize,
    /// Diagnostic label reported by the content collaborator
    detail: Option<String>,
  },
  /// The header did not fit the initial area
  Header,
  /// The footer did not fit the initial area
  Footer,
}

impl fmt::Display for FailureCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FailureCause::Cell { row, col, detail } => {
        write!(f, "cell at ({row}, {col})")?;
        if let Some(detail) = detail {
          write!(f, ": {detail}")?;
        }
        Ok(())
      }
      FailureCause::Header => write!(f, "header did not fit"),
      FailureCause::Footer => write!(f, "footer did not fit"),
    }
  }
}

/// Outcome of laying a table renderer into an area
///
/// On `Partial` the source renderer must not be reused; the committed
/// part and the continuation own the rows between them.
pub enum TableLayout {
  /// The whole row range fit
  Full {
    /// Rectangle consumed, including header, footer and border halves
    occupied: LayoutArea,
  },
  /// A leading part of the range fit
  Partial {
    /// Rectangle consumed by the committed part
    occupied: LayoutArea,
    /// Renderer holding the committed rows, ready to draw
    split: Box<TableRenderer>,
    /// Renderer holding the remaining rows, to lay out on the next area
    overflow: Box<TableRenderer>,
  },
  /// Nothing was committed
  Nothing {
    /// The first offender
    cause: FailureCause,
  },
}

impl TableLayout {
  /// The status discriminant of this outcome
  pub fn status(&self) -> LayoutStatus {
    match self {
      TableLayout::Full { .. } => LayoutStatus::Full,
      TableLayout::Partial { .. } => LayoutStatus::Partial,
      TableLayout::Nothing { .. } => LayoutStatus::Nothing,
    }
  }

  /// The occupied area, if anything was committed
  pub fn occupied(&self) -> Option<LayoutArea> {
    match self {
      TableLayout::Full { occupied } | TableLayout::Partial { occupied, .. } => Some(*occupied),
      TableLayout::Nothing { .. } => None,
    }
  }
}

impl fmt::Debug for TableLayout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TableLayout::Full { occupied } => f.debug_struct("Full").field("occupied", occupied).finish(),
      TableLayout::Partial { occupied, .. } => f
        .debug_struct("Partial")
        .field("occupied", occupied)
        .finish_non_exhaustive(),
      TableLayout::Nothing { cause } => f.debug_struct("Nothing").field("cause", cause).finish(),
    }
  }
}
