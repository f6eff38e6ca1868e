//! Error types for the table layout engine
//!
//! Only malformed *input* is an error: a table that violates its own
//! grid invariants is rejected before layout starts, and the variant
//! names the offending cell. Everything that can happen during layout
//! (content that does not fit, a header that cannot be placed, a
//! refused split) is an ordinary outcome value, `TableLayout::Nothing`
//! with a typed cause, never an `Err` and never a panic.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations.

use thiserror::Error;

/// Result type alias for fallible engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// The table model violates a structural invariant
  #[error("Model error: {0}")]
  Model(#[from] ModelError),
}

/// Structural violations in the table model
///
/// Raised by validation at renderer construction, before any layout
/// work begins. Variants that concern a cell carry its `(row, col)`
/// origin so callers can point at the offending input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
  /// The table declares no columns
  #[error("table has no columns")]
  NoColumns,

  /// A column width resolves to zero or a negative amount
  #[error("column {index} has a zero or negative width")]
  ZeroWidthColumn { index: usize },

  /// A cell declares a rowspan or colspan of zero
  #[error("cell at ({row}, {col}) has a zero span")]
  ZeroSpan { row: usize, col: usize },

  /// A cell's span reaches outside the table grid
  #[error("cell at ({row}, {col}) spans outside the table grid")]
  SpanOutOfBounds { row: usize, col: usize },

  /// Two cells occupy the same grid slot
  #[error("overlapping cells at ({row}, {col})")]
  OverlappingCells { row: usize, col: usize },

  /// A header or footer table carries its own header or footer
  ///
  /// Headers and footers are laid out by recursion; nesting them would
  /// recurse without bound.
  #[error("a {kind} table must not carry its own header or footer")]
  NestedDecoration { kind: &'static str },
}
