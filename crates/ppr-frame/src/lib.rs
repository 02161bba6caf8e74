//! Typed tabular data with explicit relational operators.
//!
//! Screens, lookups, and every intermediate result of the pipeline are
//! [`Table`]s: ordered, uniquely named columns over rows of dynamically
//! typed [`Value`]s. All operators are pure (they build new tables) and
//! surface schema violations as [`FrameError`]s instead of panicking.

pub mod error;
pub mod group;
pub mod join;
pub mod reshape;
pub mod table;
pub mod value;

pub use error::{FrameError, Result};
pub use join::JoinKind;
pub use table::{Keep, RowRef, Table};
pub use value::{Value, format_numeric};
