pub mod columns;
pub mod crosswalk;
pub mod epoch;
pub mod error;
pub mod expected;
pub mod lookup;

pub use crosswalk::{Crosswalk, CrosswalkEntry};
pub use epoch::{DuplicateColumnFix, SchemaEpoch, YearFilter};
pub use error::{ModelError, Result};
pub use expected::{ExpectedSubmission, GroundTruth, YearProgram, builtin_state_roster};
pub use lookup::CaseInsensitiveSet;
