//! The reshape-and-reconcile pipeline.
//!
//! Raw OLDC extracts arrive as denormalized multi-screen workbooks. The
//! modules here turn them into the consolidated historical views: screens
//! are cleaned and standardized down to one row per submission, reconciled
//! against the enumerated ground truth, renamed through the crosswalk,
//! melted to long form, pivoted to the curated wide form, and appended into
//! the historical long table with year-level overwrite semantics.

pub mod clean;
pub mod crosswalk;
pub mod funds;
pub mod grantee;
pub mod history;
pub mod long;
pub mod metadata;
pub mod outcome;
pub mod pipeline;
pub mod reconcile;
pub mod sheets;
pub mod standardize;
pub mod text;
pub mod wide;

pub use clean::prepare_screens;
pub use crosswalk::resolve_renames;
pub use funds::{calculate_total_funds, process_subawardee_data};
pub use grantee::{GranteeData, canonicalize_grantee_submissions, parse_ein};
pub use history::append_history;
pub use long::{
    activities_long, join_long_to_lookup, melt_population_long, narrative_long,
};
pub use metadata::{build_metadata_grid, build_status_counts};
pub use outcome::service_outcome_transform;
pub use pipeline::{
    OutputSheet, RunArtifacts, run_coalition_pipeline, run_grantee_pipeline,
};
pub use reconcile::{normalize_program_aliases, reconcile_missing};
pub use sheets::{ProcessedSheets, fix_duplicate_columns, process_sheets};
pub use standardize::{
    StandardizedScreens, resolve_identifier_columns, standardize_screens,
};
pub use text::unescape_entities;
pub use wide::{build_wide, calculate_gender_totals};
