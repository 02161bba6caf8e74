//! Writing side of the pipeline: the workbook sink and archive management.
//!
//! Output artifacts are CSV workbook directories (one file per sheet plus a
//! `workbook.json` manifest). Writes are staged: sheets accumulate in a
//! temporary directory, and only a successful commit moves the artifact
//! into place and deletes the previous one, so at least one valid copy
//! exists at all times.

pub mod archive;
pub mod sink;

pub use archive::ArchiveManager;
pub use sink::{CsvWorkbookSink, WorkbookSink, column_letter};
