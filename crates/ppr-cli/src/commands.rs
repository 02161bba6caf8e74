//! Command implementations: one run per population.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use ppr_core::{OutputSheet, RunArtifacts, run_coalition_pipeline, run_grantee_pipeline};
use ppr_ingest::{
    DataSource, DirExtractSource, load_coalition_names, load_ground_truth,
    load_historical_long, load_lookup_tables,
};
use ppr_model::SchemaEpoch;
use ppr_report::{ArchiveManager, CsvWorkbookSink, WorkbookSink};
use tracing::info;

use crate::cli::{CoalitionArgs, GranteeArgs};

/// Outcome of a run, for the summary table.
pub struct RunResult {
    pub artifacts: RunArtifacts,
    pub output: Option<PathBuf>,
}

pub fn run_grantees(args: &GranteeArgs) -> Result<RunResult> {
    let now = Local::now().naive_local();
    let epoch = SchemaEpoch::for_tag(args.epoch.tag()).context("resolve schema epoch")?;

    let extract = DirExtractSource::new(&args.extract)
        .load()
        .context("load raw extract")?;
    let lookups = load_lookup_tables(&args.crosswalk).context("load crosswalk workbook")?;
    let history = load_historical_long(&args.processed)
        .context("load historical long data")?
        .map(|(_, table)| table);

    let artifacts = run_grantee_pipeline(
        &extract,
        &lookups,
        &epoch,
        history.as_ref(),
        now.date(),
    )?;

    let output = persist(
        &artifacts,
        &args.processed,
        "HistoricalPPR",
        &args.extract,
        now,
        args.dry_run,
    )?;
    Ok(RunResult { artifacts, output })
}

pub fn run_coalitions(args: &CoalitionArgs) -> Result<RunResult> {
    let now = Local::now().naive_local();
    let epoch = SchemaEpoch::for_tag(args.epoch.tag()).context("resolve schema epoch")?;

    let extract = DirExtractSource::new(&args.extract)
        .load()
        .context("load raw extract")?;
    let lookups = load_lookup_tables(&args.crosswalk).context("load crosswalk workbook")?;
    let names = load_coalition_names(&args.names).context("load coalition names")?;
    let ground_truth =
        load_ground_truth(args.ground_truth.as_deref()).context("load ground truth")?;

    let artifacts =
        run_coalition_pipeline(&extract, &lookups, &names, &ground_truth, &epoch)?;

    let output = persist(
        &artifacts,
        &args.processed,
        "coalitions_processed",
        &args.extract,
        now,
        args.dry_run,
    )?;
    Ok(RunResult { artifacts, output })
}

/// Back up the previous artifact, write the new one next to it, and delete
/// the old copy only after the new artifact is committed.
fn persist(
    artifacts: &RunArtifacts,
    processed: &Path,
    base_name: &str,
    extract: &Path,
    now: NaiveDateTime,
    dry_run: bool,
) -> Result<Option<PathBuf>> {
    if dry_run {
        info!("dry run: skipping artifact write");
        return Ok(None);
    }

    ArchiveManager::new(now)
        .back_up(processed)
        .context("back up previous artifact")?;

    let parent = processed.parent().unwrap_or_else(|| Path::new("."));
    let stamp = now.format("%m%d%Y_%H%M%S");
    let pull_date = extract_pull_date(extract);
    let output = parent.join(format!("{base_name}_{pull_date}_processed_{stamp}"));

    let mut sink = CsvWorkbookSink::create(&output, now).context("create workbook sink")?;
    for sheet in &artifacts.sheets {
        match sheet {
            OutputSheet::Table { name, table } => sink
                .append_table(name, table)
                .with_context(|| format!("write sheet {name}"))?,
            OutputSheet::Grid { name, rows } => sink
                .append_grid(name, rows)
                .with_context(|| format!("write sheet {name}"))?,
        }
    }
    let committed = sink.commit(Some(processed)).context("commit workbook")?;
    Ok(Some(committed))
}

/// The extract pull date is the trailing `_`-separated token of the extract
/// directory name, matching how the export tooling stamps its pulls.
fn extract_pull_date(extract: &Path) -> String {
    extract
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit('_').next())
        .filter(|token| !token.is_empty())
        .unwrap_or("pull")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_date_comes_from_trailing_token() {
        assert_eq!(
            extract_pull_date(Path::new("/data/fvps_sf-ppr_state_20240115")),
            "20240115"
        );
        assert_eq!(extract_pull_date(Path::new("extract")), "extract");
    }
}
