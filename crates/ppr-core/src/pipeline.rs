//! Per-population pipelines: the fixed sequence of transforms from raw
//! extract to output sheets.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use ppr_frame::{Table, Value};
use ppr_ingest::{LookupTables, RawExtract, crosswalk_from_table};
use ppr_model::columns::raw;
use ppr_model::{GroundTruth, SchemaEpoch, builtin_state_roster};
use tracing::{info, info_span};

use crate::clean::prepare_screens;
use crate::funds::{calculate_total_funds, process_subawardee_data};
use crate::grantee::canonicalize_grantee_submissions;
use crate::history::append_history;
use crate::long::{activities_long, join_long_to_lookup, melt_population_long, narrative_long};
use crate::metadata::{build_metadata_grid, build_status_counts};
use crate::outcome::service_outcome_transform;
use crate::sheets::process_sheets;
use crate::standardize::{resolve_identifier_columns, standardize_screens};
use crate::wide::build_wide;

/// Coalition sheet names as they appear on the report form.
const SECTION_NAMES: [(&str, &str); 7] = [
    ("Screen-1", "I. Cover Page"),
    ("Screen-2", "II. FVPSA Funds"),
    ("Screen-3", "III. Coalition Members"),
    ("Screen-4", "IV. Narrative Questions"),
    ("Screen-5", "V. Summary of Activities"),
    ("Screen-6", "VI. Other Topics"),
    ("Screen-7", "VII. Training"),
];

const SUMMARY_SCREEN: &str = "Screen-5";
const NARRATIVE_SCREEN: &str = "Screen-4";

/// One output sheet, in workbook order.
#[derive(Debug, Clone)]
pub enum OutputSheet {
    /// Tabular sheet with a header row and an auto-filter annotation.
    Table { name: String, table: Table },
    /// Positioned cell grid without a header (the metadata sheet).
    Grid { name: String, rows: Vec<Vec<Value>> },
}

impl OutputSheet {
    pub fn name(&self) -> &str {
        match self {
            Self::Table { name, .. } | Self::Grid { name, .. } => name,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Table { table, .. } => table.height(),
            Self::Grid { rows, .. } => rows.len(),
        }
    }
}

/// The ordered sheets a pipeline run produced.
#[derive(Debug, Clone, Default)]
pub struct RunArtifacts {
    pub sheets: Vec<OutputSheet>,
}

impl RunArtifacts {
    fn push_table(&mut self, name: impl Into<String>, table: Table) {
        self.sheets.push(OutputSheet::Table {
            name: name.into(),
            table,
        });
    }
}

/// Run the grantee (state/tribe) population end to end.
///
/// Sheet order: OriginalFormat, ServiceOutcome, Subawardee, the
/// date-named historical long sheet, WideFormat, Metadata.
pub fn run_grantee_pipeline(
    extract: &RawExtract,
    lookups: &LookupTables,
    epoch: &SchemaEpoch,
    history: Option<&Table>,
    today: NaiveDate,
) -> Result<RunArtifacts> {
    let span = info_span!("grantee_pipeline", epoch = %epoch.tag);
    let _guard = span.enter();

    let screens = prepare_screens(extract, false)?;
    let grantee = canonicalize_grantee_submissions(&screens, epoch)?;

    let mut artifacts = RunArtifacts::default();
    artifacts.push_table("OriginalFormat", grantee.filtered.clone());

    let field_crosswalk =
        crosswalk_from_table(&lookups.field_names).context("build field-name crosswalk")?;
    let outcomes = service_outcome_transform(&grantee.filtered, &field_crosswalk)?;
    artifacts.push_table("ServiceOutcome", outcomes);

    let states = grantee.states();
    let receipt_ids = states
        .column_values(raw::RECEIPT_ID)
        .context("collect receipt ids from state data")?;
    let subawardee_screen = screens
        .get("Screen-2")
        .context("expected sheet not found: Screen-2")?;
    let subawardee =
        process_subawardee_data(subawardee_screen, &lookups.subawardee, &receipt_ids)?;
    artifacts.push_table("Subawardee", subawardee.clone());

    let states_with_funds =
        calculate_total_funds(&subawardee, &states, &grantee.join_columns)?;
    let melted = melt_population_long(&states_with_funds, &grantee.tribes())?;
    let joined_long = join_long_to_lookup(&melted, &lookups.lookup, epoch)?;

    let batch_years = extract
        .screen("Screen-1")
        .context("read extract years")?
        .unique_values(raw::FISCAL_YEAR)
        .context("collect extract years")?;
    let historical = append_history(history, &joined_long, &batch_years)?;
    artifacts.push_table(today.format("%Y-%m-%d").to_string(), historical);

    let wide = build_wide(&joined_long, &lookups.field_names, &grantee.filtered)?;
    artifacts.push_table("WideFormat", wide.clone());

    let status_counts = build_status_counts(&grantee.processed)?;
    let roster = builtin_state_roster();
    let metadata = build_metadata_grid(&wide, &roster, &status_counts, today)?;
    artifacts.sheets.push(OutputSheet::Grid {
        name: "Metadata".to_string(),
        rows: metadata,
    });

    info!(sheets = artifacts.sheets.len(), "grantee pipeline complete");
    Ok(artifacts)
}

/// Run the coalition population end to end.
///
/// Sheet order: one sheet per report section, then the two long views.
pub fn run_coalition_pipeline(
    extract: &RawExtract,
    lookups: &LookupTables,
    names: &Table,
    ground_truth: &GroundTruth,
    epoch: &SchemaEpoch,
) -> Result<RunArtifacts> {
    let span = info_span!("coalition_pipeline", epoch = %epoch.tag);
    let _guard = span.enter();

    let expected = ground_truth.expected(epoch.year_filter);
    if expected.is_empty() {
        bail!("ground truth has no expected submissions for epoch {}", epoch.tag);
    }

    let prepared = prepare_screens(extract, true)?;
    let mut screens = std::collections::BTreeMap::new();
    for (screen, _) in SECTION_NAMES {
        let table = prepared
            .get(screen)
            .with_context(|| format!("expected sheet not found: {screen}"))?;
        screens.insert(screen.to_string(), table.clone());
    }

    let id_columns = resolve_identifier_columns(&screens["Screen-1"], epoch);
    let standardized = standardize_screens(&screens, &id_columns, names, epoch)?;

    let mut screens = standardized.screens;
    let summary = screens
        .get(SUMMARY_SCREEN)
        .with_context(|| format!("expected sheet not found: {SUMMARY_SCREEN}"))?
        .rename(&epoch.summary_column_renames);
    screens.insert(SUMMARY_SCREEN.to_string(), summary);

    let processed = process_sheets(
        &screens,
        &lookups.coalitions,
        &expected,
        SUMMARY_SCREEN,
        NARRATIVE_SCREEN,
        &standardized.id_columns,
        names,
        epoch,
    )?;

    let mut artifacts = RunArtifacts::default();
    for (screen, section) in SECTION_NAMES {
        let table = processed
            .screens
            .get(screen)
            .with_context(|| format!("expected sheet not found: {screen}"))?;
        artifacts.push_table(section, table.clone());
    }

    let mut var_columns = processed.id_columns.clone();
    if !var_columns.iter().any(|column| column == raw::RECEIPT_ID) {
        var_columns.push(raw::RECEIPT_ID.to_string());
    }
    let narrative = narrative_long(
        &processed.screens[NARRATIVE_SCREEN],
        &var_columns,
        &lookups.coalitions,
    )?;
    artifacts.push_table("Section IV Narr Long Format", narrative);

    let activities = activities_long(&processed.screens[SUMMARY_SCREEN], &var_columns)?;
    artifacts.push_table("Section V SoA Long Format", activities);

    info!(sheets = artifacts.sheets.len(), "coalition pipeline complete");
    Ok(artifacts)
}
