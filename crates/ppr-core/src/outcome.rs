//! Section G service-outcome reshaping for the grantee population.

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Table, Value};
use ppr_model::Crosswalk;
use tracing::debug;

const ID_COLUMNS: [&str; 5] = ["GRANTEETYPETXT", "FY", "PROGACRONYM", "POSTALCODE", "EIN"];
const SURVEY_TYPE: &str = "Survey Type";

/// The six survey-type extracts, in output column order.
const SURVEY_EXTRACTS: [(&str, &str, bool); 6] = [
    ("Number of Surveys Completed Resource Outcome", "NUMBER OF SURVEYS", false),
    ("Number of Yes Responses to Resource Outcome", "NUMBER OF YES RESPONSES", false),
    ("Percent Responses Resource Outcome", "PERCENTAGE", false),
    ("Number of Surveys Completed Safety Planning", "NUMBER OF SURVEYS", true),
    ("Number of Yes Responses to Safety Planning", "NUMBER OF YES RESPONSES", true),
    ("Percent Responses Safety Planning", "PERCENTAGE", true),
];

/// Reshape the service-outcome columns into one row per grantee and survey
/// type, with one column per extract (surveys completed, yes responses, and
/// percentage, for resource-outcome and safety-planning surveys).
pub fn service_outcome_transform(processed: &Table, crosswalk: &Crosswalk) -> Result<Table> {
    // Work against upper-cased headers; the crosswalk raw names are stored
    // upper-cased as well.
    let upper_renames: Vec<(String, String)> = processed
        .columns()
        .iter()
        .map(|name| (name.clone(), name.to_uppercase()))
        .collect();
    let dat = processed.rename(&upper_renames);

    let outcome_columns: Vec<String> = crosswalk
        .raw_names_in_group("Service Outcome")
        .into_iter()
        .map(str::to_uppercase)
        .filter(|name| dat.has_column(name))
        .collect();

    let mut result = dat
        .select(&ID_COLUMNS)
        .context("select service-outcome identifiers")?;
    for (extract_name, indicator, safety) in SURVEY_EXTRACTS {
        let survey_columns: Vec<&str> = outcome_columns
            .iter()
            .map(String::as_str)
            .filter(|name| {
                let is_safety = name.contains("SAFTY") || name.contains("SAFETY");
                name.contains(indicator) && is_safety == safety
            })
            .collect();
        let long = survey_extract(&dat, &survey_columns, extract_name, crosswalk)?;

        let mut join_keys: Vec<&str> = ID_COLUMNS.to_vec();
        if result.has_column(SURVEY_TYPE) {
            join_keys.push(SURVEY_TYPE);
        }
        result = result
            .join(&long, &join_keys, JoinKind::Inner)
            .with_context(|| format!("merge survey extract {extract_name}"))?;
    }

    let result = result
        .sort_by(&["GRANTEETYPETXT", "FY", "PROGACRONYM", "POSTALCODE", "EIN", SURVEY_TYPE])
        .context("sort service outcomes")?;
    debug!(rows = result.height(), "service outcomes reshaped");

    Ok(result.rename(&[
        ("GRANTEETYPETXT".to_string(), "Grant Type".to_string()),
        ("FY".to_string(), "Year".to_string()),
        ("PROGACRONYM".to_string(), "Program Acronym".to_string()),
        ("POSTALCODE".to_string(), "State".to_string()),
    ]))
}

/// Melt one survey-type family into long form, resolving the melted column
/// names to survey-type labels through the crosswalk and standardizing them
/// to the five canonical survey names.
fn survey_extract(
    dat: &Table,
    survey_columns: &[&str],
    value_name: &str,
    crosswalk: &Crosswalk,
) -> Result<Table> {
    let long = dat
        .melt(&ID_COLUMNS, survey_columns, SURVEY_TYPE, value_name)
        .context("melt survey columns")?;
    Ok(long.map_column(SURVEY_TYPE, |value| {
        let label = value
            .as_str()
            .and_then(|raw| crosswalk.label_for(raw))
            .unwrap_or_default();
        Value::from(standardize_survey_type(label))
    }))
}

fn standardize_survey_type(label: &str) -> &'static str {
    if label.contains("Counseling") {
        "Counseling Survey"
    } else if label.contains("Shelter") {
        "Shelter Survey"
    } else if label.contains("Support Group") {
        "Support Group Survey"
    } else if label.contains("Support Services and Advocacy") {
        "Support Services and Advocacy Survey"
    } else {
        "Total"
    }
}
