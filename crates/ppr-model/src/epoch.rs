//! Versioned schema-epoch configuration.
//!
//! The OLDC export schema drifts year over year: the current form version
//! added two narrative questions, replaced the DUNS identifier with UEI, and
//! changed which duplicate-column glitches appear in the extract. Each epoch
//! is a self-contained configuration selected by tag, so callers never branch
//! on a year value inline.

use serde::{Deserialize, Serialize};

use crate::columns::{raw, renamed};
use crate::error::{ModelError, Result};

/// Ad-hoc rename for duplicated source columns.
///
/// The export occasionally repeats a header; ingest mangles repeats with a
/// `.N` suffix, and these fixes map the mangled names back to their intended
/// headers. `substring` selects the affected columns; `replacements` are
/// applied in order to every match other than the first occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateColumnFix {
    pub substring: String,
    pub replacements: Vec<String>,
}

/// Which ground-truth fiscal years an epoch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearFilter {
    /// Years strictly before the boundary year.
    Before(i64),
    /// The boundary year and later.
    From(i64),
    All,
}

impl YearFilter {
    pub fn matches(&self, year: i64) -> bool {
        match self {
            Self::Before(boundary) => year < *boundary,
            Self::From(boundary) => year >= *boundary,
            Self::All => true,
        }
    }
}

/// Per-epoch schema configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEpoch {
    pub tag: String,
    /// How many numbered narrative questions the narrative screen carries.
    pub narrative_question_count: usize,
    /// Raw identifier column -> standardized name.
    pub identifier_renames: Vec<(String, String)>,
    /// Sequencing columns excluded from cross-screen joins.
    pub transient_columns: Vec<String>,
    /// Straight renames applied to the summary-of-activities screen before
    /// crosswalk resolution (known duplicated grid headers).
    pub summary_column_renames: Vec<(String, String)>,
    /// Substring-matched duplicate-column fixes for the grantee population.
    pub grantee_duplicate_fixes: Vec<DuplicateColumnFix>,
    /// Attribute renames applied to melted grantee data before the lookup
    /// join (mangled narrative headers that the lookup knows by suffix).
    pub long_variable_fixes: Vec<(String, String)>,
    /// Ground-truth year coverage for this epoch.
    pub year_filter: YearFilter,
}

impl SchemaEpoch {
    /// Form versions 1-7 (fiscal years through 2023).
    pub fn legacy() -> Self {
        Self {
            tag: "legacy".to_string(),
            narrative_question_count: 5,
            identifier_renames: base_renames_with((raw::DUNS_ID, renamed::DUNS)),
            transient_columns: transient_columns(),
            summary_column_renames: summary_renames(),
            grantee_duplicate_fixes: vec![DuplicateColumnFix {
                substring: H02_QUESTION.to_string(),
                replacements: vec![H03_QUESTION.to_string()],
            }],
            long_variable_fixes: Vec::new(),
            year_filter: YearFilter::Before(2024),
        }
    }

    /// Form version 8 (fiscal year 2024 onward).
    pub fn current() -> Self {
        Self {
            tag: "current".to_string(),
            narrative_question_count: 7,
            identifier_renames: base_renames_with((raw::UEI, renamed::UEI)),
            transient_columns: transient_columns(),
            summary_column_renames: summary_renames(),
            grantee_duplicate_fixes: Vec::new(),
            long_variable_fixes: vec![
                (
                    H02_QUESTION_2024.to_string(),
                    format!("{}...49", H02_QUESTION_2024.to_uppercase()),
                ),
                (
                    format!("{H02_QUESTION_2024}.1"),
                    format!("{}...50", H02_QUESTION_2024.to_uppercase()),
                ),
            ],
            year_filter: YearFilter::From(2024),
        }
    }

    pub fn for_tag(tag: &str) -> Result<Self> {
        match tag {
            "legacy" | "fy2023" => Ok(Self::legacy()),
            "current" | "fy2024" => Ok(Self::current()),
            other => Err(ModelError::UnknownEpoch(other.to_string())),
        }
    }

    /// The numbered-question prefixes this epoch recognizes ("1. " .. "N. ").
    pub fn narrative_prefixes(&self) -> Vec<String> {
        (1..=self.narrative_question_count)
            .map(|n| format!("{n}. "))
            .collect()
    }
}

fn base_renames_with(extra: (&str, &str)) -> Vec<(String, String)> {
    let mut renames = vec![
        (raw::POSTAL_CODE.to_string(), renamed::STATE.to_string()),
        (raw::FISCAL_YEAR.to_string(), renamed::YEAR.to_string()),
        (
            raw::PROG_ACRONYM.to_string(),
            renamed::PROGRAM_ABBR.to_string(),
        ),
        (raw::RPT_EIN.to_string(), renamed::EIN.to_string()),
        (
            raw::PROGRAM_NAME.to_string(),
            renamed::PROGRAM_NAME.to_string(),
        ),
    ];
    renames.push((extra.0.to_string(), extra.1.to_string()));
    renames
}

fn transient_columns() -> Vec<String> {
    vec![
        raw::SCREEN_NAME.to_string(),
        raw::ROW_ITERATION.to_string(),
        raw::SCREEN_ITERATION.to_string(),
    ]
}

// The summary-of-activities grid repeats two headers in every extract pulled
// so far; the mangled repeats map back to their intended grid positions.
fn summary_renames() -> Vec<(String, String)> {
    vec![
        (
            "Types of Activities,FVPSA Summary of Activities,R19C2".to_string(),
            "Types of Activities,FVPSA Summary of Activities,R9C2".to_string(),
        ),
        (
            "Types of Activities,FVPSA Summary of Activities,R19C2.1".to_string(),
            "Types of Activities,FVPSA Summary of Activities,R19C2".to_string(),
        ),
        (
            "Number of People Reached &lt;BR&gt;(Training /TA only),FVPSA Underserved and culturally-specific populations Summary of Activities,RvC3".to_string(),
            "Number of People Reached &lt;BR&gt;(Training /TA only),FVPSA Underserved and culturally-specific populations Summary of Activities,R33C3".to_string(),
        ),
        (
            "Number of People Reached &lt;BR&gt;(Training /TA only),FVPSA Underserved and culturally-specific populations Summary of Activities,RvC3.1".to_string(),
            "Number of People Reached &lt;BR&gt;(Training /TA only),FVPSA Underserved and culturally-specific populations Summary of Activities,R31C3".to_string(),
        ),
    ]
}

const H02_QUESTION: &str = "H-02 What does the FVPSA grant allow you to do that you wouldn\u{c2}\u{bf}t be able to do without this funding?";

const H03_QUESTION: &str = "H-03 Describe any efforts supported in whole or in part by your FVPSA grant to meet the needs of underserved populations in your community, including populations underserved because of ethnic, racial, cultural or language diversity, sexual orientation or gender identity or geographic isolation. Describe any ongoing challenges.";

const H02_QUESTION_2024: &str = "H-02 What does the FVPSA grant allow you to do that you wouldn\u{bf}t be able to do without this funding?";
