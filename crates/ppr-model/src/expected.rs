//! Ground-truth enumeration of expected submissions.
//!
//! Coalitions do not always file a PPR, so missing submissions can only be
//! detected against an enumerated roster of (state, year, program)
//! combinations. The roster has no discovery mechanism: a new fiscal year or
//! program means a new entry here or in the injected JSON artifact.

use serde::{Deserialize, Serialize};

use crate::epoch::YearFilter;

/// One (year, program) reporting combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearProgram {
    pub year: String,
    pub program: String,
}

/// One expected (state, year, program) submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSubmission {
    pub state: String,
    pub year: String,
    pub program: String,
}

/// The enumerated ground truth: a state roster crossed with the known
/// (year, program) combinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    pub states: Vec<String>,
    pub year_programs: Vec<YearProgram>,
}

impl GroundTruth {
    /// Built-in coalition roster: 50 states, DC, and the five territories,
    /// with every (year, program) combination introduced so far.
    pub fn builtin_coalitions() -> Self {
        let states = COALITION_STATES
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let year_programs = [
            ("2018", "Core FVPSA"),
            ("2019", "Core FVPSA"),
            ("2020", "Core FVPSA"),
            ("2021", "Core FVPSA"),
            ("2021", "CARES Act"),
            ("2022", "Core FVPSA"),
            ("2022", "ARP Act"),
            ("2023", "Core FVPSA"),
            ("2023", "ARP Act"),
            ("2024", "Core FVPSA"),
            ("2024", "ARP Act"),
        ]
        .into_iter()
        .map(|(year, program)| YearProgram {
            year: year.to_string(),
            program: program.to_string(),
        })
        .collect();
        Self {
            states,
            year_programs,
        }
    }

    /// Expand to one expected submission per state and (year, program)
    /// combination, restricted to the years an epoch covers.
    pub fn expected(&self, filter: YearFilter) -> Vec<ExpectedSubmission> {
        let mut rows = Vec::new();
        for state in &self.states {
            for yp in &self.year_programs {
                let year: i64 = yp.year.parse().unwrap_or(0);
                if !filter.matches(year) {
                    continue;
                }
                rows.push(ExpectedSubmission {
                    state: state.clone(),
                    year: yp.year.clone(),
                    program: yp.program.clone(),
                });
            }
        }
        rows
    }
}

/// State roster for grantee (state/tribe) coverage reporting: the 50 states
/// plus DC and PR, sorted.
pub fn builtin_state_roster() -> Vec<String> {
    let mut states: Vec<String> = GRANTEE_STATES
        .split_whitespace()
        .map(str::to_string)
        .collect();
    states.sort();
    states
}

const COALITION_STATES: &str = "AL AK AZ AR CA CO CT DE DC FL GA HI ID IL IN IA KS KY LA ME MD MA \
     MI MN MS MO MT NE NV NH NJ NM NY NC ND OH OK OR PA RI SC SD TN TX UT VT VA WA WV WI WY \
     PR AS MP GU VI";

const GRANTEE_STATES: &str = "PA MS PR LA NM AZ FL AK OK HI KS DE IN ND MT WA RI KY TN OH IA WV \
     ID GA WI MD NE VT ME VA TX CA UT NC NJ NV MI MN OR NY DC SD WY CO MA IL CT AR MO NH SC AL";
