//! Column-name constants shared across the pipeline.
//!
//! Every screen of an OLDC extract carries the same identifier-column prefix;
//! the names here are the contract between ingest, the core transforms, and
//! the output sheets. Raw names are the headers as exported by OLDC; renamed
//! names are what the processed sheets use.

/// Raw OLDC identifier columns.
pub mod raw {
    pub const SCREEN_NAME: &str = "Screen-Name";
    pub const ROW_ITERATION: &str = "Row-Iteration";
    pub const SCREEN_ITERATION: &str = "Screen-Iteration";
    pub const REV_SEQ_NUMBER: &str = "RevSeqNumber";
    pub const SUBMIT_DATE: &str = "SubmitDate";
    pub const POSTAL_CODE: &str = "PostalCode";
    pub const FISCAL_YEAR: &str = "Fy";
    pub const PROG_ACRONYM: &str = "ProgAcronym";
    pub const PROGRAM_NAME: &str = "ProgramName";
    pub const RPT_EIN: &str = "RptEin";
    pub const EIN: &str = "EIN";
    pub const DUNS_ID: &str = "DunsId9";
    pub const UEI: &str = "UEI[Unique Entity Identifier]";
    pub const GRANTEE_TYPE: &str = "GranteeTypeTxt";
    pub const GRANTEE_NAME: &str = "GranteeName";
    pub const CODE_TXT: &str = "CodeTxt";
    pub const RECEIPT_ID: &str = "Rpt-Receipt-Id";
}

/// Identifier columns after standardization renames.
pub mod renamed {
    pub const STATE: &str = "State";
    pub const YEAR: &str = "Year";
    pub const PROGRAM_ABBR: &str = "Program Abbr";
    pub const PROGRAM_NAME: &str = "Program Name";
    pub const EIN: &str = "EIN";
    pub const DUNS: &str = "DUNS";
    pub const UEI: &str = "UEI";
}

/// Long-format output columns.
pub mod long {
    pub const GRANT_TYPE: &str = "Grant Type";
    pub const YEAR: &str = "Year";
    pub const PROGRAM_ACRONYM: &str = "Program Acronym";
    pub const STATE: &str = "State";
    pub const EIN: &str = "EIN";
    pub const ELEMENT: &str = "Element";
    pub const VALUE: &str = "Value";
    /// Melt attribute column prior to the lookup join.
    pub const VARIABLE: &str = "Variable";
}

/// Crosswalk / lookup workbook columns.
pub mod crosswalk {
    pub const META_NAME_DESCRIPTION: &str = "Meta Name Description";
    pub const LABEL: &str = "Label";
    pub const GROUP_DESCRIPTION: &str = "Group_Description";
    pub const ELEMENT: &str = "Element";
    pub const NOTE: &str = "Note";
    pub const SUBAWARDEE_CATEGORY: &str = "SubAwdCultSpecf";
}

/// Columns introduced by the pipeline itself.
pub mod derived {
    pub const MISSING: &str = "Missing";
    pub const COALITION_NAME: &str = "CoalitionName";
    pub const SHELTER_TYPE: &str = "ShelterType";
    pub const SHELTER_TOTAL: &str = "Shelter Total";
    pub const NONSHELTER_TOTAL: &str = "Non-shelter Total";
    pub const GRANTEE_NAME: &str = "Grantee Name";
    /// Engineered attributes that bypass the crosswalk filter.
    pub const SUBAWARDEE_SHELTER_TOTAL: &str = "SUBAWARDEE_SHELTER_TOTAL";
    pub const SUBAWARDEE_NONSHELTER_TOTAL: &str = "SUBAWARDEE_NONSHELTER_TOTAL";
}
