//! CSV lead-record normalization.
//!
//! Turns raw tabular text (first row = header, comma delimited) into typed
//! [`LeadRecord`]s plus a list of per-row rejections. This is a pure
//! transformation: no I/O, no database, no side effects.
//!
//! The header is matched case-sensitively against a fixed schema; unknown
//! columns are ignored. Individual malformed rows are rejected without
//! failing the whole import, but an import in which zero rows survive fails
//! with [`NormalizeError::NoValidRecords`] before any ledger entry exists.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Expected schema
// ---------------------------------------------------------------------------

pub const COL_PROSPECT_ID: &str = "prospect_id";
pub const COL_BUSINESS_NAME: &str = "business_name";
pub const COL_CONTACT_NAME: &str = "contact_name";
pub const COL_CONTACT_EMAIL: &str = "contact_email";
pub const COL_PHONE: &str = "phone";
pub const COL_DEAL_VALUE: &str = "deal_value";
pub const COL_BF_INTEREST: &str = "bf_interest";
pub const COL_CT_INTEREST: &str = "ct_interest";
pub const COL_BA_INTEREST: &str = "ba_interest";

/// All recognized column names, in canonical order.
pub const EXPECTED_COLUMNS: &[&str] = &[
    COL_PROSPECT_ID,
    COL_BUSINESS_NAME,
    COL_CONTACT_NAME,
    COL_CONTACT_EMAIL,
    COL_PHONE,
    COL_DEAL_VALUE,
    COL_BF_INTEREST,
    COL_CT_INTEREST,
    COL_BA_INTEREST,
];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A validated, typed lead record produced from one CSV data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadRecord {
    pub prospect_id: String,
    pub business_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub deal_value: Option<f64>,
    pub bf_interest: bool,
    pub ct_interest: bool,
    pub ba_interest: bool,
}

/// Why a data row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectReason {
    /// The row was entirely empty.
    EmptyRow,
    /// The row's column count differs from the header's.
    ColumnCountMismatch { expected: usize, found: usize },
    /// A mandatory field was empty or its column is absent from the header.
    MissingField { column: &'static str },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRow => write!(f, "empty row"),
            Self::ColumnCountMismatch { expected, found } => {
                write!(f, "expected {expected} columns, found {found}")
            }
            Self::MissingField { column } => write!(f, "missing mandatory field '{column}'"),
        }
    }
}

/// A rejected data row. `line` is the 1-based line number in the source
/// text (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub line: usize,
    pub reason: RejectReason,
}

/// The result of normalizing one raw CSV payload.
#[derive(Debug, Clone)]
pub struct ParsedImport {
    pub records: Vec<LeadRecord>,
    pub rejections: Vec<RowRejection>,
}

/// Fatal normalization failure. Per-row problems are reported as
/// [`RowRejection`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("No valid lead records found in the uploaded file")]
    NoValidRecords,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Parse raw CSV text into lead records and row rejections.
///
/// Returns `Err(NoValidRecords)` when no data row survives validation, so
/// callers can abort before opening a provenance ledger entry.
pub fn normalize(raw: &str) -> Result<ParsedImport, NormalizeError> {
    let mut lines = raw.lines();

    let header_line = match lines.next() {
        Some(h) => h.trim_end_matches('\r'),
        None => return Err(NormalizeError::NoValidRecords),
    };
    let header: Vec<&str> = header_line.split(',').map(str::trim).collect();

    // Position of each recognized column in the header, exact match only.
    let col = |name: &str| header.iter().position(|h| *h == name);
    let idx_prospect = col(COL_PROSPECT_ID);
    let idx_business = col(COL_BUSINESS_NAME);
    let idx_contact = col(COL_CONTACT_NAME);
    let idx_email = col(COL_CONTACT_EMAIL);
    let idx_phone = col(COL_PHONE);
    let idx_value = col(COL_DEAL_VALUE);
    let idx_bf = col(COL_BF_INTEREST);
    let idx_ct = col(COL_CT_INTEREST);
    let idx_ba = col(COL_BA_INTEREST);

    let mut records = Vec::new();
    let mut rejections = Vec::new();

    for (i, raw_line) in lines.enumerate() {
        let line_no = i + 2; // header is line 1
        let line = raw_line.trim_end_matches('\r');

        if line.trim().is_empty() {
            rejections.push(RowRejection {
                line: line_no,
                reason: RejectReason::EmptyRow,
            });
            continue;
        }

        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != header.len() {
            rejections.push(RowRejection {
                line: line_no,
                reason: RejectReason::ColumnCountMismatch {
                    expected: header.len(),
                    found: cells.len(),
                },
            });
            continue;
        }

        let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).copied().unwrap_or("");

        let prospect_id = cell(idx_prospect);
        if prospect_id.is_empty() {
            rejections.push(RowRejection {
                line: line_no,
                reason: RejectReason::MissingField {
                    column: COL_PROSPECT_ID,
                },
            });
            continue;
        }

        let business_name = cell(idx_business);
        if business_name.is_empty() {
            rejections.push(RowRejection {
                line: line_no,
                reason: RejectReason::MissingField {
                    column: COL_BUSINESS_NAME,
                },
            });
            continue;
        }

        records.push(LeadRecord {
            prospect_id: prospect_id.to_string(),
            business_name: business_name.to_string(),
            contact_name: optional(cell(idx_contact)),
            contact_email: optional(cell(idx_email)),
            phone: optional(cell(idx_phone)),
            deal_value: cell(idx_value).parse::<f64>().ok(),
            bf_interest: parse_flag(cell(idx_bf)),
            ct_interest: parse_flag(cell(idx_ct)),
            ba_interest: parse_flag(cell(idx_ba)),
        });
    }

    if records.is_empty() {
        return Err(NormalizeError::NoValidRecords);
    }

    Ok(ParsedImport {
        records,
        rejections,
    })
}

/// Interpret an interest flag cell: `"true"` and `"on"` (case-insensitive)
/// are true, everything else is false.
pub fn parse_flag(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("on")
}

fn optional(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HEADER: &str = "prospect_id,business_name,contact_name,contact_email,phone,deal_value,bf_interest,ct_interest,ba_interest";

    fn row(cells: &[&str]) -> String {
        cells.join(",")
    }

    #[test]
    fn full_header_matches_the_canonical_schema() {
        assert_eq!(FULL_HEADER, EXPECTED_COLUMNS.join(","));
    }

    // -- happy path -----------------------------------------------------------

    #[test]
    fn full_row_parses_all_fields() {
        let raw = format!(
            "{FULL_HEADER}\n{}",
            row(&[
                "P-1001",
                "Acme Bakery",
                "Jo Smith",
                "jo@acme.example",
                "07700 900123",
                "2500.50",
                "true",
                "on",
                "false"
            ])
        );
        let parsed = normalize(&raw).unwrap();
        assert_eq!(parsed.rejections.len(), 0);
        assert_eq!(parsed.records.len(), 1);

        let rec = &parsed.records[0];
        assert_eq!(rec.prospect_id, "P-1001");
        assert_eq!(rec.business_name, "Acme Bakery");
        assert_eq!(rec.contact_name.as_deref(), Some("Jo Smith"));
        assert_eq!(rec.contact_email.as_deref(), Some("jo@acme.example"));
        assert_eq!(rec.phone.as_deref(), Some("07700 900123"));
        assert_eq!(rec.deal_value, Some(2500.50));
        assert!(rec.bf_interest);
        assert!(rec.ct_interest);
        assert!(!rec.ba_interest);
    }

    #[test]
    fn minimal_header_is_sufficient() {
        let raw = "prospect_id,business_name\nP-1,Acme\nP-2,Globex";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].business_name, "Globex");
        assert!(parsed.records[0].contact_name.is_none());
        assert_eq!(parsed.records[0].deal_value, None);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let raw = "prospect_id,favourite_colour,business_name\nP-1,teal,Acme";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].prospect_id, "P-1");
        assert_eq!(parsed.records[0].business_name, "Acme");
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let raw = "prospect_id,business_name\r\nP-1,Acme\r\n";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].business_name, "Acme");
    }

    // -- row rejections -------------------------------------------------------

    #[test]
    fn empty_row_is_rejected_not_fatal() {
        let raw = "prospect_id,business_name\nP-1,Acme\n\nP-2,Globex";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(
            parsed.rejections,
            vec![RowRejection {
                line: 3,
                reason: RejectReason::EmptyRow
            }]
        );
    }

    #[test]
    fn column_count_mismatch_is_rejected() {
        let raw = "prospect_id,business_name\nP-1,Acme,extra";
        // The only data row is rejected, so the import has no valid records.
        assert!(matches!(
            normalize(raw),
            Err(NormalizeError::NoValidRecords)
        ));
    }

    #[test]
    fn missing_prospect_id_is_rejected() {
        let raw = "prospect_id,business_name,contact_name,bf_interest\n\
                   P-1,Acme,Jo,true\n\
                   ,Globex,Sam,false\n\
                   P-3,Initech,Pat,on";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.rejections.len(), 1);
        assert_eq!(parsed.rejections[0].line, 3);
        assert_eq!(
            parsed.rejections[0].reason,
            RejectReason::MissingField {
                column: COL_PROSPECT_ID
            }
        );
    }

    #[test]
    fn rejection_serializes_with_a_kind_tag() {
        let rejection = RowRejection {
            line: 4,
            reason: RejectReason::MissingField {
                column: COL_PROSPECT_ID,
            },
        };
        let json = serde_json::to_value(&rejection).unwrap();
        assert_eq!(json["line"], 4);
        assert_eq!(json["reason"]["kind"], "missing_field");
        assert_eq!(json["reason"]["column"], "prospect_id");
    }

    #[test]
    fn missing_business_name_is_rejected() {
        let raw = "prospect_id,business_name\nP-1,";
        assert!(matches!(
            normalize(raw),
            Err(NormalizeError::NoValidRecords)
        ));
    }

    #[test]
    fn header_match_is_case_sensitive() {
        // "Prospect_Id" is an unknown column, so every row lacks prospect_id.
        let raw = "Prospect_Id,business_name\nP-1,Acme";
        assert!(matches!(
            normalize(raw),
            Err(NormalizeError::NoValidRecords)
        ));
    }

    // -- field coercion -------------------------------------------------------

    #[test]
    fn flags_accept_true_and_on_case_insensitive() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("on"));
        assert!(parse_flag("On"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag("1"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn unparseable_deal_value_defaults_to_absent() {
        let raw = "prospect_id,business_name,deal_value\nP-1,Acme,not-a-number";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records[0].deal_value, None);
    }

    #[test]
    fn deal_value_zero_is_preserved() {
        let raw = "prospect_id,business_name,deal_value\nP-1,Acme,0";
        let parsed = normalize(raw).unwrap();
        assert_eq!(parsed.records[0].deal_value, Some(0.0));
    }

    // -- fatal failures -------------------------------------------------------

    #[test]
    fn empty_input_has_no_valid_records() {
        assert!(matches!(normalize(""), Err(NormalizeError::NoValidRecords)));
    }

    #[test]
    fn header_only_input_has_no_valid_records() {
        assert!(matches!(
            normalize(FULL_HEADER),
            Err(NormalizeError::NoValidRecords)
        ));
    }
}
