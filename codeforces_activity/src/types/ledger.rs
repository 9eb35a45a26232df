use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Column names of the ledger CSV, in file order.
pub const HEADER: [&str; 13] = [
    "submission_datetime",
    "handle",
    "contest_name",
    "contest_id",
    "contest_link",
    "contest_start",
    "contest_end",
    "live_or_upsolve",
    "credits",
    "problem_id",
    "problem_title",
    "problem_link",
    "remark",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveType {
    Live,
    Upsolve,
}

impl fmt::Display for SolveType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveType::Live => write!(f, "live"),
            SolveType::Upsolve => write!(f, "upsolve"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "submission_datetime")]
    pub submitted_at: String,
    pub handle: String,
    pub contest_name: String,
    pub contest_id: i64,
    pub contest_link: String,
    pub contest_start: String,
    pub contest_end: String,
    #[serde(rename = "live_or_upsolve")]
    pub solve_type: SolveType,
    pub credits: u32,
    pub problem_id: String,
    pub problem_title: String,
    pub problem_link: String,
    #[serde(default)]
    pub remark: String,
}

impl LedgerRow {
    /// The row as written to the CSV file.
    pub fn fields(&self) -> [String; 13] {
        [
            self.submitted_at.clone(),
            self.handle.clone(),
            self.contest_name.clone(),
            self.contest_id.to_string(),
            self.contest_link.clone(),
            self.contest_start.clone(),
            self.contest_end.clone(),
            self.solve_type.to_string(),
            self.credits.to_string(),
            self.problem_id.clone(),
            self.problem_title.clone(),
            self.problem_link.clone(),
            self.remark.clone(),
        ]
    }
}

// Rows order by their textual fields, submission time first.
impl Ord for LedgerRow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fields().cmp(&other.fields())
    }
}

impl PartialOrd for LedgerRow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
