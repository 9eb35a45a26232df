use serde::Deserialize;

/// Envelope wrapping every Codeforces API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub comment: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_time_seconds: i64,
    #[serde(default)]
    pub duration_seconds: i64,
}

impl Contest {
    pub fn end_time_seconds(&self) -> i64 {
        self.start_time_seconds + self.duration_seconds
    }

    /// Contest name with tabs replaced, as stored in the ledger.
    pub fn display_name(&self) -> String {
        self.name.replace('\t', " ").trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub contest_id: Option<i64>,
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub name: String,
}

impl Problem {
    pub fn display_name(&self) -> String {
        self.name.replace('\t', " ").trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub contest_id: Option<i64>,
    #[serde(default)]
    pub creation_time_seconds: i64,
    pub problem: Problem,
    pub verdict: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict.as_deref() == Some("OK")
    }
}
