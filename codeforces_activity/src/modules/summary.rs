use crate::types::ledger::{LedgerRow, SolveType};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

pub const SUMMARY_FILE_NAME: &str = "codeforces_activity.yaml";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDocument {
    pub cutoff_date: String,
    pub competitions: Vec<CompetitionInfo>,
    pub records_by_handle: BTreeMap<String, HandleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionInfo {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandleRecord {
    pub total_credits: u32,
    pub total_live_credits: u32,
    pub total_upsolve_credits: u32,
    pub competitions: Vec<CompetitionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionRecord {
    pub competition_id: i64,
    pub total_credits: u32,
    pub live_credits: u32,
    pub upsolve_credits: u32,
    pub problems: Vec<ProblemEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub submitted_at: String,
    pub solve_type: SolveType,
    pub credits: u32,
}

impl From<&LedgerRow> for ProblemEntry {
    fn from(row: &LedgerRow) -> Self {
        Self {
            id: row.problem_id.clone(),
            title: row.problem_title.clone(),
            link: row.problem_link.clone(),
            submitted_at: row.submitted_at.clone(),
            solve_type: row.solve_type,
            credits: row.credits,
        }
    }
}

#[derive(Debug, Default)]
struct Credits {
    total: u32,
    live: u32,
    upsolve: u32,
}

impl Credits {
    fn add(&mut self, solve_type: SolveType, credits: u32) {
        self.total += credits;
        match solve_type {
            SolveType::Live => self.live += credits,
            SolveType::Upsolve => self.upsolve += credits,
        }
    }

    // Only ever called with values previously passed to `add`.
    fn subtract(&mut self, solve_type: SolveType, credits: u32) {
        self.total -= credits;
        match solve_type {
            SolveType::Live => self.live -= credits,
            SolveType::Upsolve => self.upsolve -= credits,
        }
    }
}

#[derive(Debug, Default)]
struct CompetitionBucket {
    credits: Credits,
    problems: BTreeMap<String, ProblemEntry>,
}

#[derive(Debug, Default)]
struct HandleBucket {
    credits: Credits,
    competitions: HashMap<i64, CompetitionBucket>,
}

/// Folds ledger rows into per handle totals, counting only the earliest submission of
/// each (handle, contest, problem).
#[derive(Debug, Default)]
pub struct Aggregator {
    competitions: Vec<CompetitionInfo>,
    seen_competitions: HashMap<i64, usize>,
    handles: BTreeMap<String, HandleBucket>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &LedgerRow) {
        if !self.seen_competitions.contains_key(&row.contest_id) {
            self.seen_competitions
                .insert(row.contest_id, self.competitions.len());
            self.competitions.push(CompetitionInfo {
                id: row.contest_id,
                name: row.contest_name.clone(),
                link: row.contest_link.clone(),
                start: row.contest_start.clone(),
                end: row.contest_end.clone(),
            });
        }

        let handle = self.handles.entry(row.handle.clone()).or_default();
        let competition = handle.competitions.entry(row.contest_id).or_default();

        match competition.problems.get_mut(&row.problem_id) {
            None => {
                competition
                    .problems
                    .insert(row.problem_id.clone(), ProblemEntry::from(row));
            }
            Some(existing) if row.submitted_at < existing.submitted_at => {
                handle
                    .credits
                    .subtract(existing.solve_type, existing.credits);
                competition
                    .credits
                    .subtract(existing.solve_type, existing.credits);
                *existing = ProblemEntry::from(row);
            }
            Some(_) => return,
        }

        handle.credits.add(row.solve_type, row.credits);
        competition.credits.add(row.solve_type, row.credits);
    }

    pub fn finish(self, cutoff_date: String) -> SummaryDocument {
        let competitions = self.competitions;
        let records_by_handle = self
            .handles
            .into_iter()
            .map(|(name, mut bucket)| {
                let ordered = competitions
                    .iter()
                    .filter_map(|info| {
                        bucket
                            .competitions
                            .remove(&info.id)
                            .map(|competition| (info.id, competition))
                    })
                    .map(|(competition_id, competition)| {
                        let mut problems: Vec<ProblemEntry> =
                            competition.problems.into_values().collect();
                        problems.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));

                        CompetitionRecord {
                            competition_id,
                            total_credits: competition.credits.total,
                            live_credits: competition.credits.live,
                            upsolve_credits: competition.credits.upsolve,
                            problems,
                        }
                    })
                    .collect();

                let record = HandleRecord {
                    total_credits: bucket.credits.total,
                    total_live_credits: bucket.credits.live,
                    total_upsolve_credits: bucket.credits.upsolve,
                    competitions: ordered,
                };
                (name, record)
            })
            .collect();

        SummaryDocument {
            cutoff_date,
            competitions,
            records_by_handle,
        }
    }
}

pub fn aggregate(rows: &[LedgerRow], cutoff_date: String) -> SummaryDocument {
    let mut aggregator = Aggregator::new();
    for row in rows {
        aggregator.push(row);
    }
    aggregator.finish(cutoff_date)
}

pub fn to_yaml(document: &SummaryDocument) -> Result<String> {
    serde_yaml::to_string(document).context("failed to serialize summary document")
}

pub fn write(document: &SummaryDocument, path: &Path) -> Result<()> {
    let text = to_yaml(document)?;
    fs::write(path, text).with_context(|| {
        let message = format!("failed to write summary to {}", path.display());
        tracing::error!(message);
        message
    })?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(
        submitted_at: &str,
        handle: &str,
        contest_id: i64,
        problem_id: &str,
        solve_type: SolveType,
        credits: u32,
    ) -> LedgerRow {
        LedgerRow {
            submitted_at: submitted_at.to_string(),
            handle: handle.to_string(),
            contest_name: format!("Contest {}", contest_id),
            contest_id,
            contest_link: format!("https://codeforces.com/contest/{}", contest_id),
            contest_start: String::from("2026-01-20 07:35:00 MST"),
            contest_end: String::from("2026-01-20 09:35:00 MST"),
            solve_type,
            credits,
            problem_id: problem_id.to_string(),
            problem_title: format!("Title {}", problem_id),
            problem_link: format!("https://codeforces.com/contest/{}/problem/{}", contest_id, problem_id),
            remark: String::new(),
        }
    }

    #[test]
    fn test_earlier_submission_replaces_later_one() {
        let rows = vec![
            row("2026-01-22 10:00:00 MST", "alice", 1, "A", SolveType::Upsolve, 1),
            row("2026-01-20 08:00:00 MST", "alice", 1, "A", SolveType::Live, 2),
        ];
        let document = aggregate(&rows, String::from("cutoff"));

        let alice = &document.records_by_handle["alice"];
        assert_eq!(alice.total_credits, 2);
        assert_eq!(alice.total_live_credits, 2);
        assert_eq!(alice.total_upsolve_credits, 0);

        let competition = &alice.competitions[0];
        assert_eq!(
            (competition.total_credits, competition.live_credits, competition.upsolve_credits),
            (2, 2, 0)
        );
        assert_eq!(competition.problems.len(), 1);
        assert_eq!(competition.problems[0].submitted_at, "2026-01-20 08:00:00 MST");
        assert_eq!(competition.problems[0].solve_type, SolveType::Live);
    }

    #[test]
    fn test_later_duplicate_is_ignored() {
        let rows = vec![
            row("2026-01-20 08:00:00 MST", "alice", 1, "A", SolveType::Live, 2),
            row("2026-01-20 08:00:00 MST", "alice", 1, "A", SolveType::Live, 2),
            row("2026-01-25 08:00:00 MST", "alice", 1, "A", SolveType::Upsolve, 1),
        ];
        let document = aggregate(&rows, String::from("cutoff"));

        let alice = &document.records_by_handle["alice"];
        assert_eq!(alice.total_credits, 2);
        assert_eq!(alice.competitions[0].problems.len(), 1);
    }

    #[test]
    fn test_result_does_not_depend_on_row_order() {
        let rows = vec![
            row("2026-01-21 08:00:00 MST", "bob", 2, "B", SolveType::Upsolve, 1),
            row("2026-01-20 08:00:00 MST", "bob", 2, "B", SolveType::Live, 2),
            row("2026-01-30 08:00:00 MST", "bob", 2, "B", SolveType::Upsolve, 0),
            row("2026-01-20 09:00:00 MST", "bob", 2, "C", SolveType::Live, 2),
        ];
        let forward = aggregate(&rows, String::from("cutoff"));
        let mut reversed_rows = rows.clone();
        reversed_rows.reverse();
        let reversed = aggregate(&reversed_rows, String::from("cutoff"));

        assert_eq!(
            forward.records_by_handle["bob"],
            reversed.records_by_handle["bob"]
        );
        assert_eq!(forward.records_by_handle["bob"].total_credits, 4);
    }

    #[test]
    fn test_competitions_follow_global_first_seen_order() {
        let rows = vec![
            row("2026-01-20 08:00:00 MST", "alice", 30, "A", SolveType::Live, 2),
            row("2026-01-20 08:00:00 MST", "bob", 10, "A", SolveType::Live, 2),
            row("2026-01-21 08:00:00 MST", "bob", 20, "B", SolveType::Upsolve, 1),
            row("2026-01-21 09:00:00 MST", "bob", 30, "B", SolveType::Upsolve, 1),
            row("2026-01-19 09:00:00 MST", "bob", 10, "B", SolveType::Live, 2),
        ];
        let document = aggregate(&rows, String::from("cutoff"));

        let ids: Vec<i64> = document.competitions.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);

        let bob = &document.records_by_handle["bob"];
        let bob_ids: Vec<i64> = bob.competitions.iter().map(|c| c.competition_id).collect();
        assert_eq!(bob_ids, vec![30, 10, 20]);
        assert_eq!(bob.total_credits, 6);
        assert_eq!(bob.total_live_credits, 4);
        assert_eq!(bob.total_upsolve_credits, 2);

        // problems are ordered by submission time
        let problems: Vec<&str> = bob.competitions[1]
            .problems
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(problems, vec!["B", "A"]);
    }

    #[test]
    fn test_yaml_is_stable() {
        let rows = vec![
            row("2026-01-20 08:00:00 MST", "alice", 1, "A", SolveType::Live, 2),
            row("2026-01-20 08:30:00 MST", "alice", 1, "B", SolveType::Live, 0),
        ];
        let first = to_yaml(&aggregate(&rows, String::from("2026-02-01 09:30:00 MST"))).unwrap();
        let second = to_yaml(&aggregate(&rows, String::from("2026-02-01 09:30:00 MST"))).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("cutoff_date: "));
        assert!(first.contains("records_by_handle:"));
        assert!(first.contains("solve_type: live"));

        let parsed: serde_yaml::Value = serde_yaml::from_str(&first).unwrap();
        assert_eq!(parsed["cutoff_date"].as_str(), Some("2026-02-01 09:30:00 MST"));
        assert_eq!(
            parsed["records_by_handle"]["alice"]["total_credits"].as_u64(),
            Some(2)
        );
        assert_eq!(
            parsed["records_by_handle"]["alice"]["competitions"][0]["problems"][1]["id"].as_str(),
            Some("B")
        );
    }
}
