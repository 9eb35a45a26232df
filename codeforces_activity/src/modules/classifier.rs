use crate::types::ledger::SolveType;
use codeforces_activity_libs::{Contest, Submission};

/// Group contest submissions within this many seconds after the contest ends earn upsolve credit.
pub const UPSOLVE_WINDOW_SECONDS: i64 = 168 * 3600;
pub const LIVE_CREDITS: u32 = 2;
pub const UPSOLVE_CREDITS: u32 = 1;

const DIVISION_MARKERS: [&str; 2] = ["Div. 1", "Div. 2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    Group,
    Official,
}

/// Whether an official contest is tracked: started at or after `cutoff` and rated for a division.
pub fn is_tracked_official(contest: &Contest, cutoff: i64) -> bool {
    contest.start_time_seconds >= cutoff
        && DIVISION_MARKERS
            .iter()
            .any(|marker| contest.name.contains(marker))
}

/// Decides the solve type and the credits earned by an accepted submission.
pub fn classify(
    submission: &Submission,
    contest: &Contest,
    population: Population,
) -> (SolveType, u32) {
    let created = submission.creation_time_seconds;
    let end_time = contest.end_time_seconds();

    if created <= end_time {
        let credits = match population {
            // The first problem of Div. 2 rounds is not worth any credit.
            Population::Official
                if contest.name.contains("Div. 2") && submission.problem.index == "A" =>
            {
                0
            }
            _ => LIVE_CREDITS,
        };
        return (SolveType::Live, credits);
    }

    let credits = match population {
        Population::Group if created <= end_time + UPSOLVE_WINDOW_SECONDS => UPSOLVE_CREDITS,
        _ => 0,
    };
    (SolveType::Upsolve, credits)
}
