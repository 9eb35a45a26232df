use crate::{
    modules::{
        classifier::{self, Population},
        clock,
        config::FetchConfig,
        ledger,
    },
    types::ledger::LedgerRow,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use codeforces_activity_libs::{CodeforcesApi, Contest, Submission};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};
use tokio::time::{self, Duration};

pub struct ActivityFetcher<'a, A: CodeforcesApi> {
    api: &'a A,
    group_code: String,
    official_cutoff: i64,
    interval: Duration,
}

impl<'a, A: CodeforcesApi> ActivityFetcher<'a, A> {
    pub fn new(api: &'a A, config: &FetchConfig) -> Self {
        Self {
            api,
            group_code: config.group_code.clone(),
            official_cutoff: config.official_cutoff(),
            interval: config.request_interval,
        }
    }

    async fn pause(&self) {
        if !self.interval.is_zero() {
            time::sleep(self.interval).await;
        }
    }

    /// Contests of the private group. Failures only produce a warning and an empty set.
    pub async fn fetch_group_contests(&self) -> BTreeMap<i64, Contest> {
        let result = self.api.contest_list(Some(&self.group_code)).await;
        self.pause().await;

        match result {
            Ok(contests) => {
                tracing::info!("{} group contests retrieved", contests.len());
                contests
                    .into_iter()
                    .map(|contest| (contest.id, contest))
                    .collect()
            }
            Err(e) => {
                tracing::warn!(
                    "failed to load group contests, continuing without them. If the group is private, set CF_API_KEY and CF_API_SECRET: {}",
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Official Div. 1 / Div. 2 contests starting on or after the configured date.
    pub async fn fetch_official_contests(&self) -> Result<BTreeMap<i64, Contest>> {
        let contests = self.api.contest_list(None).await.with_context(|| {
            let message = "failed to load official contests";
            tracing::error!(message);
            message
        })?;
        self.pause().await;

        let contests: BTreeMap<i64, Contest> = contests
            .into_iter()
            .filter(|contest| classifier::is_tracked_official(contest, self.official_cutoff))
            .map(|contest| (contest.id, contest))
            .collect();
        tracing::info!("{} official contests are tracked", contests.len());

        Ok(contests)
    }

    /// New rows from group contests, queried per contest and handle.
    pub async fn crawl_group(
        &self,
        contests: &BTreeMap<i64, Contest>,
        handles: &BTreeSet<String>,
        watermark: i64,
    ) -> Result<Vec<LedgerRow>> {
        let mut rows = Vec::new();

        for (contest_id, contest) in contests.iter() {
            tracing::info!("Crawl group contest {} ({})", contest_id, contest.name);
            let contest_link = format!(
                "https://codeforces.com/group/{}/contest/{}",
                self.group_code, contest_id
            );

            for handle in handles.iter() {
                let submissions = self
                    .api
                    .contest_status(*contest_id, handle)
                    .await
                    .with_context(|| {
                        let message = format!(
                            "failed to load submissions of {} in contest {}",
                            handle, contest_id
                        );
                        tracing::error!(message);
                        message
                    })?;
                self.pause().await;

                rows.extend(
                    submissions
                        .iter()
                        .filter(|submission| is_new_accepted(submission, watermark))
                        .map(|submission| {
                            to_row(handle, contest, &contest_link, submission, Population::Group)
                        }),
                );
            }
        }

        tracing::info!("{} new rows from group contests", rows.len());
        Ok(rows)
    }

    /// New rows from official contests, taken from each handle's whole submission history.
    pub async fn crawl_official(
        &self,
        contests: &BTreeMap<i64, Contest>,
        handles: &BTreeSet<String>,
        watermark: i64,
    ) -> Result<Vec<LedgerRow>> {
        let mut rows = Vec::new();

        for handle in handles.iter() {
            tracing::info!("Crawl submissions of {}", handle);
            let submissions = self.api.user_status(handle).await.with_context(|| {
                let message = format!("failed to load submissions of {}", handle);
                tracing::error!(message);
                message
            })?;
            self.pause().await;

            for submission in submissions
                .iter()
                .filter(|submission| is_new_accepted(submission, watermark))
            {
                let Some(contest) = submission
                    .contest_id
                    .and_then(|contest_id| contests.get(&contest_id))
                else {
                    continue;
                };
                let contest_link = format!("https://codeforces.com/contest/{}", contest.id);
                rows.push(to_row(
                    handle,
                    contest,
                    &contest_link,
                    submission,
                    Population::Official,
                ));
            }
        }

        tracing::info!("{} new rows from official contests", rows.len());
        Ok(rows)
    }

    /// Runs one incremental fetch and writes the next ledger into `dir`.
    ///
    /// Nothing is written unless every required request succeeds.
    pub async fn run(
        &self,
        dir: &Path,
        handles: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let stamp = clock::file_stamp(now);
        let latest = ledger::find_latest(dir)?;
        let watermark = latest.as_ref().map_or(0, |file| file.watermark());
        let existing = ledger::load_existing(latest.as_ref())?;
        tracing::info!(
            "Submissions after {} will be collected",
            clock::format_datetime(watermark)
        );

        let group_contests = self.fetch_group_contests().await;
        let official_contests = self.fetch_official_contests().await?;

        let mut rows = self.crawl_group(&group_contests, handles, watermark).await?;
        rows.extend(
            self.crawl_official(&official_contests, handles, watermark)
                .await?,
        );
        rows.sort();

        let path = ledger::write(dir, &stamp, &existing, &rows)?;
        Ok(path)
    }
}

fn is_new_accepted(submission: &Submission, watermark: i64) -> bool {
    submission.is_accepted() && submission.creation_time_seconds > watermark
}

fn to_row(
    handle: &str,
    contest: &Contest,
    contest_link: &str,
    submission: &Submission,
    population: Population,
) -> LedgerRow {
    let (solve_type, credits) = classifier::classify(submission, contest, population);
    let problem_id = submission.problem.index.clone();
    let problem_link = format!(
        "https://codeforces.com/contest/{}/problem/{}",
        contest.id, problem_id
    );

    LedgerRow {
        submitted_at: clock::format_datetime(submission.creation_time_seconds),
        handle: handle.to_string(),
        contest_name: contest.display_name(),
        contest_id: contest.id,
        contest_link: contest_link.to_string(),
        contest_start: clock::format_datetime(contest.start_time_seconds),
        contest_end: clock::format_datetime(contest.end_time_seconds()),
        solve_type,
        credits,
        problem_id,
        problem_title: submission.problem.display_name(),
        problem_link,
        remark: String::new(),
    }
}
