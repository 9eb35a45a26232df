use crate::modules::{
    ledger::{self, LedgerError, LedgerFile},
    summary::{self, SUMMARY_FILE_NAME},
};
use anyhow::Result;
use clap::Args;
use std::{env, ffi::OsString, path::PathBuf};

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// Ledger to summarize. Defaults to the latest codeforces_activity_*.csv in the current directory.
    path: Option<OsString>,
}

pub async fn run(args: SummarizeArgs) -> Result<()> {
    let file = match args.path {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                tracing::error!("CSV not found: {}", path.display());
                return Err(LedgerError::NoLedgerFound(path).into());
            }
            LedgerFile::from_path(&path)?
        }
        None => {
            let dir = env::current_dir()?;
            match ledger::find_latest(&dir)? {
                Some(file) => file,
                None => {
                    let e = LedgerError::NoLedgerFound(dir);
                    tracing::error!("{}", e);
                    return Err(e.into());
                }
            }
        }
    };

    let rows = ledger::read_rows(&file.path)?;
    let document = summary::aggregate(&rows, file.cutoff_label());

    let out_path = file.path.with_file_name(SUMMARY_FILE_NAME);
    summary::write(&document, &out_path)?;
    tracing::info!("Wrote {}", out_path.display());

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::ledger::{LedgerRow, SolveType};
    use std::fs;

    fn row(submitted_at: &str, problem_id: &str, credits: u32) -> LedgerRow {
        LedgerRow {
            submitted_at: submitted_at.to_string(),
            handle: String::from("alice"),
            contest_name: String::from("Codeforces Round 1000 (Div. 2)"),
            contest_id: 2050,
            contest_link: String::from("https://codeforces.com/contest/2050"),
            contest_start: String::from("2026-01-20 07:35:00 MST"),
            contest_end: String::from("2026-01-20 09:35:00 MST"),
            solve_type: SolveType::Live,
            credits,
            problem_id: problem_id.to_string(),
            problem_title: String::from("Title"),
            problem_link: format!("https://codeforces.com/contest/2050/problem/{}", problem_id),
            remark: String::new(),
        }
    }

    #[tokio::test]
    async fn test_summarize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            row("2026-01-20 08:10:00 MST", "B", 2),
            row("2026-01-20 08:00:00 MST", "B", 2),
            row("2026-01-20 08:05:00 MST", "A", 0),
        ];
        let ledger_path = ledger::write(dir.path(), "20260201T093000", &[], &rows).unwrap();
        let out_path = dir.path().join(SUMMARY_FILE_NAME);

        run(SummarizeArgs {
            path: Some(ledger_path.clone().into_os_string()),
        })
        .await
        .unwrap();
        let first = fs::read_to_string(&out_path).unwrap();

        run(SummarizeArgs {
            path: Some(ledger_path.into_os_string()),
        })
        .await
        .unwrap();
        let second = fs::read_to_string(&out_path).unwrap();

        assert_eq!(first, second);

        let parsed: serde_yaml::Value = serde_yaml::from_str(&first).unwrap();
        assert_eq!(parsed["cutoff_date"].as_str(), Some("2026-02-01 09:30:00 MST"));
        assert_eq!(
            parsed["records_by_handle"]["alice"]["total_credits"].as_u64(),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_missing_ledger_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("codeforces_activity_20260201T093000.csv");

        let error = run(SummarizeArgs {
            path: Some(missing.into_os_string()),
        })
        .await
        .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<LedgerError>(),
            Some(LedgerError::NoLedgerFound(_))
        ));
    }
}
