use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeSet, path::Path};

static PROFILE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(www\.)?codeforces\.com/profile/").unwrap());

/// Turns a handle or a profile URL into a bare handle.
pub fn clean_handle(raw: &str) -> String {
    let handle = raw.trim().replace("http://", "").replace("https://", "");
    PROFILE_PREFIX
        .replace(&handle, "")
        .trim_matches('/')
        .to_string()
}

/// Reads the handle column of the roster CSV, deduplicated and sorted.
pub fn load_handles(path: &Path, column: &str) -> Result<BTreeSet<String>> {
    let mut reader = csv::Reader::from_path(path).with_context(|| {
        let message = format!("failed to open roster file {}", path.display());
        tracing::error!(message);
        message
    })?;

    let index = reader
        .headers()?
        .iter()
        .position(|name| name == column)
        .with_context(|| {
            let message = format!("roster {} has no `{}` column", path.display(), column);
            tracing::error!(message);
            message
        })?;

    let mut handles = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        let handle = clean_handle(record.get(index).unwrap_or_default());
        if !handle.is_empty() {
            handles.insert(handle);
        }
    }

    tracing::info!("{} handles loaded from {}", handles.len(), path.display());
    Ok(handles)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_clean_handle() {
        assert_eq!(clean_handle("  tourist "), "tourist");
        assert_eq!(clean_handle("https://codeforces.com/profile/Benq"), "Benq");
        assert_eq!(clean_handle("http://www.codeforces.com/profile/jiangly/"), "jiangly");
        assert_eq!(clean_handle("codeforces.com/profile/Um_nik"), "Um_nik");
        assert_eq!(clean_handle(""), "");
    }

    #[test]
    fn test_load_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        fs::write(
            &path,
            "Name,Codeforces Handle\n\
             Alice,https://codeforces.com/profile/alice\n\
             Bob,bob\n\
             Carol,\n\
             Alice again,alice\n",
        )
        .unwrap();

        let handles = load_handles(&path, "Codeforces Handle").unwrap();
        assert_eq!(
            handles.into_iter().collect::<Vec<_>>(),
            vec![String::from("alice"), String::from("bob")]
        );
    }

    #[test]
    fn test_load_handles_without_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        fs::write(&path, "Name,Email\nAlice,alice@example.com\n").unwrap();

        assert!(load_handles(&path, "Codeforces Handle").is_err());
        assert!(load_handles(&dir.path().join("missing.csv"), "Codeforces Handle").is_err());
    }
}
