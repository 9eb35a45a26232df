use std::{env, fmt, fs, path::Path};

pub const API_KEY_VAR: &str = "CF_API_KEY";
pub const API_SECRET_VAR: &str = "CF_API_SECRET";

/// Codeforces API key pair. Loaded once at startup and never re-read.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    fn from_pair(key: &str, secret: &str) -> Option<Self> {
        let (key, secret) = (key.trim(), secret.trim());
        if key.is_empty() || secret.is_empty() {
            None
        } else {
            Some(Self::new(key, secret))
        }
    }

    /// Resolves credentials from `CF_API_KEY`/`CF_API_SECRET`, falling back to a
    /// `key: value` file at `path`. Returns `None` when neither source has both values.
    pub fn load(path: &Path) -> Option<Self> {
        if let Some(credentials) = Self::from_env() {
            tracing::info!("API credentials loaded from environment variables");
            return Some(credentials);
        }

        match fs::read_to_string(path) {
            Ok(text) => {
                let credentials = Self::parse(&text);
                if credentials.is_some() {
                    tracing::info!("API credentials loaded from {}", path.display());
                }
                credentials
            }
            Err(e) => {
                tracing::debug!("couldn't read credential file {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn from_env() -> Option<Self> {
        let key = env::var(API_KEY_VAR).unwrap_or_default();
        let secret = env::var(API_SECRET_VAR).unwrap_or_default();
        Self::from_pair(&key, &secret)
    }

    /// Parses `key: ...` and `secret: ...` lines. Blank lines, `#` comments and lines
    /// without a colon are skipped; keys are case-insensitive.
    pub fn parse(text: &str) -> Option<Self> {
        let mut key = String::new();
        let mut secret = String::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            match name.trim().to_lowercase().as_str() {
                "key" => key = value.trim().to_string(),
                "secret" => secret = value.trim().to_string(),
                _ => {}
            }
        }

        Self::from_pair(&key, &secret)
    }
}
