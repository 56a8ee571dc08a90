//! `.env` file loading.
//!
//! Each useful line has the form `NAME=value`: the name starts with a letter and
//! continues with letters, digits or underscores, the value has no whitespace. Comments,
//! blank lines and anything else are skipped. Variables already present in the process
//! environment are never overwritten.

use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// File read when no other path is configured.
pub const DEFAULT_ENV_FILE: &str = ".env";

#[allow(clippy::expect_used)]
static LINE_MATCHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[a-zA-Z][a-zA-Z0-9_]+)=(?P<value>\S+)$").expect("valid .env line regex")
});

/// Parse `NAME=value` pairs out of `.env` style text without touching the environment.
#[must_use]
pub fn parse_env(source: &str) -> Vec<(String, String)> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let caps = LINE_MATCHER.captures(line)?;
            Some((caps["name"].to_owned(), caps["value"].to_owned()))
        })
        .collect()
}

/// Apply the variables in `path` to the process environment.
///
/// Returns how many variables were set. Must run during start-up, before other threads
/// read the environment.
pub fn load_environment(path: impl AsRef<Path>) -> io::Result<usize> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let mut applied = 0;
    for (name, value) in parse_env(&source) {
        if env::var_os(&name).is_some() {
            debug!(name = %name, "Environment variable already set; keeping existing value");
            continue;
        }
        env::set_var(&name, &value);
        applied += 1;
    }
    debug!(path = %path.display(), applied, "Environment file loaded");
    Ok(applied)
}
