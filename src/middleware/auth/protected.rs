//! Path prefixes that require a verified bearer token.
//!
//! A prefix `/api` covers `/api` itself and everything below `/api/`,
//! but not `/apix`. Built once at startup and never mutated.

use crate::config::DEFAULT_PROTECTED_PREFIXES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoutes {
    prefixes: Vec<String>,
}

impl Default for ProtectedRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_PREFIXES)
    }
}

impl ProtectedRoutes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|p| normalize(p.as_ref()))
            .collect();

        Self { prefixes }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            // "/" normalizes to "" and covers every path
            match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        })
    }
}

fn normalize(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.is_empty() {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
