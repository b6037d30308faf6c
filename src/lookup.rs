use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A listed security
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Listing code (e.g. "005930")
    pub code: String,
    /// Display name
    pub name: String,
}

impl Listing {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Result of resolving a free-text name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Name matched exactly
    Exact(Listing),
    /// No exact match; names containing the keyword, sorted by name
    Candidates(Vec<Listing>),
    NotFound,
    /// Blank keyword
    EmptyQuery,
}

/// Resolve a keyword against the listing table
pub fn search(listings: &[Listing], keyword: &str) -> LookupOutcome {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return LookupOutcome::EmptyQuery;
    }

    if let Some(exact) = listings.iter().find(|l| l.name == keyword) {
        return LookupOutcome::Exact(exact.clone());
    }

    let mut candidates: Vec<Listing> = listings.iter()
        .filter(|l| l.name.contains(keyword))
        .cloned()
        .collect();

    if candidates.is_empty() {
        return LookupOutcome::NotFound;
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
    LookupOutcome::Candidates(candidates)
}

/// Load the listing table from a JSON array
pub fn load_listings<P: AsRef<Path>>(path: P) -> Result<Vec<Listing>> {
    let contents = std::fs::read_to_string(path)?;
    let listings: Vec<Listing> = serde_json::from_str(&contents)?;
    Ok(listings)
}
