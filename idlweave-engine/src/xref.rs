//! Cross-reference collaborator
//!
//!     Names that neither the host, the registry nor the WebIDL builtins can resolve are
//!     looked up in an external cross-reference database. Lookups are the only async part
//!     of a build:
//!
//!         unresolved names ─┬─► XrefProvider::lookup (one per distinct query, concurrent)
//!                           └─► tokio::time::timeout per lookup
//!                                   │
//!                                   ▼
//!                              XrefTable  (Resolved | Ambiguous | Missing)
//!
//!     The table is complete before any block is rendered, so rendering and validation
//!     stay synchronous. A failed or timed-out lookup is recorded as missing and the name
//!     renders unlinked.
//!
//!     When a provider returns several candidates, those defined by one of the block's
//!     cited specifications are preferred. If more than one distinct URL remains, the
//!     answer is ambiguous and reported instead of guessed.

use crate::error::XrefError;
use crate::resolver::ReferenceKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Kinds an external entry may have to be linked from a type position.
const TYPE_KINDS: &[&str] = &[
    "interface",
    "dictionary",
    "enum",
    "typedef",
    "callback",
    "namespace",
    "exception",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XrefQuery {
    pub term: String,
    pub kind: ReferenceKind,
    /// Preferred specifications, from the block's citation hints.
    pub specs: Vec<String>,
}

impl XrefQuery {
    pub fn new(term: impl Into<String>, kind: ReferenceKind, specs: &[String]) -> Self {
        Self {
            term: term.into(),
            kind,
            specs: specs.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XrefEntry {
    pub url: String,
    /// Short name of the defining specification, e.g. `dom`.
    #[serde(default)]
    pub spec: String,
    #[serde(default)]
    pub spec_title: String,
    /// Kind of the definition, e.g. `interface` or `dictionary`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl XrefEntry {
    pub fn new(url: impl Into<String>, spec: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            spec: spec.into(),
            spec_title: String::new(),
            kind: kind.into(),
        }
    }

    fn matches(&self, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::Type => TYPE_KINDS.contains(&self.kind.as_str()),
            ReferenceKind::Name => !TYPE_KINDS.contains(&self.kind.as_str()),
        }
    }
}

pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<XrefEntry>, XrefError>> + Send + 'a>>;

/// An external cross-reference service.
pub trait XrefProvider: Send + Sync + 'static {
    /// All candidates for the query. Narrowing by citation hints is done by the caller.
    fn lookup(&self, query: XrefQuery) -> LookupFuture<'_>;
}

/// In-memory database, keyed by term.
#[derive(Debug, Clone, Default)]
pub struct StaticXrefDatabase {
    entries: Arc<HashMap<String, Vec<XrefEntry>>>,
}

impl StaticXrefDatabase {
    pub fn new(entries: HashMap<String, Vec<XrefEntry>>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Load `{ "term": [ { "url", "spec", "spec_title", "type" } ] }`.
    pub fn from_json(json: &str) -> Result<Self, XrefError> {
        let entries: HashMap<String, Vec<XrefEntry>> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl XrefProvider for StaticXrefDatabase {
    fn lookup(&self, query: XrefQuery) -> LookupFuture<'_> {
        Box::pin(async move {
            Ok(self
                .entries
                .get(&query.term)
                .map(|entries| {
                    entries
                        .iter()
                        .filter(|entry| entry.matches(query.kind))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XrefOutcome {
    Resolved(XrefEntry),
    Ambiguous(Vec<XrefEntry>),
    Missing,
}

/// Prefer candidates from the cited specifications, then drop repeated URLs.
pub fn narrow(candidates: Vec<XrefEntry>, specs: &[String]) -> Vec<XrefEntry> {
    let cited: Vec<XrefEntry> = candidates
        .iter()
        .filter(|entry| specs.iter().any(|spec| spec.eq_ignore_ascii_case(&entry.spec)))
        .cloned()
        .collect();
    let preferred = if cited.is_empty() { candidates } else { cited };

    let mut seen = HashSet::new();
    preferred
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .collect()
}

/// Settled answers to every lookup of one build.
#[derive(Debug, Default)]
pub struct XrefTable {
    outcomes: HashMap<XrefQuery, XrefOutcome>,
    failures: Vec<(XrefQuery, XrefError)>,
}

impl XrefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the candidates returned for a query.
    pub fn record(&mut self, query: XrefQuery, candidates: Vec<XrefEntry>) {
        let mut narrowed = narrow(candidates, &query.specs);
        let outcome = match narrowed.len() {
            0 => XrefOutcome::Missing,
            1 => XrefOutcome::Resolved(narrowed.remove(0)),
            _ => {
                warn!(term = %query.term, candidates = narrowed.len(), "ambiguous cross-reference");
                XrefOutcome::Ambiguous(narrowed)
            }
        };
        self.outcomes.insert(query, outcome);
    }

    pub fn record_failure(&mut self, query: XrefQuery, error: XrefError) {
        warn!(term = %query.term, %error, "cross-reference lookup failed");
        self.outcomes.insert(query.clone(), XrefOutcome::Missing);
        self.failures.push((query, error));
    }

    pub fn outcome(&self, query: &XrefQuery) -> Option<&XrefOutcome> {
        self.outcomes.get(query)
    }

    /// The single entry a query resolved to.
    pub fn get(&self, query: &XrefQuery) -> Option<&XrefEntry> {
        match self.outcomes.get(query) {
            Some(XrefOutcome::Resolved(entry)) => Some(entry),
            _ => None,
        }
    }

    pub fn ambiguities(&self) -> Vec<(&XrefQuery, &[XrefEntry])> {
        let mut ambiguous: Vec<(&XrefQuery, &[XrefEntry])> = self
            .outcomes
            .iter()
            .filter_map(|(query, outcome)| match outcome {
                XrefOutcome::Ambiguous(entries) => Some((query, entries.as_slice())),
                _ => None,
            })
            .collect();
        ambiguous.sort_by(|a, b| a.0.cmp(b.0));
        ambiguous
    }

    pub fn failures(&self) -> &[(XrefQuery, XrefError)] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Run every distinct query concurrently and wait for all of them to settle.
pub async fn prefetch<I>(provider: Arc<dyn XrefProvider>, queries: I, limit: Duration) -> XrefTable
where
    I: IntoIterator<Item = XrefQuery>,
{
    let distinct: HashSet<XrefQuery> = queries.into_iter().collect();
    let mut table = XrefTable::new();
    if distinct.is_empty() {
        return table;
    }
    debug!(queries = distinct.len(), "prefetching cross-references");

    let mut lookups = JoinSet::new();
    for query in distinct {
        let provider = Arc::clone(&provider);
        lookups.spawn(async move {
            let answer = match tokio::time::timeout(limit, provider.lookup(query.clone())).await {
                Ok(answer) => answer,
                Err(_) => Err(XrefError::Timeout(limit)),
            };
            (query, answer)
        });
    }

    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((query, Ok(candidates))) => table.record(query, candidates),
            Ok((query, Err(error))) => table.record_failure(query, error),
            Err(error) => warn!(%error, "cross-reference lookup task did not complete"),
        }
    }
    table
}
