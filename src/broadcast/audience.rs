//! Audience resolution
//!
//! Turns a group's raw `servers` list into the set of recipients it
//! broadcasts to. Resolution happens once, when the group is built; servers
//! registered later are not picked up until the group is rebuilt.

use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

use crate::host::{BackendServer, ServerLookup};

/// Entry that selects every player on the proxy
pub const GLOBAL: &str = "global";

/// Largest number a range bound may hold
pub const MAX_RANGE_BOUND: u32 = i32::MAX as u32;

/// Most server names a single range entry may expand to
pub const MAX_RANGE_SPAN: u64 = 10_000;

/// `<prefix>{<low>-<high>}`, matched from the start of the entry
static RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\{(\d+)-(\d+)\}").expect("Invalid regex pattern"));

/// Who a group broadcasts to
#[derive(Clone)]
pub enum Audience {
    /// Every player connected to the proxy
    Everyone,

    /// Players on these servers, in configured order
    Servers(Vec<Arc<dyn BackendServer>>),
}

impl Audience {
    /// Resolve raw server entries against the registry
    ///
    /// Any entry equal to `global` (ignoring case) wins over everything else.
    /// Range entries expand to one name per number, inclusive; a reversed
    /// range expands to nothing. Names the registry does not know are
    /// dropped. Duplicates are kept. A range that fails [`ServerRange::parse`]
    /// contributes nothing.
    pub fn resolve<S, L>(entries: &[S], lookup: &L) -> Self
    where
        S: AsRef<str>,
        L: ServerLookup + ?Sized,
    {
        if is_global(entries) {
            return Self::Everyone;
        }

        let mut servers = Vec::new();
        for entry in entries {
            let entry = entry.as_ref();
            match ServerRange::parse(entry) {
                Some(Ok(range)) => {
                    servers.extend(range.names().filter_map(|name| lookup.server(&name)));
                }
                Some(Err(e)) => tracing::warn!(error = %e, "Skipping server range"),
                None => servers.extend(lookup.server(entry)),
            }
        }

        tracing::trace!(
            entries = entries.len(),
            resolved = servers.len(),
            "Resolved audience"
        );
        Self::Servers(servers)
    }

    /// True when the audience is a server list with nothing in it
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Everyone => false,
            Self::Servers(servers) => servers.is_empty(),
        }
    }

    /// Names of the resolved servers, empty for [`Audience::Everyone`]
    pub fn server_names(&self) -> Vec<String> {
        match self {
            Self::Everyone => Vec::new(),
            Self::Servers(servers) => servers.iter().map(|s| s.name().to_string()).collect(),
        }
    }
}

impl fmt::Debug for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everyone => f.write_str("Everyone"),
            Self::Servers(_) => f.debug_tuple("Servers").field(&self.server_names()).finish(),
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everyone => f.write_str(GLOBAL),
            Self::Servers(_) => write!(f, "[{}]", self.server_names().join(", ")),
        }
    }
}

/// True when any entry selects the whole proxy
pub fn is_global<S: AsRef<str>>(entries: &[S]) -> bool {
    entries
        .iter()
        .any(|entry| entry.as_ref().eq_ignore_ascii_case(GLOBAL))
}

/// A range entry that cannot be expanded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("range bound in '{entry}' is larger than {max}", max = MAX_RANGE_BOUND)]
    BoundTooLarge { entry: String },

    #[error("range '{entry}' spans {span} servers, more than {max}", max = MAX_RANGE_SPAN)]
    TooWide { entry: String, span: u64 },
}

/// A `name{low-high}` server entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRange {
    prefix: String,
    low: u32,
    high: u32,
}

impl ServerRange {
    /// Parse a range entry
    ///
    /// Returns `None` when the entry is not shaped like a range, so the
    /// caller looks it up as a literal name.
    pub fn parse(entry: &str) -> Option<Result<Self, RangeError>> {
        let captures = RANGE_PATTERN.captures(entry)?;
        Some(Self::from_parts(entry, &captures[1], &captures[2], &captures[3]))
    }

    fn from_parts(entry: &str, prefix: &str, low: &str, high: &str) -> Result<Self, RangeError> {
        let bound = |digits: &str| {
            digits
                .parse::<u32>()
                .ok()
                .filter(|n| *n <= MAX_RANGE_BOUND)
                .ok_or_else(|| RangeError::BoundTooLarge {
                    entry: entry.to_string(),
                })
        };

        let range = Self {
            prefix: prefix.to_string(),
            low: bound(low)?,
            high: bound(high)?,
        };
        let span = range.span();
        if span > MAX_RANGE_SPAN {
            return Err(RangeError::TooWide {
                entry: entry.to_string(),
                span,
            });
        }
        Ok(range)
    }

    /// Number of names the range expands to, zero when reversed
    pub fn span(&self) -> u64 {
        if self.high < self.low {
            0
        } else {
            u64::from(self.high - self.low) + 1
        }
    }

    /// Expanded names in ascending order, produced on demand
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        (self.low..=self.high).map(move |n| format!("{}{n}", self.prefix))
    }
}
