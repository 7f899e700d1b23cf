use bdixdir_base::{err, Error};
use serde::{Deserialize, Serialize};

// Records are identified by a unique integer that never changes once
// assigned; rank is the mutable part that defines display order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub i64);

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerKind {
    #[default]
    Bdix,
    NonBdix,
}

impl ServerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Bdix => "bdix",
            ServerKind::NonBdix => "non-bdix",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bdix" => Some(ServerKind::Bdix),
            "non-bdix" | "nonbdix" | "non_bdix" => Some(ServerKind::NonBdix),
            _ => None,
        }
    }
}

impl std::str::FromStr for ServerKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        ServerKind::parse(s).ok_or_else(|| err(format!("unknown server type: {:?}", s)))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerStatus {
    #[default]
    Active,
    Inactive,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Active => "active",
            ServerStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(ServerStatus::Active),
            "inactive" => Some(ServerStatus::Inactive),
            _ => None,
        }
    }
}

impl std::str::FromStr for ServerStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        ServerStatus::parse(s).ok_or_else(|| err(format!("unknown server status: {:?}", s)))
    }
}

/// Locally recorded health of a server, accumulated from probe samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Performance {
    pub uptime_percent: f64,
    pub avg_response_time_ms: Option<f64>,
    pub sample_count: u64,
    /// Samples that reported a response time; the weight of
    /// `avg_response_time_ms`.
    pub response_count: u64,
}

/// One probe result, folded into a record's [`Performance`] by
/// [`crate::RankManager::record_sample`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeSample {
    pub reachable: bool,
    pub response_ms: Option<f64>,
}

impl Performance {
    pub(crate) fn fold_sample(&mut self, sample: &ProbeSample) {
        let n = self.sample_count as f64;
        let up = if sample.reachable { 100.0 } else { 0.0 };
        self.uptime_percent = (self.uptime_percent * n + up) / (n + 1.0);
        if let Some(ms) = sample.response_ms.filter(|ms| ms.is_finite() && *ms >= 0.0) {
            // Averages saved without a count weigh as one sample.
            let k = match self.avg_response_time_ms {
                Some(_) => self.response_count.max(1),
                None => 0,
            };
            let avg = self.avg_response_time_ms.unwrap_or(0.0);
            self.avg_response_time_ms = Some((avg * k as f64 + ms) / (k + 1) as f64);
            self.response_count = k + 1;
        }
        self.sample_count += 1;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: ServerId,
    pub name: String,
    pub address: String,
    /// Never empty once a record is inside a collection; the first entry
    /// is the primary category.
    pub categories: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ServerKind,
    pub status: ServerStatus,
    pub rank: i64,
    pub performance: Performance,
}

impl ServerRecord {
    pub fn primary_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Everything needed to create a record; id and rank are assigned by the
/// manager on insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewServer {
    pub name: String,
    pub address: String,
    pub categories: Vec<String>,
    pub kind: ServerKind,
    pub status: ServerStatus,
}

/// Trims, drops empties and collapses duplicates keeping the first
/// occurrence. Falls back to `fallback` if nothing is left.
pub fn normalize_categories(categories: Vec<String>, fallback: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(categories.len());
    for c in categories {
        let c = c.trim();
        if !c.is_empty() && !out.iter().any(|o| o == c) {
            out.push(c.to_string());
        }
    }
    if out.is_empty() {
        out.push(fallback.to_string());
    }
    out
}

/// The subset selector a view, move or commit operates against.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub const ALL: &'static str = "all";

    pub fn matches(&self, rec: &ServerRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => rec.in_category(c),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == Self::ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s.to_string())
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "{}", Self::ALL),
            CategoryFilter::Only(c) => write!(f, "{}", c),
        }
    }
}
