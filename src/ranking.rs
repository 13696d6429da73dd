use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which upstream ranking to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RankingKind {
    Popular,
    #[default]
    TopRated,
}

impl RankingKind {
    pub const ALL: [RankingKind; 2] = [RankingKind::Popular, RankingKind::TopRated];

    /// Path suffix appended to the catalog base endpoint.
    pub fn path(self) -> &'static str {
        match self {
            RankingKind::Popular => "/movie/popular",
            RankingKind::TopRated => "/movie/top_rated",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankingKind::Popular => "popular",
            RankingKind::TopRated => "top_rated",
        }
    }
}

impl fmt::Display for RankingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ranking kind: {0}")]
pub struct UnknownRanking(pub String);

impl FromStr for RankingKind {
    type Err = UnknownRanking;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "popular" => Ok(RankingKind::Popular),
            "top_rated" | "toprated" => Ok(RankingKind::TopRated),
            _ => Err(UnknownRanking(s.to_string())),
        }
    }
}
