//! Data models representing database entities and normalized feed records.
//!
//! - `api_key`: stored credentials used by the tenant gateway
//! - `soccer` / `basketball`: normalized match records, their stored rows and API responses

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// API key authentication model
pub mod api_key;
/// Basketball match records and responses
pub mod basketball;
/// Soccer match records and responses
pub mod soccer;

use basketball::{BasketballMatchRecord, BasketballVolatile};
use soccer::{SoccerMatchRecord, SoccerVolatile};

/// Sports served by this system.
///
/// Each sport has its own upstream feed path, its own storage table and its
/// own API scope name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Soccer,
    Basketball,
}

impl Sport {
    pub const ALL: [Sport; 2] = [Sport::Soccer, Sport::Basketball];

    /// Scope name used in credentials and URL paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Sport::Soccer => "soccer",
            Sport::Basketball => "basketball",
        }
    }

    /// Path segment of the upstream feed for this sport.
    pub fn feed_path(self) -> &'static str {
        match self {
            Sport::Soccer => "soccernew",
            Sport::Basketball => "bsktbl",
        }
    }

    /// Upstream status codes that mean the match is in progress.
    pub fn live_statuses(self) -> &'static [&'static str] {
        match self {
            Sport::Soccer => &["1H", "HT", "2H", "ET", "P", "Live", "In Play"],
            Sport::Basketball => &["Q1", "Q2", "Q3", "Q4", "OT", "HT", "Live", "In Play"],
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "soccer" => Ok(Sport::Soccer),
            "basketball" => Ok(Sport::Basketball),
            other => Err(format!(
                "unknown sport '{other}' (expected soccer or basketball)"
            )),
        }
    }
}

/// League identity carried by every match record.
///
/// Ids are denormalized display fields: unparsable upstream ids become 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, sqlx::FromRow)]
pub struct LeagueInfo {
    pub id: i64,
    pub gid: i64,
    pub name: String,
}

/// A normalized upstream match, ready to be reconciled against storage.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRecord {
    Soccer(SoccerMatchRecord),
    Basketball(BasketballMatchRecord),
}

impl MatchRecord {
    pub fn sport(&self) -> Sport {
        match self {
            MatchRecord::Soccer(_) => Sport::Soccer,
            MatchRecord::Basketball(_) => Sport::Basketball,
        }
    }

    /// Upstream-assigned natural key.
    pub fn match_id(&self) -> i64 {
        match self {
            MatchRecord::Soccer(record) => record.match_id,
            MatchRecord::Basketball(record) => record.match_id,
        }
    }

    /// Fields that change while a match is played.
    ///
    /// Identity fields (league, teams, scheduled start) are deliberately absent:
    /// they are written once on insert and never on update.
    pub fn volatile_fields(&self) -> VolatileFields {
        match self {
            MatchRecord::Soccer(record) => VolatileFields::Soccer(record.volatile()),
            MatchRecord::Basketball(record) => VolatileFields::Basketball(record.volatile()),
        }
    }

    /// Short "home vs away" label for log lines.
    pub fn fixture_label(&self) -> String {
        match self {
            MatchRecord::Soccer(record) => format!("{} vs {}", record.home.name, record.away.name),
            MatchRecord::Basketball(record) => {
                format!("{} vs {}", record.home.name, record.away.name)
            }
        }
    }
}

/// Volatile subset of a match record written on update.
#[derive(Debug, Clone, PartialEq)]
pub enum VolatileFields {
    Soccer(SoccerVolatile),
    Basketball(BasketballVolatile),
}

/// A stored match located by its upstream id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredMatch {
    /// Storage-assigned primary key.
    pub id: i64,
    pub match_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_parses_case_insensitively() {
        assert_eq!("Soccer".parse::<Sport>().unwrap(), Sport::Soccer);
        assert_eq!(" basketball ".parse::<Sport>().unwrap(), Sport::Basketball);
        assert!("hockey".parse::<Sport>().is_err());
    }

    #[test]
    fn feed_paths_match_upstream_layout() {
        assert_eq!(Sport::Soccer.feed_path(), "soccernew");
        assert_eq!(Sport::Basketball.feed_path(), "bsktbl");
    }
}
