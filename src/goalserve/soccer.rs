//! Wire format of the soccer feed (`soccernew`).
//!
//! Attribute-style keys carry an `@` prefix. Every field is text, whatever it
//! holds; parsing into numbers and dates happens in the normalizer.

use serde::Deserialize;
use serde_json::Value;

use super::shape::{default_on_null, lenient_string, raw_list};

/// A league/competition and the matches listed under it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoccerCategoryDto {
    #[serde(rename = "@id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "@gid", default, deserialize_with = "lenient_string")]
    pub gid: String,
    #[serde(rename = "@name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "default_on_null")]
    pub matches: SoccerMatchesDto,
}

/// `{"match": ...}` wrapper; one match arrives as a bare object.
///
/// Matches are decoded into `SoccerMatchDto` one at a time by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoccerMatchesDto {
    #[serde(rename = "match", default, deserialize_with = "raw_list")]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoccerMatchDto {
    #[serde(rename = "@id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "@date", default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "@formatted_date", default, deserialize_with = "lenient_string")]
    pub formatted_date: String,
    #[serde(rename = "@time", default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(rename = "@status", default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "default_on_null")]
    pub localteam: SoccerTeamDto,
    #[serde(default, deserialize_with = "default_on_null")]
    pub visitorteam: SoccerTeamDto,
    #[serde(default, deserialize_with = "default_on_null")]
    pub ht: SoccerScoreDto,
    #[serde(default, deserialize_with = "default_on_null")]
    pub ft: SoccerScoreDto,
    /// Null, `{"event": ...}`, a bare event or an array; resolved by the normalizer.
    #[serde(default)]
    pub events: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoccerTeamDto {
    #[serde(rename = "@id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "@name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "@goals", default, deserialize_with = "lenient_string")]
    pub goals: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoccerScoreDto {
    #[serde(rename = "@score", default, deserialize_with = "lenient_string")]
    pub score: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoccerEventDto {
    #[serde(rename = "@type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(rename = "@team", default, deserialize_with = "lenient_string")]
    pub team: String,
    #[serde(rename = "@player", default, deserialize_with = "lenient_string")]
    pub player: String,
    #[serde(
        rename = "@time",
        alias = "@minute",
        default,
        deserialize_with = "lenient_string"
    )]
    pub minute: String,
}
