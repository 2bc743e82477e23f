//! Wire format of the basketball feed (`bsktbl`).
//!
//! Plain keys (no `@` prefix) and a flatter shape than soccer: `match` sits
//! directly on the category.

use serde::Deserialize;
use serde_json::Value;

use super::shape::{default_on_null, lenient_string, raw_list};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BasketballCategoryDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_group: String,
    /// Raw `BasketballMatchDto`s, decoded one at a time.
    #[serde(rename = "match", default, deserialize_with = "raw_list")]
    pub matches: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BasketballMatchDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timer: String,
    #[serde(default, deserialize_with = "default_on_null")]
    pub localteam: BasketballTeamDto,
    #[serde(default, deserialize_with = "default_on_null")]
    pub awayteam: BasketballTeamDto,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BasketballTeamDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub totalscore: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub q1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub q2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub q3: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub q4: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ot: String,
}
