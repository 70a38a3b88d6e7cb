// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// The row schema shared by every step of the pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse entity category, named after the CoNLL tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "LOC")]
    Loc,
    #[serde(rename = "ORG")]
    Org,
    #[serde(rename = "PER")]
    Per,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Loc, EntityType::Org, EntityType::Per];

    /// Root Wikidata class whose instances (and instances of its
    /// subclasses) carry this type.
    pub fn wikidata_class(self) -> &'static str {
        match self {
            EntityType::Per => "Q5",      // human
            EntityType::Loc => "Q82794",  // geographic region
            EntityType::Org => "Q43229",  // organization
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Loc => "LOC",
            EntityType::Org => "ORG",
            EntityType::Per => "PER",
        }
    }

    /// Parses a comma-separated list such as "PER,LOC".
    pub fn parse_list(s: &str) -> Result<Vec<EntityType>> {
        let mut types = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let t: EntityType = part.parse()?;
            if !types.contains(&t) {
                types.push(t);
            }
        }
        Ok(types)
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PER" => Ok(EntityType::Per),
            "LOC" => Ok(EntityType::Loc),
            "ORG" => Ok(EntityType::Org),
            _ => Err(Error::UnknownEntityType(s.to_string())),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameRecord {
    pub wikidata_id: String,
    pub eng: String,
    pub alias: String,
    pub language: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

impl NameRecord {
    pub fn new(id: &str, eng: &str, alias: &str, language: &str, t: EntityType) -> NameRecord {
        NameRecord {
            wikidata_id: id.to_string(),
            eng: eng.to_string(),
            alias: alias.to_string(),
            language: language.to_string(),
            entity_type: t,
        }
    }
}

/// Rows for properties ("P123") or lexemes are not entities.
pub fn is_entity_id(id: &str) -> bool {
    id.starts_with('Q')
}

/// Header names for the five fields of a `NameRecord`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub id: String,
    pub eng: String,
    pub alias: String,
    pub language: String,
    pub entity_type: String,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            id: "wikidata_id".to_string(),
            eng: "eng".to_string(),
            alias: "alias".to_string(),
            language: "language".to_string(),
            entity_type: "type".to_string(),
        }
    }
}

impl Columns {
    pub fn header(&self) -> [&str; 5] {
        [
            &self.id,
            &self.eng,
            &self.alias,
            &self.language,
            &self.entity_type,
        ]
    }

    /// Position of each field within `header`, in `Columns::header` order.
    pub fn locate<'a, I>(&self, header: I) -> Result<[usize; 5]>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = header.into_iter().collect();
        let mut out = [0usize; 5];
        for (slot, wanted) in out.iter_mut().zip(self.header()) {
            *slot = names
                .iter()
                .position(|n| n.trim_start_matches('\u{feff}') == wanted)
                .ok_or_else(|| Error::MissingColumn(wanted.to_string()))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_types() {
        assert_eq!("PER".parse::<EntityType>().unwrap(), EntityType::Per);
        assert!("MISC".parse::<EntityType>().is_err());
        assert_eq!(
            EntityType::parse_list("PER, LOC,PER").unwrap(),
            vec![EntityType::Per, EntityType::Loc]
        );
    }

    #[test]
    fn sorts_alphabetically() {
        let mut v = vec![EntityType::Per, EntityType::Loc, EntityType::Org];
        v.sort();
        assert_eq!(v, EntityType::ALL.to_vec());
    }

    #[test]
    fn entity_ids() {
        assert!(is_entity_id("Q42"));
        assert!(!is_entity_id("P31"));
        assert!(!is_entity_id(""));
    }

    #[test]
    fn locates_columns() {
        let cols = Columns::default();
        let idx = cols
            .locate(vec!["language", "extra", "wikidata_id", "alias", "type", "eng"])
            .unwrap();
        assert_eq!(idx, [2, 5, 3, 0, 4]);
        assert!(cols.locate(vec!["wikidata_id"]).is_err());
    }
}
