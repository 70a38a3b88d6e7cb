// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Deduplication of extracted names. The same Wikidata entity can be an
// instance of person, location and organization classes at once, so a
// naive per-type extraction lists it several times. Trumping rules pick
// a single canonical type per entity.

use crate::casefold;
use crate::error::{Error, Result};
use crate::record::{is_entity_id, EntityType, NameRecord};
use crate::script::ScriptAnalyzer;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Canonical type for an entity carrying all of `types`, or None if the
/// combination has no rule (a single type needs none).
pub fn trump(types: &BTreeSet<EntityType>) -> Option<EntityType> {
    use EntityType::*;
    let types: Vec<EntityType> = types.iter().copied().collect();
    match types.as_slice() {
        [Loc, Org] => Some(Loc),      // countries
        [Loc, Org, Per] => Some(Org), // native american tribes
        [Org, Per] => Some(Org),      // mostly manufacturers
        [Loc, Per] => Some(Per),      // J. J. Thomson, Q47285
        _ => None,
    }
}

/// Drops rows for properties and other non-entities.
pub fn drop_non_entities(records: Vec<NameRecord>) -> Vec<NameRecord> {
    records
        .into_iter()
        .filter(|r| is_entity_id(&r.wikidata_id))
        .collect()
}

/// Drops exact duplicate rows, keeping the first occurrence.
pub fn drop_duplicates(records: Vec<NameRecord>) -> Vec<NameRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        if !seen.contains(&r) {
            seen.insert(r.clone());
            out.push(r);
        }
    }
    out
}

/// Rewrites the type of every multi-typed entity to its canonical type,
/// then drops the duplicate rows this creates. Afterwards each entity
/// has exactly one type.
pub fn apply_trumping_rules(records: Vec<NameRecord>) -> Result<Vec<NameRecord>> {
    let mut types: HashMap<&str, BTreeSet<EntityType>> = HashMap::new();
    for r in &records {
        types
            .entry(r.wikidata_id.as_str())
            .or_default()
            .insert(r.entity_type);
    }
    let canonical: HashMap<String, EntityType> = types
        .into_iter()
        .filter(|(_, t)| t.len() > 1)
        .filter_map(|(id, t)| trump(&t).map(|c| (id.to_string(), c)))
        .collect();

    let mut records = records;
    for r in records.iter_mut() {
        if let Some(t) = canonical.get(&r.wikidata_id) {
            r.entity_type = *t;
        }
    }
    let records = drop_duplicates(records);
    check_single_type(&records)?;
    Ok(records)
}

fn check_single_type(records: &[NameRecord]) -> Result<()> {
    let mut types: HashMap<&str, BTreeSet<EntityType>> = HashMap::new();
    for r in records {
        types
            .entry(r.wikidata_id.as_str())
            .or_default()
            .insert(r.entity_type);
    }
    match types.into_iter().find(|(_, t)| t.len() != 1) {
        Some((id, t)) => Err(Error::AmbiguousType {
            id: id.to_string(),
            count: t.len(),
        }),
        None => Ok(()),
    }
}

/// Restricts some languages to a curated list of entity ids. Wikidata
/// labels in Amharic and Tigrinya are dominated by bot-copied Latin
/// strings; only hand-checked entities with non-Latin labels survive.
#[derive(Clone, Debug, Default)]
pub struct KeptIdsFilter {
    languages: HashSet<String>,
    kept_ids: HashSet<String>,
    analyzer: ScriptAnalyzer,
}

impl KeptIdsFilter {
    pub fn new<L, I>(languages: L, kept_ids: I) -> KeptIdsFilter
    where
        L: IntoIterator<Item = String>,
        I: IntoIterator<Item = String>,
    {
        KeptIdsFilter {
            languages: languages.into_iter().collect(),
            kept_ids: kept_ids.into_iter().collect(),
            analyzer: ScriptAnalyzer::default(),
        }
    }

    /// Reads one id per line.
    pub fn load<L>(languages: L, path: &Path) -> Result<KeptIdsFilter>
    where
        L: IntoIterator<Item = String>,
    {
        let reader = BufReader::new(File::open(path)?);
        let mut ids = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let id = line.trim();
            if !id.is_empty() {
                ids.push(id.to_string());
            }
        }
        info!("loaded {} ids to keep from {:?}", ids.len(), path);
        Ok(KeptIdsFilter::new(languages, ids))
    }

    pub fn keep(&self, r: &NameRecord) -> bool {
        if !self.languages.contains(&r.language) {
            return true;
        }
        self.kept_ids.contains(&r.wikidata_id) && !self.analyzer.is_latin(&r.alias)
    }

    pub fn apply(&self, records: Vec<NameRecord>) -> Vec<NameRecord> {
        let before = records.len();
        let out: Vec<NameRecord> = records.into_iter().filter(|r| self.keep(r)).collect();
        info!(
            "restricted-language filtering removed {} of {} rows",
            before - out.len(),
            before
        );
        out
    }
}

/// Merges rows of one entity and language whose aliases differ only in
/// case or spacing; the first spelling wins.
pub fn collapse_casefold_duplicates(records: Vec<NameRecord>) -> Vec<NameRecord> {
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let key = (
                r.wikidata_id.clone(),
                r.language.clone(),
                casefold::fold(&r.language, &r.alias),
            );
            seen.insert(key)
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupOptions {
    /// File with entity ids to keep for `restricted_languages`.
    pub kept_ids: Option<PathBuf>,
    pub restricted_languages: Vec<String>,
    pub casefold: bool,
}

impl DedupOptions {
    pub fn default_restricted_languages() -> Vec<String> {
        vec!["am".to_string(), "ti".to_string()]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub original: usize,
    pub deduplicated: usize,
}

impl DedupReport {
    pub fn removed(&self) -> usize {
        self.original - self.deduplicated
    }
}

pub fn deduplicate(records: Vec<NameRecord>, options: &DedupOptions) -> Result<(Vec<NameRecord>, DedupReport)> {
    let original = records.len();
    let mut records = apply_trumping_rules(drop_non_entities(records))?;
    if let Some(path) = &options.kept_ids {
        let languages = if options.restricted_languages.is_empty() {
            DedupOptions::default_restricted_languages()
        } else {
            options.restricted_languages.clone()
        };
        records = KeptIdsFilter::load(languages, path)?.apply(records);
    }
    if options.casefold {
        records = collapse_casefold_duplicates(records);
    }
    let report = DedupReport {
        original,
        deduplicated: records.len(),
    };
    info!(
        "deduplication complete: {} rows originally, {} deduplicated, {} removed",
        report.original,
        report.deduplicated,
        report.removed()
    );
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use EntityType::*;

    fn rec(id: &str, alias: &str, lang: &str, t: EntityType) -> NameRecord {
        NameRecord::new(id, "eng", alias, lang, t)
    }

    #[test]
    fn trumping_table() {
        let set = |v: &[EntityType]| v.iter().copied().collect::<BTreeSet<_>>();
        assert_eq!(trump(&set(&[Org, Loc])), Some(Loc));
        assert_eq!(trump(&set(&[Per, Org, Loc])), Some(Org));
        assert_eq!(trump(&set(&[Per, Org])), Some(Org));
        assert_eq!(trump(&set(&[Per, Loc])), Some(Per));
        assert_eq!(trump(&set(&[Per])), None);
    }

    #[test]
    fn rewrites_types_and_drops_duplicates() {
        let records = vec![
            rec("Q30", "USA", "en", Loc),
            rec("Q30", "USA", "en", Org),
            rec("Q30", "США", "ru", Org),
            rec("Q47285", "J. J. Thomson", "en", Per),
            rec("Q47285", "J. J. Thomson", "en", Loc),
            rec("Q1", "Solo", "en", Per),
            rec("Q1", "Solo", "en", Per),
        ];
        let out = apply_trumping_rules(records).unwrap();
        assert_eq!(
            out,
            vec![
                rec("Q30", "USA", "en", Loc),
                rec("Q30", "США", "ru", Loc),
                rec("Q47285", "J. J. Thomson", "en", Per),
                rec("Q1", "Solo", "en", Per),
            ]
        );
    }

    #[test]
    fn filters_restricted_languages() {
        let filter = KeptIdsFilter::new(vec!["am".to_string()], vec!["Q1".to_string()]);
        assert!(filter.keep(&rec("Q1", "አዲስ አበባ", "am", Loc)));
        assert!(!filter.keep(&rec("Q1", "Addis Ababa", "am", Loc)));
        assert!(!filter.keep(&rec("Q2", "አዲስ አበባ", "am", Loc)));
        assert!(filter.keep(&rec("Q2", "Addis Ababa", "en", Loc)));
    }

    #[test]
    fn collapses_case_variants() {
        let out = collapse_casefold_duplicates(vec![
            rec("Q1", "New  York", "en", Loc),
            rec("Q1", "new york", "en", Loc),
            rec("Q1", "new york", "de", Loc),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].alias, "New  York");
    }

    #[test]
    fn deduplicates_with_report() {
        let dir = tempfile::tempdir().unwrap();
        let ids = dir.path().join("kept.txt");
        std::fs::write(&ids, "Q1\n\n").unwrap();
        let options = DedupOptions {
            kept_ids: Some(ids),
            ..Default::default()
        };
        let (out, report) = deduplicate(
            vec![
                rec("P31", "instance of", "en", Org),
                rec("Q1", "ኢትዮጵያ", "am", Loc),
                rec("Q1", "ኢትዮጵያ", "am", Org),
                rec("Q2", "ትግራይ", "ti", Loc),
            ],
            &options,
        )
        .unwrap();
        assert_eq!(out, vec![rec("Q1", "ኢትዮጵያ", "am", Loc)]);
        assert_eq!(report, DedupReport { original: 4, deduplicated: 1 });
        assert_eq!(report.removed(), 3);
    }
}
