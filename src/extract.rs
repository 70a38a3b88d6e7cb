// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Turns dump entities into name rows: one row per (entity, language)
// label, for every entity that is an instance of a PER, LOC or ORG class.

use crate::dump::Entity;
use crate::error::Result;
use crate::record::{EntityType, NameRecord};
use crate::subclass::SubclassIndex;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub types: Vec<EntityType>,
    /// Empty means every language.
    pub languages: Vec<String>,
    /// Only emit labels in `languages`, instead of every label of an
    /// entity that has at least one of them.
    pub strict: bool,
    /// Empty means every entity.
    pub ids: Vec<String>,
    /// Stop after this many matching entities.
    pub limit: Option<u64>,
    /// Also emit the entity's aliases, not just its labels.
    pub include_aliases: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            types: EntityType::ALL.to_vec(),
            languages: Vec::new(),
            strict: false,
            ids: Vec::new(),
            limit: None,
            include_aliases: false,
        }
    }
}

/// Splits "en,de" into languages; "" and "-" mean all languages.
pub fn parse_languages(s: &str) -> Vec<String> {
    if s == "-" {
        return Vec::new();
    }
    s.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub entities: u64,
    pub matched: u64,
    pub rows: u64,
}

pub struct Extractor {
    index: SubclassIndex,
    options: ExtractOptions,
    languages: HashSet<String>,
    ids: HashSet<String>,
    report: ExtractReport,
}

impl Extractor {
    pub fn new(mut index: SubclassIndex, options: ExtractOptions) -> Extractor {
        index.restrict(&options.types);
        Extractor {
            languages: options.languages.iter().cloned().collect(),
            ids: options.ids.iter().cloned().collect(),
            index,
            options,
            report: ExtractReport::default(),
        }
    }

    pub fn report(&self) -> ExtractReport {
        self.report
    }

    pub fn done(&self) -> bool {
        self.options.limit.map_or(false, |l| self.report.matched >= l)
    }

    fn wants_language(&self, lang: &str) -> bool {
        self.languages.is_empty() || self.languages.contains(lang)
    }

    /// Rows for one entity, or none if it does not match.
    pub fn extract(&mut self, entity: &Entity) -> Vec<NameRecord> {
        self.report.entities += 1;
        if self.done() || (!self.ids.is_empty() && !self.ids.contains(&entity.id)) {
            return Vec::new();
        }
        let types = self.index.types_of(entity.instance_of());
        if types.is_empty() {
            return Vec::new();
        }
        if !self.languages.is_empty() && !entity.languages().any(|l| self.languages.contains(l)) {
            return Vec::new();
        }
        self.report.matched += 1;

        let eng = entity.english_name();
        let mut names: Vec<(&str, &str)> = Vec::new();
        for (lang, term) in &entity.labels {
            names.push((lang.as_str(), term.value.as_str()));
        }
        if self.options.include_aliases {
            let mut seen: BTreeSet<(&str, &str)> = names.iter().copied().collect();
            for (lang, terms) in &entity.aliases {
                for term in terms {
                    let name = (lang.as_str(), term.value.as_str());
                    if seen.insert(name) {
                        names.push(name);
                    }
                }
            }
        }

        let mut rows = Vec::new();
        for t in types {
            for (lang, alias) in &names {
                if self.options.strict && !self.wants_language(lang) {
                    continue;
                }
                rows.push(NameRecord::new(&entity.id, eng, alias, lang, t));
            }
        }
        self.report.rows += rows.len() as u64;
        rows
    }

    /// Runs over a whole dump, handing rows to `sink`.
    pub fn run<I, F>(&mut self, entities: I, mut sink: F) -> Result<ExtractReport>
    where
        I: IntoIterator<Item = Result<Entity>>,
        F: FnMut(NameRecord) -> Result<()>,
    {
        for entity in entities {
            if self.done() {
                break;
            }
            for row in self.extract(&entity?) {
                sink(row)?;
            }
        }
        let r = self.report;
        info!(
            "scanned {} entities, {} matched, {} rows",
            r.entities, r.matched, r.rows
        );
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::tests::SAMPLE;
    use crate::dump::DumpReader;
    use std::io::Cursor;

    fn entities() -> Vec<Entity> {
        DumpReader::new(Cursor::new(SAMPLE)).map(|e| e.unwrap()).collect()
    }

    #[test]
    fn parses_language_lists() {
        assert_eq!(parse_languages("en, de"), vec!["en", "de"]);
        assert!(parse_languages("-").is_empty());
        assert!(parse_languages("").is_empty());
    }

    #[test]
    fn extracts_labels_of_matching_entities() {
        let mut ex = Extractor::new(SubclassIndex::roots_only(), ExtractOptions::default());
        let mut rows = Vec::new();
        for e in entities() {
            rows.extend(ex.extract(&e));
        }
        assert_eq!(
            rows,
            vec![
                NameRecord::new("Q1", "Joe Biden", "Joe Biden", "en", EntityType::Per),
                NameRecord::new("Q1", "Joe Biden", "Джо Байден", "ru", EntityType::Per),
            ]
        );
        assert_eq!(ex.report(), ExtractReport { entities: 3, matched: 1, rows: 2 });
    }

    #[test]
    fn strict_language_filter_and_aliases() {
        let options = ExtractOptions {
            languages: vec!["en".to_string()],
            strict: true,
            include_aliases: true,
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        let rows: Vec<String> = entities()
            .iter()
            .flat_map(|e| ex.extract(e))
            .map(|r| r.alias)
            .collect();
        assert_eq!(rows, vec!["Joe Biden", "Joseph Biden"]);
    }

    #[test]
    fn language_filter_without_match_skips_entity() {
        let options = ExtractOptions {
            languages: vec!["fr".to_string()],
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        assert!(entities().iter().all(|e| ex.extract(e).is_empty()));
    }

    #[test]
    fn type_and_limit_filters() {
        let options = ExtractOptions {
            types: vec![EntityType::Loc],
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        assert!(entities().iter().all(|e| ex.extract(e).is_empty()));

        let options = ExtractOptions {
            limit: Some(0),
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        let report = ex
            .run(DumpReader::new(Cursor::new(SAMPLE)), |_| Ok(()))
            .unwrap();
        assert_eq!(report.rows, 0);
    }

    #[test]
    fn id_filter() {
        let options = ExtractOptions {
            ids: vec!["Q1".to_string()],
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        let ids: Vec<String> = entities()
            .iter()
            .flat_map(|e| ex.extract(e))
            .map(|r| r.wikidata_id)
            .collect();
        assert_eq!(ids, vec!["Q1", "Q1"]);

        let options = ExtractOptions {
            ids: vec!["Q2".to_string(), "Q100".to_string()],
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        assert!(entities().iter().all(|e| ex.extract(e).is_empty()));
        assert_eq!(ex.report().matched, 0);
    }

    #[test]
    fn limit_stops_partway() {
        let dump: String = ["Q7", "Q8", "Q9"]
            .iter()
            .map(|id| {
                format!(
                    r#"{{"id":"{}","labels":{{"en":{{"value":"{} name"}}}},"claims":{{"P31":[{{"mainsnak":{{"datavalue":{{"value":{{"id":"Q5"}}}}}}}}]}}}},"#,
                    id, id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let options = ExtractOptions {
            limit: Some(2),
            ..Default::default()
        };
        let mut ex = Extractor::new(SubclassIndex::roots_only(), options);
        let mut rows = Vec::new();
        let report = ex
            .run(DumpReader::new(Cursor::new(dump)), |r| {
                rows.push(r.wikidata_id);
                Ok(())
            })
            .unwrap();
        assert_eq!(rows, vec!["Q7", "Q8"]);
        assert_eq!(report, ExtractReport { entities: 2, matched: 2, rows: 2 });
        assert!(ex.done());
    }
}
