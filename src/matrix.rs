// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Wide layout: one row per entity, one column per language.

use crate::error::Result;
use crate::record::{is_entity_id, Columns, EntityType, NameRecord};
use crate::table::{Format, RowWriter};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EntityKey {
    id: String,
    entity_type: EntityType,
    eng: String,
}

#[derive(Debug, Default)]
pub struct Matrix {
    languages: BTreeSet<String>,
    index: HashMap<EntityKey, usize>,
    rows: Vec<(EntityKey, HashMap<String, String>)>,
}

impl Matrix {
    pub fn new() -> Matrix {
        Matrix::default()
    }

    /// Adds a name; a later alias for the same entity and language
    /// replaces an earlier one. Non-entity ids are ignored.
    pub fn add(&mut self, r: &NameRecord) {
        if !is_entity_id(&r.wikidata_id) {
            return;
        }
        let key = EntityKey {
            id: r.wikidata_id.clone(),
            entity_type: r.entity_type,
            eng: r.eng.clone(),
        };
        let next = self.rows.len();
        let i = *self.index.entry(key.clone()).or_insert(next);
        if i == next {
            self.rows.push((key, HashMap::new()));
        }
        if !self.languages.contains(&r.language) {
            self.languages.insert(r.language.clone());
        }
        self.rows[i].1.insert(r.language.clone(), r.alias.clone());
    }

    pub fn from_records<'a, I>(records: I) -> Matrix
    where
        I: IntoIterator<Item = &'a NameRecord>,
    {
        let mut m = Matrix::new();
        for r in records {
            m.add(r);
        }
        m
    }

    pub fn num_entities(&self) -> usize {
        self.rows.len()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    pub fn get(&self, id: &str, language: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(k, _)| k.id == id)
            .and_then(|(_, names)| names.get(language))
            .map(String::as_str)
    }

    /// Writes entities in first-seen order; languages are sorted.
    pub fn write(&self, path: &Path, format: Format, columns: &Columns) -> Result<()> {
        let mut header = vec![
            columns.id.clone(),
            columns.eng.clone(),
            columns.entity_type.clone(),
        ];
        header.extend(self.languages.iter().cloned());
        let mut w = RowWriter::create(path, format, header)?;
        for (key, names) in &self.rows {
            let mut row = vec![key.id.as_str(), key.eng.as_str(), key.entity_type.as_str()];
            for lang in &self.languages {
                row.push(names.get(lang).map_or("", String::as_str));
            }
            w.write_row(&row)?;
        }
        w.finish()
    }
}
