// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Per-language summary tables.

use crate::error::Result;
use crate::record::{EntityType, NameRecord};
use crate::script::{self, ScriptAnalyzer};
use crate::table::{Format, RowWriter};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Language -> number of names per type, in `EntityType::ALL` order.
pub fn type_counts(records: &[NameRecord]) -> BTreeMap<String, [usize; 3]> {
    let mut counts: BTreeMap<String, [usize; 3]> = BTreeMap::new();
    for r in records {
        let slot = EntityType::ALL
            .iter()
            .position(|t| *t == r.entity_type)
            .unwrap_or_default();
        counts.entry(r.language.clone()).or_default()[slot] += 1;
    }
    counts
}

/// Entropy of the distribution of dominant scripts among the names of
/// each language. Names without any script-specific character are left
/// out.
pub fn script_entropy(records: &[NameRecord]) -> BTreeMap<String, f64> {
    let analyzer = ScriptAnalyzer::default();
    let mut per_lang: BTreeMap<String, HashMap<&'static str, usize>> = BTreeMap::new();
    for r in records {
        let scripts = per_lang.entry(r.language.clone()).or_default();
        if let Some(s) = analyzer.most_common_script(&r.alias) {
            *scripts.entry(s).or_default() += 1;
        }
    }
    per_lang
        .into_iter()
        .map(|(lang, scripts)| (lang, script::entropy(scripts.into_values())))
        .collect()
}

/// Share of names per language that are identical to the English name.
pub fn english_match(records: &[NameRecord]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for r in records {
        let c = counts.entry(r.language.clone()).or_default();
        c.1 += 1;
        if r.alias == r.eng {
            c.0 += 1;
        }
    }
    counts
        .into_iter()
        .map(|(lang, (same, total))| (lang, same as f64 / total as f64))
        .collect()
}

pub fn write_type_counts(path: &Path, format: Format, counts: &BTreeMap<String, [usize; 3]>) -> Result<()> {
    let mut header = vec!["language".to_string()];
    header.extend(EntityType::ALL.iter().map(|t| t.to_string()));
    header.push("total".to_string());
    let mut w = RowWriter::create(path, format, header)?;
    for (lang, c) in counts {
        let mut row = vec![lang.clone()];
        row.extend(c.iter().map(|n| n.to_string()));
        row.push(c.iter().sum::<usize>().to_string());
        w.write_row(&row)?;
    }
    w.finish()
}

/// Writes "language_code<sep>column" with values rounded to `decimals`.
pub fn write_per_language(
    path: &Path,
    format: Format,
    column: &str,
    values: &BTreeMap<String, f64>,
    decimals: usize,
) -> Result<()> {
    let header = vec!["language_code".to_string(), column.to_string()];
    let mut w = RowWriter::create(path, format, header)?;
    for (lang, v) in values {
        w.write_row(&[lang.clone(), format!("{:.*}", decimals, v)])?;
    }
    w.finish()
}
