// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Name standardization. Many labels put the family name first
// ("Biden, Joe") or carry disambiguation in parentheses
// ("Paris (mythology)"); the processors here bring them into the
// order and shape of the English label.

use crate::casefold;
use crate::error::{Error, Result};
use crate::record::{EntityType, NameRecord};
use crate::table::{Format, RowWriter};
use deunicode::deunicode;
use itertools::Itertools;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

const MIN_TOKENS: usize = 2;
const MAX_TOKENS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permuter {
    RemoveParenthesis,
    Comma,
    EditDistance,
    RemoveParenthesisPermuteComma,
    RemoveParenthesisEditDistance,
}

impl Permuter {
    pub const NAMES: [&'static str; 5] = [
        "remove_parenthesis",
        "comma",
        "edit_distance",
        "remove_parenthesis_permute_comma",
        "remove_parenthesis_edit_distance",
    ];

    /// Standardizes `alias`, in `language`, against the English `eng`.
    pub fn process(self, alias: &str, language: &str, eng: &str) -> String {
        match self {
            Permuter::RemoveParenthesis => remove_parenthesis(alias),
            Permuter::Comma => permute_first_comma(alias),
            Permuter::EditDistance => permute_lowest_distance(alias, language, eng),
            Permuter::RemoveParenthesisPermuteComma => {
                permute_first_comma(&remove_parenthesis(alias))
                    .trim_matches(',')
                    .to_string()
            }
            Permuter::RemoveParenthesisEditDistance => {
                permute_lowest_distance(&remove_parenthesis(alias), language, eng)
            }
        }
    }
}

impl FromStr for Permuter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "remove_parenthesis" => Ok(Permuter::RemoveParenthesis),
            "comma" => Ok(Permuter::Comma),
            "edit_distance" => Ok(Permuter::EditDistance),
            "remove_parenthesis_permute_comma" => Ok(Permuter::RemoveParenthesisPermuteComma),
            "remove_parenthesis_edit_distance" => Ok(Permuter::RemoveParenthesisEditDistance),
            _ => Err(Error::UnknownOption {
                kind: "permuter",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permuter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = match self {
            Permuter::RemoveParenthesis => 0,
            Permuter::Comma => 1,
            Permuter::EditDistance => 2,
            Permuter::RemoveParenthesisPermuteComma => 3,
            Permuter::RemoveParenthesisEditDistance => 4,
        };
        f.write_str(Permuter::NAMES[i])
    }
}

pub fn remove_parenthesis(name: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\(.*\)").expect("valid regex"));
    re.replace_all(name, "").trim().to_string()
}

/// "Biden, Joe" -> "Joe Biden". Names without a comma are unchanged.
pub fn permute_first_comma(name: &str) -> String {
    match name.split_once(',') {
        None => name.to_string(),
        Some((head, tail)) => format!("{} {}", tail, head)
            .trim_matches(',')
            .trim()
            .to_string(),
    }
}

/// Edit distance in characters, not bytes.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Reorders the tokens of a 2-4 token name into the permutation closest
/// to the English name. Tokens are romanized before measuring, so names
/// in other scripts are compared on their Latin spelling. The original
/// order wins ties.
pub fn permute_lowest_distance(name: &str, language: &str, eng: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if !(MIN_TOKENS..=MAX_TOKENS).contains(&tokens.len()) {
        return name.to_string();
    }
    let romanized: Vec<String> = tokens.iter().map(|t| deunicode(t)).collect();
    let target = casefold::fold("en", eng);
    let mut best = name.to_string();
    let mut best_distance = usize::MAX;
    for perm in (0..tokens.len()).permutations(tokens.len()) {
        let roman = perm.iter().map(|&i| romanized[i].as_str()).join(" ");
        let d = levenshtein(&casefold::fold(language, roman.trim_matches(',')), &target);
        if d < best_distance {
            best_distance = d;
            best = perm.iter().map(|&i| tokens[i]).join(" ");
        }
    }
    best.trim_matches(',').trim().to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameOptions {
    pub permuter: Permuter,
    /// Only rows of these types are touched.
    pub types: Vec<EntityType>,
}

impl Default for NameOptions {
    fn default() -> Self {
        NameOptions {
            permuter: Permuter::RemoveParenthesisPermuteComma,
            types: vec![EntityType::Per],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameStats {
    pub total: usize,
    pub permuted: usize,
    pub surviving: usize,
}

/// Standardizes aliases in place and drops rows whose alias became
/// empty. Returns per-language statistics.
pub fn standardize_names(
    records: Vec<NameRecord>,
    options: &NameOptions,
) -> (Vec<NameRecord>, BTreeMap<String, NameStats>) {
    let mut stats: BTreeMap<String, NameStats> = BTreeMap::new();
    let mut out = Vec::with_capacity(records.len());
    for mut r in records {
        let s = stats.entry(r.language.clone()).or_default();
        s.total += 1;
        if options.types.contains(&r.entity_type) {
            let processed = options.permuter.process(&r.alias, &r.language, &r.eng);
            if processed != r.alias {
                debug!("[{}] {} => {}", r.eng, r.alias, processed);
                s.permuted += 1;
                r.alias = processed;
            }
        }
        if !r.alias.is_empty() {
            s.surviving += 1;
            out.push(r);
        }
    }
    let permuted: usize = stats.values().map(|s| s.permuted).sum();
    info!(
        "standardized names with {}: {} changed, {} of {} rows kept",
        options.permuter,
        permuted,
        out.len(),
        stats.values().map(|s| s.total).sum::<usize>()
    );
    (out, stats)
}

/// Reads a JSON object mapping language codes to readable names.
pub fn load_language_names(path: &Path) -> Result<HashMap<String, String>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn write_stats(
    path: &Path,
    stats: &BTreeMap<String, NameStats>,
    language_names: &HashMap<String, String>,
) -> Result<()> {
    let header = ["language", "total", "total_permuted", "total_surviving"];
    let mut w = RowWriter::create(
        path,
        Format::Tsv,
        header.iter().map(|h| h.to_string()).collect(),
    )?;
    for (lang, s) in stats {
        let name = language_names.get(lang).unwrap_or(lang);
        w.write_row(&[
            name.clone(),
            s.total.to_string(),
            s.permuted.to_string(),
            s.surviving.to_string(),
        ])?;
    }
    w.finish()
}
