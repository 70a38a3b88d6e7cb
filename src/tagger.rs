// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Script standardization: names whose writing system does not fit their
// language ("Joe Biden" labelled as Russian) are tagged as anomalous by
// several independent heuristics, and the votes are aggregated.

use crate::error::{Error, Result};
use crate::record::NameRecord;
use crate::script::{self, Histogram, ScriptAnalyzer, HAN, HIRAGANA, KATAKANA};
use crossbeam_channel::{bounded, unbounded};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use std::thread;

/// A name with its script statistics computed once.
#[derive(Debug)]
pub struct Name<'a> {
    pub text: &'a str,
    pub language: &'a str,
    pub histogram: Histogram,
    pub most_common_script: Option<&'static str>,
}

impl<'a> Name<'a> {
    pub fn new(analyzer: &ScriptAnalyzer, text: &'a str, language: &'a str) -> Name<'a> {
        Name {
            text,
            language,
            histogram: analyzer.histogram(text),
            most_common_script: analyzer.most_common_script(text),
        }
    }
}

/// One voter. `Some(true)` means anomalous, `None` abstains.
pub trait Tagger: Send + Sync {
    fn classify(&self, name: &Name) -> Option<bool>;
}

/// Anomalous if the name's dominant script is not the language's.
pub struct IncorrectScriptTagger {
    pub expected: Option<&'static str>,
}

impl Tagger for IncorrectScriptTagger {
    fn classify(&self, name: &Name) -> Option<bool> {
        self.expected.map(|e| name.most_common_script != Some(e))
    }
}

/// Anomalous if the name has no character at all in the language's script.
pub struct MissingScriptTagger {
    pub missing: Option<&'static str>,
}

impl Tagger for MissingScriptTagger {
    fn classify(&self, name: &Name) -> Option<bool> {
        self.missing.map(|m| !name.histogram.contains_key(m))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMeasure {
    JensenShannon,
    KullbackLeibler,
}

impl DistanceMeasure {
    pub fn distance(self, p: &Histogram, q: &Histogram) -> f64 {
        match self {
            DistanceMeasure::JensenShannon => script::jensen_shannon(p, q),
            DistanceMeasure::KullbackLeibler => script::kullback_leibler(p, q),
        }
    }
}

/// Anomalous if the name's script distribution is at least
/// `critical_value` away from the language's pooled distribution.
pub struct DivergenceTagger {
    pub prototype: Histogram,
    pub critical_value: f64,
    pub measure: DistanceMeasure,
}

impl Tagger for DivergenceTagger {
    fn classify(&self, name: &Name) -> Option<bool> {
        Some(self.measure.distance(&name.histogram, &self.prototype) >= self.critical_value)
    }
}

fn is_chinese_or_japanese(language: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(ja|zh|lzh|wuu)").expect("valid regex"));
    re.is_match(language)
}

/// Japanese names must contain kana; Chinese ones must not.
/// Abstains on every other language.
pub struct KanaTagger;

impl Tagger for KanaTagger {
    fn classify(&self, name: &Name) -> Option<bool> {
        if !is_chinese_or_japanese(name.language) {
            return None;
        }
        let kana = name.histogram.contains_key(HIRAGANA) || name.histogram.contains_key(KATAKANA);
        Some(if name.language == "ja" { !kana } else { kana })
    }
}

/// Chinese and Japanese names must contain Han characters.
pub struct CjkTagger;

impl Tagger for CjkTagger {
    fn classify(&self, name: &Name) -> Option<bool> {
        if !is_chinese_or_japanese(name.language) {
            return None;
        }
        Some(!name.histogram.contains_key(HAN))
    }
}

/// How the votes of several taggers are combined, or `Baseline` for a
/// fixed table of allowed scripts per language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteMethod {
    Baseline,
    All,
    Any,
    MajorityVote,
    None,
}

impl VoteMethod {
    /// Aggregates non-abstaining votes. With no votes, nothing is anomalous.
    pub fn aggregate(self, votes: &[Option<bool>]) -> bool {
        let cast: Vec<bool> = votes.iter().flatten().copied().collect();
        if cast.is_empty() {
            return false;
        }
        let yes = cast.iter().filter(|v| **v).count();
        match self {
            VoteMethod::All => yes == cast.len(),
            VoteMethod::Any => yes > 0,
            VoteMethod::MajorityVote => 2 * yes > cast.len(),
            VoteMethod::None | VoteMethod::Baseline => false,
        }
    }
}

impl FromStr for VoteMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baseline" => Ok(VoteMethod::Baseline),
            "all" => Ok(VoteMethod::All),
            "any" => Ok(VoteMethod::Any),
            "majority_vote" => Ok(VoteMethod::MajorityVote),
            "none" => Ok(VoteMethod::None),
            _ => Err(Error::UnknownOption {
                kind: "vote aggregation method",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteMethod::Baseline => "baseline",
            VoteMethod::All => "all",
            VoteMethod::Any => "any",
            VoteMethod::MajorityVote => "majority_vote",
            VoteMethod::None => "none",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    pub method: VoteMethod,
    pub critical_value: f64,
    pub measure: DistanceMeasure,
    pub num_workers: usize,
    /// Allowed scripts per language, required by `VoteMethod::Baseline`.
    pub scripts_file: Option<std::path::PathBuf>,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        ScriptOptions {
            method: VoteMethod::MajorityVote,
            critical_value: 0.1,
            measure: DistanceMeasure::JensenShannon,
            num_workers: 2,
            scripts_file: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LanguageReport {
    pub language: String,
    pub script: Option<&'static str>,
    pub total: usize,
    pub filtered: usize,
}

/// Names of one language, split into kept and filtered.
struct Tagged {
    kept: Vec<NameRecord>,
    filtered: Vec<NameRecord>,
    report: LanguageReport,
}

/// The script most names of a language are written in; ties go to the
/// alphabetically first script.
pub fn dominant_script(names: &[Name]) -> Option<&'static str> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for s in names.iter().filter_map(|n| n.most_common_script) {
        *counts.entry(s).or_default() += 1;
    }
    let mut best: Option<(&'static str, usize)> = None;
    for (s, n) in counts {
        if best.map_or(true, |(_, m)| n > m) {
            best = Some((s, n));
        }
    }
    best.map(|(s, _)| s)
}

fn tag_language(language: String, records: Vec<NameRecord>, options: &ScriptOptions) -> Tagged {
    let analyzer = ScriptAnalyzer::default();
    let names: Vec<Name> = records
        .iter()
        .map(|r| Name::new(&analyzer, &r.alias, &r.language))
        .collect();
    let dominant = dominant_script(&names);
    let pooled: String = records.iter().map(|r| r.alias.as_str()).collect();
    let taggers: Vec<Box<dyn Tagger>> = vec![
        Box::new(IncorrectScriptTagger { expected: dominant }),
        Box::new(MissingScriptTagger { missing: dominant }),
        Box::new(DivergenceTagger {
            prototype: analyzer.histogram(&pooled),
            critical_value: options.critical_value,
            measure: options.measure,
        }),
        Box::new(KanaTagger),
        Box::new(CjkTagger),
    ];
    let anomalous: Vec<bool> = names
        .iter()
        .map(|n| {
            let votes: Vec<Option<bool>> = taggers.iter().map(|t| t.classify(n)).collect();
            options.method.aggregate(&votes)
        })
        .collect();

    let total = records.len();
    let mut kept = Vec::new();
    let mut filtered = Vec::new();
    for (r, bad) in records.into_iter().zip(anomalous) {
        if bad {
            debug!("[{}] anomalous: {}", language, r.alias);
            filtered.push(r);
        } else {
            kept.push(r);
        }
    }
    let report = LanguageReport {
        language,
        script: dominant,
        total,
        filtered: filtered.len(),
    };
    Tagged { kept, filtered, report }
}

fn group_by_language(records: Vec<NameRecord>) -> BTreeMap<String, Vec<NameRecord>> {
    let mut groups: BTreeMap<String, Vec<NameRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.language.clone()).or_default().push(r);
    }
    groups
}

/// Tags every language independently on `num_workers` threads. Output
/// is ordered by language, then by input order.
pub fn standardize_script(
    records: Vec<NameRecord>,
    options: &ScriptOptions,
) -> (Vec<NameRecord>, Vec<NameRecord>, Vec<LanguageReport>) {
    let groups = group_by_language(records);
    let num_workers = options.num_workers.max(1).min(groups.len().max(1));
    let (job_tx, job_rx) = bounded::<(String, Vec<NameRecord>)>(num_workers * 2);
    let (result_tx, result_rx) = unbounded::<Tagged>();

    let mut results: BTreeMap<String, Tagged> = BTreeMap::new();
    thread::scope(|s| {
        for _ in 0..num_workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            s.spawn(move || {
                for (language, records) in job_rx {
                    let tagged = tag_language(language, records, options);
                    if result_tx.send(tagged).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);
        drop(job_rx);
        for job in groups {
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);
        for tagged in result_rx.iter() {
            info!(
                "[{}] filtered {} of {} names (script {})",
                tagged.report.language,
                tagged.report.filtered,
                tagged.report.total,
                tagged.report.script.unwrap_or("-")
            );
            results.insert(tagged.report.language.clone(), tagged);
        }
    });

    let mut kept = Vec::new();
    let mut filtered = Vec::new();
    let mut reports = Vec::new();
    for (_, t) in results {
        kept.extend(t.kept);
        filtered.extend(t.filtered);
        reports.push(t.report);
    }
    (kept, filtered, reports)
}

/// Allowed scripts per language, for the baseline method.
#[derive(Clone, Debug, Default)]
pub struct AllowedScripts {
    scripts: HashMap<String, HashSet<String>>,
}

impl AllowedScripts {
    pub fn new() -> AllowedScripts {
        AllowedScripts::default()
    }

    pub fn allow(&mut self, language: &str, scripts: &str) {
        let set = self.scripts.entry(language.to_string()).or_default();
        for s in scripts.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            set.insert(s.to_lowercase());
        }
    }

    /// Reads a TSV with columns `language_code` and `scripts_to_keep`,
    /// the latter a comma-separated list such as "Latin, Cyrillic".
    pub fn load(path: &Path) -> Result<AllowedScripts> {
        let mut rdr = csv::ReaderBuilder::new().delimiter(b'\t').from_path(path)?;
        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        let (lang_idx, scripts_idx) = (find("language_code")?, find("scripts_to_keep")?);
        let mut allowed = AllowedScripts::new();
        for rec in rdr.records() {
            let rec = rec?;
            if let (Some(lang), Some(scripts)) = (rec.get(lang_idx), rec.get(scripts_idx)) {
                allowed.allow(lang, scripts);
            }
        }
        Ok(allowed)
    }

    /// Languages without an entry accept any name.
    pub fn is_valid(&self, analyzer: &ScriptAnalyzer, name: &str, language: &str) -> bool {
        match self.scripts.get(language) {
            None => true,
            Some(allowed) => analyzer
                .most_common_script(name)
                .map_or(false, |s| allowed.contains(&s.to_lowercase())),
        }
    }
}

pub fn baseline_standardization(
    records: Vec<NameRecord>,
    allowed: &AllowedScripts,
) -> (Vec<NameRecord>, Vec<NameRecord>) {
    let analyzer = ScriptAnalyzer::default();
    let total = records.len();
    let (valid, filtered): (Vec<NameRecord>, Vec<NameRecord>) = records
        .into_iter()
        .partition(|r| allowed.is_valid(&analyzer, &r.alias, &r.language));
    info!("no. of valid rows: {} / {}", valid.len(), total);
    (valid, filtered)
}

/// Runs whichever method `options` selects and returns kept and
/// filtered rows.
pub fn run(records: Vec<NameRecord>, options: &ScriptOptions) -> Result<(Vec<NameRecord>, Vec<NameRecord>)> {
    match options.method {
        VoteMethod::Baseline => {
            let path = options
                .scripts_file
                .as_deref()
                .ok_or(Error::MissingOption("scripts file for the baseline method"))?;
            let allowed = AllowedScripts::load(path)?;
            Ok(baseline_standardization(records, &allowed))
        }
        VoteMethod::None => Ok((records, Vec::new())),
        _ => {
            let (kept, filtered, _) = standardize_script(records, options);
            Ok((kept, filtered))
        }
    }
}
