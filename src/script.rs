// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Unicode script statistics of names.

use std::collections::{BTreeMap, BTreeSet};
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_script::{Script, UnicodeScript};

pub const LATIN: &str = "Latin";
pub const HAN: &str = "Han";
pub const HIRAGANA: &str = "Hiragana";
pub const KATAKANA: &str = "Katakana";

/// Script name -> count, or share of the name when normalized.
pub type Histogram = BTreeMap<&'static str, f64>;

/// Script of `c`, or None for characters shared between scripts
/// (spaces, digits, most punctuation, combining marks).
pub fn script_of(c: char) -> Option<&'static str> {
    match c.script() {
        Script::Common | Script::Inherited | Script::Unknown => None,
        s => Some(s.full_name()),
    }
}

fn is_punctuation_or_symbol(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        ConnectorPunctuation
            | DashPunctuation
            | OpenPunctuation
            | ClosePunctuation
            | InitialPunctuation
            | FinalPunctuation
            | OtherPunctuation
            | MathSymbol
            | CurrencySymbol
            | ModifierSymbol
            | OtherSymbol
    )
}

fn is_number(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        DecimalNumber | LetterNumber | OtherNumber
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptAnalyzer {
    pub strip: bool,
    pub ignore_punctuation: bool,
    pub ignore_numbers: bool,
    pub normalize: bool,
}

impl Default for ScriptAnalyzer {
    fn default() -> Self {
        ScriptAnalyzer {
            strip: true,
            ignore_punctuation: true,
            ignore_numbers: true,
            normalize: true,
        }
    }
}

impl ScriptAnalyzer {
    fn chars<'a>(&self, word: &'a str) -> impl Iterator<Item = char> + 'a {
        let word = if self.strip { word.trim() } else { word };
        let (punct, num) = (self.ignore_punctuation, self.ignore_numbers);
        word.chars()
            .filter(move |&c| !(punct && is_punctuation_or_symbol(c)))
            .filter(move |&c| !(num && is_number(c)))
    }

    /// Scripts in order of first appearance, with their counts.
    fn counts(&self, word: &str) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for script in self.chars(word).filter_map(script_of) {
            match counts.iter_mut().find(|(s, _)| *s == script) {
                Some((_, n)) => *n += 1,
                None => counts.push((script, 1)),
            }
        }
        counts
    }

    pub fn histogram(&self, word: &str) -> Histogram {
        let counts = self.counts(word);
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        counts
            .into_iter()
            .map(|(s, n)| {
                let v = if self.normalize {
                    n as f64 / total as f64
                } else {
                    n as f64
                };
                (s, v)
            })
            .collect()
    }

    /// Most frequent script; ties go to the script seen first.
    pub fn most_common_script(&self, word: &str) -> Option<&'static str> {
        let mut best: Option<(&'static str, usize)> = None;
        for (s, n) in self.counts(word) {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((s, n));
            }
        }
        best.map(|(s, _)| s)
    }

    pub fn is_latin(&self, word: &str) -> bool {
        self.most_common_script(word) == Some(LATIN)
    }
}

fn normalized(h: &Histogram) -> Histogram {
    let total: f64 = h.values().sum();
    if total <= 0.0 {
        return Histogram::new();
    }
    h.iter().map(|(k, v)| (*k, v / total)).collect()
}

pub fn kullback_leibler(p: &Histogram, q: &Histogram) -> f64 {
    let (p, q) = (normalized(p), normalized(q));
    let mut d = 0.0;
    for (k, pv) in &p {
        if *pv <= 0.0 {
            continue;
        }
        match q.get(k) {
            Some(qv) if *qv > 0.0 => d += pv * (pv / qv).ln(),
            _ => return f64::INFINITY,
        }
    }
    d
}

/// Jensen-Shannon divergence in nats, between 0 and ln 2.
pub fn jensen_shannon(p: &Histogram, q: &Histogram) -> f64 {
    let (p, q) = (normalized(p), normalized(q));
    let keys: BTreeSet<&&str> = p.keys().chain(q.keys()).collect();
    let mut d = 0.0;
    for k in keys {
        let pv = p.get(*k).copied().unwrap_or(0.0);
        let qv = q.get(*k).copied().unwrap_or(0.0);
        let m = (pv + qv) / 2.0;
        if pv > 0.0 {
            d += pv * (pv / m).ln() / 2.0;
        }
        if qv > 0.0 {
            d += qv * (qv / m).ln() / 2.0;
        }
    }
    d.max(0.0)
}

/// Shannon entropy in nats of a distribution given by raw counts.
pub fn entropy<I: IntoIterator<Item = usize>>(counts: I) -> f64 {
    let counts: Vec<usize> = counts.into_iter().filter(|&n| n > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.ln()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_most_common_script() {
        let a = ScriptAnalyzer::default();
        assert_eq!(a.most_common_script("Джо Байден"), Some("Cyrillic"));
        assert_eq!(a.most_common_script("Joe Biden (2021)"), Some(LATIN));
        assert_eq!(a.most_common_script("東京タワー"), Some(HAN));
        assert_eq!(a.most_common_script(" 123 !"), None);
        // Tie: first seen wins.
        assert_eq!(a.most_common_script("ab日本"), Some(LATIN));
        assert!(a.is_latin("Addis Ababa"));
        assert!(!a.is_latin("አዲስ አበባ"));
    }

    #[test]
    fn builds_histograms() {
        let a = ScriptAnalyzer::default();
        let h = a.histogram("abc日");
        assert_eq!(h.len(), 2);
        assert!((h[LATIN] - 0.75).abs() < 1e-9);
        assert!((h[HAN] - 0.25).abs() < 1e-9);

        let raw = ScriptAnalyzer { normalize: false, ..a };
        assert_eq!(raw.histogram("abc日")[LATIN], 3.0);
    }

    #[test]
    fn numbers_count_when_not_ignored() {
        let a = ScriptAnalyzer { ignore_numbers: false, ..Default::default() };
        // Digits are Common script and never make it into a histogram.
        assert_eq!(a.histogram("R2D2").len(), 1);
    }

    #[test]
    fn divergences() {
        let p: Histogram = [(LATIN, 1.0)].into_iter().collect();
        let q: Histogram = [(HAN, 1.0)].into_iter().collect();
        let pq: Histogram = [(LATIN, 0.5), (HAN, 0.5)].into_iter().collect();
        assert!(jensen_shannon(&p, &p).abs() < 1e-12);
        assert!((jensen_shannon(&p, &q) - std::f64::consts::LN_2).abs() < 1e-12);
        let half = jensen_shannon(&p, &pq);
        assert!(half > 0.0 && half < std::f64::consts::LN_2);
        assert!((jensen_shannon(&p, &pq) - jensen_shannon(&pq, &p)).abs() < 1e-12);
        assert!(kullback_leibler(&p, &q).is_infinite());
        assert!((kullback_leibler(&p, &pq) - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn computes_entropy() {
        assert_eq!(entropy([5]), 0.0);
        assert!((entropy([1, 1]) - std::f64::consts::LN_2).abs() < 1e-12);
        assert_eq!(entropy(Vec::new()), 0.0);
    }
}
