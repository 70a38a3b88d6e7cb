// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Subsampling for smaller, less language-imbalanced training sets.

use crate::error::{Error, Result};
use crate::record::NameRecord;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const DEFAULT_SEED: u64 = 1917;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampler {
    /// Rows uniformly, so languages follow the data's distribution.
    Empirical,
    /// Languages uniformly, then rows within each language.
    Uniform,
    /// Languages with probability proportional to p^alpha, as done for
    /// multilingual BERT pretraining.
    ExponentialSmoothing,
}

impl FromStr for Sampler {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "empirical" => Ok(Sampler::Empirical),
            "uniform" => Ok(Sampler::Uniform),
            "exponential_smoothing" => Ok(Sampler::ExponentialSmoothing),
            _ => Err(Error::UnknownOption {
                kind: "sampler",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleOptions {
    pub sampler: Sampler,
    /// None keeps everything.
    pub num_samples: Option<usize>,
    pub seed: u64,
    pub smoothing_factor: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions {
            sampler: Sampler::ExponentialSmoothing,
            num_samples: None,
            seed: DEFAULT_SEED,
            smoothing_factor: 0.7,
        }
    }
}

fn language_counts(records: &[NameRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.language.as_str()).or_default() += 1;
    }
    counts
}

/// Language -> (original share, smoothed share).
pub fn smoothed_proportions(records: &[NameRecord], alpha: f64) -> BTreeMap<String, (f64, f64)> {
    let counts = language_counts(records);
    let total = records.len() as f64;
    let smoothed: BTreeMap<&str, f64> = counts
        .iter()
        .map(|(l, n)| (*l, (*n as f64 / total).powf(alpha)))
        .collect();
    let norm: f64 = smoothed.values().sum();
    counts
        .iter()
        .map(|(l, n)| (l.to_string(), (*n as f64 / total, smoothed[l] / norm)))
        .collect()
}

/// Picks `n` distinct indices with probability proportional to
/// `weights`, using exponential keys (Efraimidis and Spirakis).
fn weighted_indices(rng: &mut StdRng, weights: &[f64], n: usize) -> Vec<usize> {
    let mut keyed: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w > 0.0)
        .map(|(i, w)| {
            let u: f64 = rng.gen_range(f64::EPSILON..1.0);
            (u.ln() / w, i)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.truncate(n);
    let mut picked: Vec<usize> = keyed.into_iter().map(|(_, i)| i).collect();
    picked.sort_unstable();
    picked
}

fn take(records: Vec<NameRecord>, indices: &[usize]) -> Vec<NameRecord> {
    let mut wanted = indices.iter().peekable();
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| {
            if wanted.peek() == Some(&&i) {
                wanted.next();
                Some(r)
            } else {
                None
            }
        })
        .collect()
}

/// Draws a subsample; rows keep their input order.
pub fn subsample(records: Vec<NameRecord>, options: &SampleOptions) -> Vec<NameRecord> {
    let n = match options.num_samples {
        Some(n) if n < records.len() => n,
        _ => return records,
    };
    let mut rng = StdRng::seed_from_u64(options.seed);
    let indices = match options.sampler {
        Sampler::Empirical => {
            let mut picked = rand::seq::index::sample(&mut rng, records.len(), n).into_vec();
            picked.sort_unstable();
            picked
        }
        Sampler::Uniform => {
            let counts = language_counts(&records);
            let langs: Vec<&str> = counts.keys().copied().collect();
            let mut quota: BTreeMap<&str, usize> = BTreeMap::new();
            for _ in 0..n {
                let l = langs[rng.gen_range(0..langs.len())];
                *quota.entry(l).or_default() += 1;
            }
            // Within a language every row weighs the same, and languages
            // with a quota above their size contribute all their rows.
            let mut picked = Vec::new();
            for (lang, q) in quota {
                let rows: Vec<usize> = records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.language == lang)
                    .map(|(i, _)| i)
                    .collect();
                let q = q.min(rows.len());
                for j in rand::seq::index::sample(&mut rng, rows.len(), q) {
                    picked.push(rows[j]);
                }
            }
            picked.sort_unstable();
            picked
        }
        Sampler::ExponentialSmoothing => {
            let props = smoothed_proportions(&records, options.smoothing_factor);
            let counts = language_counts(&records);
            let weights: Vec<f64> = records
                .iter()
                .map(|r| props[&r.language].1 / counts[r.language.as_str()] as f64)
                .collect();
            weighted_indices(&mut rng, &weights, n)
        }
    };
    info!("sampled {} of {} rows", indices.len(), records.len());
    take(records, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityType;

    fn data() -> Vec<NameRecord> {
        let mut v = Vec::new();
        for i in 0..90 {
            v.push(NameRecord::new(&format!("Q{}", i), "x", "x", "en", EntityType::Per));
        }
        for i in 0..10 {
            v.push(NameRecord::new(&format!("Q{}", i), "x", "x", "yo", EntityType::Per));
        }
        v
    }

    fn count(rows: &[NameRecord], lang: &str) -> usize {
        rows.iter().filter(|r| r.language == lang).count()
    }

    #[test]
    fn keeps_everything_without_limit() {
        let options = SampleOptions { num_samples: None, ..Default::default() };
        assert_eq!(subsample(data(), &options).len(), 100);
        let options = SampleOptions { num_samples: Some(500), ..Default::default() };
        assert_eq!(subsample(data(), &options).len(), 100);
    }

    #[test]
    fn samplers_are_deterministic_and_sized() {
        for sampler in [Sampler::Empirical, Sampler::ExponentialSmoothing] {
            let options = SampleOptions {
                sampler,
                num_samples: Some(20),
                ..Default::default()
            };
            let a = subsample(data(), &options);
            assert_eq!(a.len(), 20);
            assert_eq!(a, subsample(data(), &options));
        }
        let options = SampleOptions {
            sampler: Sampler::Uniform,
            num_samples: Some(20),
            ..Default::default()
        };
        let rows = subsample(data(), &options);
        assert!(rows.len() <= 20);
        assert!(count(&rows, "yo") <= 10);
    }

    #[test]
    fn uniform_sampler_balances_languages() {
        let mut rows = Vec::new();
        for (lang, n) in [("en", 900), ("de", 50), ("yo", 50)] {
            for i in 0..n {
                rows.push(NameRecord::new(&format!("Q{}", i), "x", "x", lang, EntityType::Per));
            }
        }
        let options = SampleOptions {
            sampler: Sampler::Uniform,
            num_samples: Some(60),
            ..Default::default()
        };
        let sample = subsample(rows.clone(), &options);
        // No quota exceeds a language's size here, so nothing is lost.
        assert_eq!(sample.len(), 60);
        for lang in ["en", "de", "yo"] {
            let n = count(&sample, lang);
            assert!((5..=35).contains(&n), "{} got {} of 60", lang, n);
        }

        let options = SampleOptions {
            sampler: Sampler::Empirical,
            ..options
        };
        assert!(count(&subsample(rows, &options), "en") > 40);
    }

    #[test]
    fn smoothing_flattens_distribution() {
        let props = smoothed_proportions(&data(), 0.5);
        let (orig, smoothed) = props["yo"];
        assert!((orig - 0.1).abs() < 1e-12);
        assert!(smoothed > orig);
        assert!((props["en"].1 + smoothed - 1.0).abs() < 1e-12);
    }

    #[test]
    fn takes_rows_in_order() {
        let rows = take(data(), &[1, 95]);
        assert_eq!(rows[0].wikidata_id, "Q1");
        assert_eq!(rows[1].language, "yo");
    }
}
