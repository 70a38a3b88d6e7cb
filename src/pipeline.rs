// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// The whole extraction in one process, driven by a JSON config:
// dump -> extract -> deduplicate -> standardize scripts -> standardize
// names -> write, then optionally reshape the result.

use crate::dedup::{self, DedupOptions, DedupReport};
use crate::dump::DumpReader;
use crate::error::Result;
use crate::extract::{ExtractOptions, ExtractReport, Extractor};
use crate::matrix::Matrix;
use crate::names::{self, NameOptions};
use crate::record::Columns;
use crate::separate::separate;
use crate::subclass::SubclassIndex;
use crate::table::{self, Format};
use crate::tagger::{self, ScriptOptions};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub dump: PathBuf,
    /// Precomputed class index; without it, classes are computed from
    /// the dump in an extra pass when `compute_subclasses` is set, and
    /// only the root classes are used otherwise.
    #[serde(default)]
    pub subclasses: Option<PathBuf>,
    #[serde(default)]
    pub compute_subclasses: bool,
    #[serde(default)]
    pub extract: ExtractOptions,
    #[serde(default)]
    pub dedup: DedupOptions,
    /// Skipped when absent.
    #[serde(default)]
    pub script: Option<ScriptOptions>,
    /// Skipped when absent.
    #[serde(default)]
    pub names: Option<NameOptions>,
    #[serde(default)]
    pub columns: Columns,
    pub output: PathBuf,
    #[serde(default)]
    pub format: Option<Format>,
    /// Where names removed by script standardization go.
    #[serde(default)]
    pub filtered_output: Option<PathBuf>,
    #[serde(default)]
    pub separate_by_language: bool,
    #[serde(default)]
    pub separate_by_type: bool,
    #[serde(default)]
    pub matrix: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<PipelineConfig> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub extract: ExtractReport,
    pub decode_errors: u64,
    pub dedup: DedupReport,
    pub script_filtered: usize,
    pub rows_written: usize,
}

fn subclass_index(config: &PipelineConfig) -> Result<SubclassIndex> {
    if let Some(path) = &config.subclasses {
        return SubclassIndex::load(path);
    }
    if config.compute_subclasses {
        info!("computing subclass index from {:?}", config.dump);
        return SubclassIndex::from_entities(DumpReader::open(&config.dump)?, &config.extract.types);
    }
    Ok(SubclassIndex::roots_only())
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    let format = Format::resolve(&config.output, config.format)?;
    let mut summary = PipelineSummary::default();

    let index = subclass_index(config)?;
    let mut extractor = Extractor::new(index, config.extract.clone());
    let mut reader = DumpReader::open(&config.dump)?;
    let mut records = Vec::new();
    summary.extract = extractor.run(reader.by_ref(), |r| {
        records.push(r);
        Ok(())
    })?;
    summary.decode_errors = reader.decode_errors();

    let (records, report) = dedup::deduplicate(records, &config.dedup)?;
    summary.dedup = report;

    let records = match &config.script {
        Some(options) => {
            let (kept, filtered) = tagger::run(records, options)?;
            summary.script_filtered = filtered.len();
            if let Some(path) = &config.filtered_output {
                let filtered_format = Format::infer_or(path, config.format)?;
                table::write_records(path, filtered_format, &config.columns, &filtered)?;
                info!("filtered names written to {:?}", path);
            }
            kept
        }
        None => records,
    };

    let records = match &config.names {
        Some(options) => names::standardize_names(records, options).0,
        None => records,
    };

    table::write_records(&config.output, format, &config.columns, &records)?;
    summary.rows_written = records.len();
    info!("wrote {} rows to {:?}", records.len(), config.output);

    if config.separate_by_language || config.separate_by_type {
        separate(&records, &config.output, format, &config.columns, config.separate_by_type)?;
    }
    if let Some(path) = &config.matrix {
        let matrix_format = Format::infer_or(path, config.format)?;
        Matrix::from_records(&records).write(path, matrix_format, &config.columns)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"dump": "latest-all.json.bz2", "output": "names.tsv"}"#).unwrap();
        assert_eq!(config.extract, ExtractOptions::default());
        assert_eq!(config.columns, Columns::default());
        assert!(config.script.is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        let res: std::result::Result<PipelineConfig, _> =
            serde_json::from_str(r#"{"dump": "d.json", "output": "o.tsv", "outptu": "x"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn parses_nested_options() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{
                "dump": "d.json",
                "output": "o.tsv",
                "extract": {"types": ["PER", "LOC"], "languages": ["en", "ru"], "strict": true},
                "script": {"method": "any", "critical_value": 0.2},
                "names": {"permuter": "comma"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.extract.languages, vec!["en", "ru"]);
        assert!(config.extract.strict);
        let script = config.script.unwrap();
        assert_eq!(script.method, tagger::VoteMethod::Any);
        assert_eq!(script.num_workers, 2);
        assert_eq!(config.names.unwrap().permuter, names::Permuter::Comma);
    }
}
