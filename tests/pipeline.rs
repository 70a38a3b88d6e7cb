// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT

use paranames::pipeline::{run_pipeline, PipelineConfig};
use paranames::table::{self, Format};
use paranames::{Columns, EntityType};
use serde_json::json;
use std::fs;
use std::path::Path;

const DUMP: &str = r#"[
{"id":"Q1","labels":{"de":{"language":"de","value":"Joe Biden (Politiker)"},"en":{"language":"en","value":"Joe Biden"},"ru":{"language":"ru","value":"Байден, Джо"}},"claims":{"P31":[{"mainsnak":{"snaktype":"value","datavalue":{"value":{"entity-type":"item","id":"Q5"},"type":"wikibase-entityid"}}}]}},
{"id":"Q2","labels":{"de":{"language":"de","value":"Deutschland"},"en":{"language":"en","value":"Germany"}},"claims":{"P31":[{"mainsnak":{"datavalue":{"value":{"id":"Q6256"}}}}]}},
{"id":"Q3","labels":{"en":{"language":"en","value":"Berlin"}},"claims":{"P31":[{"mainsnak":{"datavalue":{"value":{"id":"Q515"}}}}]}},
{"id":"Q515","labels":{"en":{"language":"en","value":"city"}},"claims":{"P279":[{"mainsnak":{"datavalue":{"value":{"id":"Q82794"}}}}]}},
{"id":"Q4", broken
]
"#;

fn write_dump(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dump.json");
    fs::write(&path, DUMP).unwrap();
    path
}

#[test]
fn runs_all_stages() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    // Countries are both places and organizations.
    let subclasses = dir.path().join("subclasses.tsv");
    fs::write(&subclasses, "LOC\tQ6256\nORG\tQ6256\n").unwrap();
    let output = dir.path().join("out").join("names.tsv");
    let matrix = dir.path().join("out").join("matrix.tsv");

    let config_path = dir.path().join("config.json");
    let config = json!({
        "dump": dump,
        "subclasses": subclasses,
        "names": {"permuter": "remove_parenthesis_permute_comma"},
        "output": output,
        "separate_by_language": true,
        "matrix": matrix,
    });
    fs::write(&config_path, config.to_string()).unwrap();

    let summary = run_pipeline(&PipelineConfig::load(&config_path).unwrap()).unwrap();
    assert_eq!(summary.decode_errors, 1);
    assert_eq!(summary.extract.matched, 2);
    assert_eq!(summary.dedup.original, 7);
    assert_eq!(summary.dedup.deduplicated, 5);
    assert_eq!(summary.rows_written, 5);

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "wikidata_id\teng\talias\tlanguage\ttype\n\
         Q1\tJoe Biden\tJoe Biden\tde\tPER\n\
         Q1\tJoe Biden\tJoe Biden\ten\tPER\n\
         Q1\tJoe Biden\tДжо Байден\tru\tPER\n\
         Q2\tGermany\tDeutschland\tde\tLOC\n\
         Q2\tGermany\tGermany\ten\tLOC\n"
    );

    let de = table::read_records(&dir.path().join("out/names.de.tsv"), Format::Tsv, &Columns::default()).unwrap();
    assert_eq!(de.len(), 2);
    assert!(de.iter().all(|r| r.language == "de"));
    assert!(dir.path().join("out/names.ru.tsv").exists());

    assert_eq!(
        fs::read_to_string(&matrix).unwrap(),
        "wikidata_id\teng\ttype\tde\ten\tru\n\
         Q1\tJoe Biden\tPER\tJoe Biden\tJoe Biden\tДжо Байден\n\
         Q2\tGermany\tLOC\tDeutschland\tGermany\t\n"
    );
}

#[test]
fn computes_subclasses_from_dump() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    let output = dir.path().join("names.jsonl");
    let config: PipelineConfig = serde_json::from_value(json!({
        "dump": dump,
        "compute_subclasses": true,
        "extract": {"types": ["LOC"]},
        "output": output,
    }))
    .unwrap();

    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.rows_written, 1);

    let rows = table::read_records(&output, Format::Jsonl, &Columns::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].wikidata_id, "Q3");
    assert_eq!(rows[0].alias, "Berlin");
    assert_eq!(rows[0].entity_type, EntityType::Loc);
}

#[test]
fn baseline_script_method_needs_scripts_file() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    let config: PipelineConfig = serde_json::from_value(json!({
        "dump": dump,
        "script": {"method": "baseline"},
        "output": dir.path().join("names.tsv"),
    }))
    .unwrap();
    assert!(run_pipeline(&config).is_err());
}

#[test]
fn filtered_output_format_follows_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    let config = |filtered: &str| -> PipelineConfig {
        serde_json::from_value(json!({
            "dump": dump,
            "script": {"method": "majority_vote"},
            "output": dir.path().join("names.tsv"),
            "filtered_output": dir.path().join(filtered),
        }))
        .unwrap()
    };

    let err = run_pipeline(&config("filtered.out")).unwrap_err();
    assert!(matches!(err, paranames::Error::FormatNotInferred(_)));

    let summary = run_pipeline(&config("filtered.csv")).unwrap();
    assert_eq!(summary.script_filtered, 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("filtered.csv")).unwrap(),
        "wikidata_id,eng,alias,language,type\n"
    );
}
