// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Streaming reader for Wikidata JSON dumps. A dump is a JSON array with
// one entity per line; we never parse the array as a whole, we strip the
// trailing comma of each line and decode it on its own.

use crate::error::{Error, Result};
use bzip2::read::MultiBzDecoder;
use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;

const PROGRESS_EVERY: u64 = 100_000;

/// Opens a dump, decompressing `.bz2` and `.zst` on the fly.
pub fn open_dump(path: &Path) -> Result<Box<dyn BufRead>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let plain = name.ends_with(".json") || name.ends_with(".jsonl");
    if !plain && !name.ends_with(".bz2") && !name.ends_with(".zst") {
        return Err(Error::UnsupportedDump(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if name.ends_with(".bz2") {
        Box::new(MultiBzDecoder::new(file))
    } else if name.ends_with(".zst") {
        Box::new(zstd::stream::read::Decoder::new(file)?)
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::with_capacity(1 << 20, reader)))
}

#[derive(Debug, Default, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub labels: BTreeMap<String, Term>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<Term>>,
    #[serde(default)]
    pub claims: Claims,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Term {
    pub value: String,
}

/// Only the two properties the pipeline looks at; everything else in
/// the claims object is skipped by serde.
#[derive(Debug, Default, Deserialize)]
pub struct Claims {
    #[serde(rename = "P31", default)]
    pub instance_of: Vec<Statement>,
    #[serde(rename = "P279", default)]
    pub subclass_of: Vec<Statement>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Statement {
    pub mainsnak: Snak,
}

#[derive(Debug, Default, Deserialize)]
pub struct Snak {
    // Absent for "no value" and "unknown value" snaks.
    pub datavalue: Option<DataValue>,
}

#[derive(Debug, Deserialize)]
pub struct DataValue {
    pub value: serde_json::Value,
}

impl Statement {
    fn target_id(&self) -> Option<&str> {
        self.mainsnak
            .datavalue
            .as_ref()
            .and_then(|dv| dv.value.get("id"))
            .and_then(|id| id.as_str())
    }
}

impl Entity {
    pub fn instance_of(&self) -> impl Iterator<Item = &str> {
        self.claims.instance_of.iter().filter_map(Statement::target_id)
    }

    pub fn subclass_of(&self) -> impl Iterator<Item = &str> {
        self.claims.subclass_of.iter().filter_map(Statement::target_id)
    }

    pub fn label(&self, lang: &str) -> Option<&str> {
        self.labels.get(lang).map(|t| t.value.as_str())
    }

    /// The English label, or the entity id if there is none.
    pub fn english_name(&self) -> &str {
        self.label("en").unwrap_or(&self.id)
    }

    /// Languages in which the entity has a label.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }
}

/// Iterates over the entities of a dump. Lines that cannot be decoded
/// are counted and skipped.
pub struct DumpReader<R: BufRead> {
    lines: std::io::Lines<R>,
    num_entities: u64,
    decode_errors: u64,
    started: Instant,
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> DumpReader<R> {
        DumpReader {
            lines: reader.lines(),
            num_entities: 0,
            decode_errors: 0,
            started: Instant::now(),
        }
    }

    pub fn num_entities(&self) -> u64 {
        self.num_entities
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }
}

impl DumpReader<Box<dyn BufRead>> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(DumpReader::new(open_dump(path)?))
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.len() < 5 {
                continue;
            }
            if line.ends_with(',') {
                line.pop();
            }
            self.num_entities += 1;
            if self.num_entities % PROGRESS_EVERY == 0 {
                info!(
                    "processed {} entities in {:.1}s",
                    self.num_entities,
                    self.started.elapsed().as_secs_f32()
                );
            }
            match serde_json::from_str::<Entity>(&line) {
                Ok(e) => return Some(Ok(e)),
                Err(e) => {
                    self.decode_errors += 1;
                    if self.decode_errors <= 10 {
                        warn!("cannot decode entity #{}: {}", self.num_entities, e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) const SAMPLE: &str = r#"[
{"id":"Q1","type":"item","labels":{"en":{"language":"en","value":"Joe Biden"},"ru":{"language":"ru","value":"Джо Байден"}},"aliases":{"en":[{"language":"en","value":"Joseph Biden"}]},"claims":{"P31":[{"mainsnak":{"snaktype":"value","datavalue":{"value":{"entity-type":"item","id":"Q5"},"type":"wikibase-entityid"}}}]}},
{"id":"Q2","labels":{"de":{"language":"de","value":"Bern"}},"claims":{"P31":[{"mainsnak":{"snaktype":"novalue"}}]}},
not json at all,
{"id":"Q100","labels":{"en":{"language":"en","value":"city"}},"claims":{"P279":[{"mainsnak":{"datavalue":{"value":{"id":"Q82794"}}}}]}}
]
"#;

    #[test]
    fn reads_entities_and_counts_errors() {
        let mut reader = DumpReader::new(Cursor::new(SAMPLE));
        let entities: Vec<Entity> = reader.by_ref().map(|e| e.unwrap()).collect();
        assert_eq!(entities.len(), 3);
        assert_eq!(reader.num_entities(), 4);
        assert_eq!(reader.decode_errors(), 1);

        let biden = &entities[0];
        assert_eq!(biden.instance_of().collect::<Vec<_>>(), vec!["Q5"]);
        assert_eq!(biden.english_name(), "Joe Biden");
        assert_eq!(biden.languages().collect::<Vec<_>>(), vec!["en", "ru"]);
        assert_eq!(biden.aliases["en"][0].value, "Joseph Biden");

        let bern = &entities[1];
        assert_eq!(bern.instance_of().count(), 0);
        assert_eq!(bern.english_name(), "Q2");

        assert_eq!(entities[2].subclass_of().collect::<Vec<_>>(), vec!["Q82794"]);
    }

    #[test]
    fn rejects_unknown_dump_extension() {
        let err = open_dump(Path::new("/nonexistent/dump.xml")).err();
        assert!(matches!(err, Some(Error::UnsupportedDump(_))));
    }
}
