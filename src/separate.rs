// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT

use crate::error::Result;
use crate::record::{Columns, NameRecord};
use crate::table::{with_infix, Format, RecordWriter};
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Writes one file per language next to `output`, "names.tsv" becoming
/// "names.de.tsv" and so on; with `by_type`, one per language and type
/// ("names.de.PER.tsv"). Returns the files written with their row counts.
pub fn separate(
    records: &[NameRecord],
    output: &Path,
    format: Format,
    columns: &Columns,
    by_type: bool,
) -> Result<BTreeMap<PathBuf, usize>> {
    let mut groups: BTreeMap<String, Vec<&NameRecord>> = BTreeMap::new();
    for r in records {
        let key = if by_type {
            format!("{}.{}", r.language, r.entity_type)
        } else {
            r.language.clone()
        };
        groups.entry(key).or_default().push(r);
    }

    let mut written = BTreeMap::new();
    for (key, rows) in groups {
        let path = with_infix(output, &key);
        let mut w = RecordWriter::create(&path, format, columns)?;
        for r in &rows {
            w.write(r)?;
        }
        w.finish()?;
        written.insert(path, rows.len());
    }
    info!("separated {} rows into {} files", records.len(), written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityType;
    use crate::table::read_records;

    #[test]
    fn writes_one_file_per_language_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            NameRecord::new("Q1", "Joe Biden", "Джо Байден", "ru", EntityType::Per),
            NameRecord::new("Q2", "Moscow", "Москва", "ru", EntityType::Loc),
            NameRecord::new("Q2", "Moscow", "Moskau", "de", EntityType::Loc),
        ];
        let cols = Columns::default();
        let out = dir.path().join("names.csv");

        let written = separate(&records, &out, Format::Csv, &cols, false).unwrap();
        assert_eq!(written.len(), 2);
        let ru = dir.path().join("names.ru.csv");
        assert_eq!(written[&ru], 2);
        assert_eq!(read_records(&ru, Format::Csv, &cols).unwrap(), records[..2].to_vec());

        let written = separate(&records, &out, Format::Csv, &cols, true).unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join("names.ru.PER.csv").exists());
    }
}
