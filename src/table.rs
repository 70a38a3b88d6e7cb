// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Flat-file I/O. Every step of the pipeline reads and writes CSV, TSV
// or JSON Lines; a path of "-" means stdin or stdout, and a trailing
// ".zst" makes the file zstd-compressed.

use crate::error::{Error, Result};
use crate::record::{Columns, EntityType, NameRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ZSTD_LEVEL: i32 = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Tsv,
    Jsonl,
}

impl Format {
    /// Guesses the format from a file name such as "names.tsv.zst".
    pub fn infer(path: &Path) -> Result<Format> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let name = name.strip_suffix(".zst").unwrap_or(name);
        let ext = Path::new(name).extension().and_then(|e| e.to_str());
        match ext {
            Some(ext) => ext.parse().map_err(|_| Error::FormatNotInferred(path.to_path_buf())),
            None => Err(Error::FormatNotInferred(path.to_path_buf())),
        }
    }

    /// An explicit format wins over the file name.
    pub fn resolve(path: &Path, explicit: Option<Format>) -> Result<Format> {
        match explicit {
            Some(f) => Ok(f),
            None => Format::infer(path),
        }
    }

    /// For side outputs: the file name wins, `fallback` covers names
    /// without a known extension.
    pub fn infer_or(path: &Path, fallback: Option<Format>) -> Result<Format> {
        Format::infer(path).or_else(|e| fallback.ok_or(e))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Tsv => "tsv",
            Format::Jsonl => "jsonl",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Format::Tsv => b'\t',
            _ => b',',
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "tsv" | "tab" => Ok(Format::Tsv),
            "jsonl" => Ok(Format::Jsonl),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str().is_empty() || path == Path::new("-")
}

fn is_zstd(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "zst")
}

pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path)?;
    if is_zstd(path) {
        Ok(Box::new(zstd::stream::read::Decoder::new(file)?))
    } else {
        Ok(Box::new(file))
    }
}

pub fn create_output(path: &Path) -> Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let file = BufWriter::new(File::create(path)?);
    if is_zstd(path) {
        let encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL)?;
        Ok(Box::new(encoder.auto_finish()))
    } else {
        Ok(Box::new(file))
    }
}

/// "names.tsv" + "de" -> "names.de.tsv"; compression suffixes are kept.
pub fn with_infix(path: &Path, infix: &str) -> PathBuf {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let (stem_and_ext, zst) = match name.strip_suffix(".zst") {
        Some(rest) => (rest, ".zst"),
        None => (name, ""),
    };
    let new_name = match stem_and_ext.rfind('.') {
        Some(dot) if dot > 0 => format!(
            "{}.{}{}{}",
            &stem_and_ext[..dot],
            infix,
            &stem_and_ext[dot..],
            zst
        ),
        _ => format!("{}.{}{}", stem_and_ext, infix, zst),
    };
    path.with_file_name(new_name)
}

enum Sink {
    Delimited(csv::Writer<Box<dyn Write>>),
    Jsonl(Box<dyn Write>),
}

/// Writes rows of strings under a fixed header.
pub struct RowWriter {
    header: Vec<String>,
    sink: Sink,
}

impl RowWriter {
    pub fn create(path: &Path, format: Format, header: Vec<String>) -> Result<RowWriter> {
        RowWriter::from_writer(create_output(path)?, format, header)
    }

    pub fn from_writer(out: Box<dyn Write>, format: Format, header: Vec<String>) -> Result<RowWriter> {
        let sink = match format {
            Format::Jsonl => Sink::Jsonl(out),
            _ => {
                let mut w = csv::WriterBuilder::new()
                    .delimiter(format.delimiter())
                    .from_writer(out);
                w.write_record(&header)?;
                Sink::Delimited(w)
            }
        };
        Ok(RowWriter { header, sink })
    }

    pub fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        match &mut self.sink {
            Sink::Delimited(w) => w.write_record(row.iter().map(|s| s.as_ref()))?,
            Sink::Jsonl(w) => {
                let mut obj = serde_json::Map::new();
                for (key, value) in self.header.iter().zip(row) {
                    obj.insert(key.clone(), serde_json::Value::from(value.as_ref()));
                }
                serde_json::to_writer(&mut *w, &obj)?;
                w.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        match self.sink {
            Sink::Delimited(mut w) => w.flush()?,
            Sink::Jsonl(mut w) => w.flush()?,
        }
        Ok(())
    }
}

/// Writes `NameRecord`s; the header is written once, on creation.
pub struct RecordWriter {
    rows: RowWriter,
    num_written: u64,
}

impl RecordWriter {
    pub fn create(path: &Path, format: Format, columns: &Columns) -> Result<RecordWriter> {
        RecordWriter::from_writer(create_output(path)?, format, columns)
    }

    pub fn from_writer(out: Box<dyn Write>, format: Format, columns: &Columns) -> Result<RecordWriter> {
        let header = columns.header().iter().map(|s| s.to_string()).collect();
        Ok(RecordWriter {
            rows: RowWriter::from_writer(out, format, header)?,
            num_written: 0,
        })
    }

    pub fn write(&mut self, r: &NameRecord) -> Result<()> {
        self.num_written += 1;
        self.rows.write_row(&[
            r.wikidata_id.as_str(),
            r.eng.as_str(),
            r.alias.as_str(),
            r.language.as_str(),
            r.entity_type.as_str(),
        ])
    }

    pub fn num_written(&self) -> u64 {
        self.num_written
    }

    pub fn finish(self) -> Result<()> {
        self.rows.finish()
    }
}

pub fn write_records(path: &Path, format: Format, columns: &Columns, records: &[NameRecord]) -> Result<()> {
    let mut w = RecordWriter::create(path, format, columns)?;
    for r in records {
        w.write(r)?;
    }
    w.finish()
}

fn record_from_fields(fields: [&str; 5], line: u64) -> Result<NameRecord> {
    let entity_type: EntityType = fields[4].trim().parse().map_err(|e: Error| Error::BadRow {
        line,
        reason: e.to_string(),
    })?;
    Ok(NameRecord::new(fields[0], fields[1], fields[2], fields[3], entity_type))
}

pub fn read_records(path: &Path, format: Format, columns: &Columns) -> Result<Vec<NameRecord>> {
    read_records_from(open_input(path)?, format, columns)
}

pub fn read_records_from<R: Read>(input: R, format: Format, columns: &Columns) -> Result<Vec<NameRecord>> {
    let mut out = Vec::new();
    match format {
        Format::Jsonl => {
            let names = columns.header();
            for (i, line) in BufReader::new(input).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let line_no = i as u64 + 1;
                let value: serde_json::Value = serde_json::from_str(&line)?;
                let mut fields = [""; 5];
                for (slot, name) in fields.iter_mut().zip(names) {
                    *slot = value
                        .get(name)
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| Error::BadRow {
                            line: line_no,
                            reason: format!("missing string field \"{}\"", name),
                        })?;
                }
                out.push(record_from_fields(fields, line_no)?);
            }
        }
        _ => {
            let mut rdr = csv::ReaderBuilder::new()
                .delimiter(format.delimiter())
                .from_reader(input);
            let idx = columns.locate(rdr.headers()?.iter())?;
            for rec in rdr.records() {
                let rec = rec?;
                let line = rec.position().map_or(0, |p| p.line());
                let mut fields = [""; 5];
                for (slot, &i) in fields.iter_mut().zip(&idx) {
                    *slot = rec.get(i).ok_or_else(|| Error::BadRow {
                        line,
                        reason: "too few fields".to_string(),
                    })?;
                }
                out.push(record_from_fields(fields, line)?);
            }
        }
    }
    Ok(out)
}
