// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown entity type \"{0}\", expected PER, LOC or ORG")]
    UnknownEntityType(String),

    #[error("unknown table format \"{0}\", expected csv, tsv or jsonl")]
    UnknownFormat(String),

    #[error("cannot infer table format of {0:?}, pass it explicitly")]
    FormatNotInferred(PathBuf),

    #[error("dump file {0:?} must end in .json, .jsonl, .bz2 or .zst")]
    UnsupportedDump(PathBuf),

    #[error("missing column \"{0}\" in table header")]
    MissingColumn(String),

    #[error("line {line}: {reason}")]
    BadRow { line: u64, reason: String },

    #[error("entity {id} still has {count} types after applying trumping rules")]
    AmbiguousType { id: String, count: usize },

    #[error("missing {0}")]
    MissingOption(&'static str),

    #[error("unknown {kind} \"{value}\"")]
    UnknownOption { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
