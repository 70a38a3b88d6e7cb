// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Multilingual names of people, places and organizations, extracted
// from Wikidata and cleaned up for use as transliteration and
// named-entity training data.

pub mod casefold;
pub mod dedup;
pub mod dump;
pub mod error;
pub mod extract;
pub mod matrix;
pub mod names;
pub mod pipeline;
pub mod record;
pub mod script;
pub mod separate;
pub mod stats;
pub mod subclass;
pub mod subsample;
pub mod table;
pub mod tagger;

pub use error::{Error, Result};
pub use record::{Columns, EntityType, NameRecord};
pub use table::Format;
