// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Command-line front end. Every stage of the extraction can run on its
// own, reading and writing name tables, or all of them together with
// `paranames pipeline --config config.json`.

use clap::{Args, Parser, Subcommand};
use log::info;
use paranames::dedup::{self, DedupOptions};
use paranames::dump::DumpReader;
use paranames::extract::{parse_languages, ExtractOptions, Extractor};
use paranames::matrix::Matrix;
use paranames::names::{self, NameOptions, Permuter};
use paranames::pipeline::{run_pipeline, PipelineConfig};
use paranames::separate::separate;
use paranames::stats;
use paranames::subclass::SubclassIndex;
use paranames::subsample::{self, SampleOptions, Sampler};
use paranames::table::{self, RecordWriter};
use paranames::tagger::{self, ScriptOptions, VoteMethod};
use paranames::{Columns, EntityType, Format, NameRecord};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Header names of the name table.
#[derive(Args)]
struct ColumnArgs {
    #[arg(long, default_value = "wikidata_id")]
    id_column: String,
    #[arg(long, default_value = "eng")]
    eng_column: String,
    #[arg(long, default_value = "alias")]
    alias_column: String,
    #[arg(long, default_value = "language")]
    language_column: String,
    #[arg(long, default_value = "type")]
    type_column: String,
}

impl ColumnArgs {
    fn columns(&self) -> Columns {
        Columns {
            id: self.id_column.clone(),
            eng: self.eng_column.clone(),
            alias: self.alias_column.clone(),
            language: self.language_column.clone(),
            entity_type: self.type_column.clone(),
        }
    }
}

/// A table in, a table out; "-" stands for stdin or stdout and then
/// needs an explicit format.
#[derive(Args)]
struct TableArgs {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// csv, tsv or jsonl; inferred from the file names when omitted.
    #[arg(long)]
    input_format: Option<Format>,
    #[arg(long)]
    output_format: Option<Format>,
    #[command(flatten)]
    columns: ColumnArgs,
}

impl TableArgs {
    fn read(&self) -> Result<Vec<NameRecord>, Box<dyn Error>> {
        let format = format_of(&self.input, self.input_format)?;
        let records = table::read_records(&self.input, format, &self.columns.columns())?;
        info!("read {} rows from {:?}", records.len(), self.input);
        Ok(records)
    }

    fn output_format(&self) -> Result<Format, Box<dyn Error>> {
        format_of(&self.output, self.output_format)
    }

    fn write(&self, records: &[NameRecord]) -> Result<(), Box<dyn Error>> {
        table::write_records(&self.output, self.output_format()?, &self.columns.columns(), records)?;
        info!("wrote {} rows to {:?}", records.len(), self.output);
        Ok(())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Computes the classes counting as PER, LOC and ORG.
    Subclasses {
        #[arg(short, long)]
        dump: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Comma-separated entity types.
        #[arg(long, default_value = "PER,LOC,ORG")]
        types: String,
    },
    /// Extracts a name table from a Wikidata JSON dump.
    Dump {
        #[arg(short, long)]
        dump: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        format: Option<Format>,
        /// Class index written by `subclasses`; root classes otherwise.
        #[arg(long)]
        subclasses: Option<PathBuf>,
        /// Comma-separated entity types.
        #[arg(long, default_value = "PER,LOC,ORG")]
        types: String,
        /// Comma-separated language codes, "-" for all.
        #[arg(short, long, default_value = "-")]
        languages: String,
        #[arg(long)]
        strict: bool,
        /// File with one entity id per line.
        #[arg(long)]
        ids: Option<PathBuf>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        include_aliases: bool,
        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// Removes non-entities, duplicates and conflicting types.
    Dedup {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long)]
        kept_ids: Option<PathBuf>,
        #[arg(long, default_value = "am,ti")]
        restricted_languages: String,
        #[arg(long)]
        casefold: bool,
    },
    /// Filters names written in a script unusual for their language.
    Script {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long, default_value = "majority_vote")]
        method: VoteMethod,
        #[arg(long, default_value_t = 0.1)]
        critical_value: f64,
        #[arg(long, default_value_t = 2)]
        num_workers: usize,
        #[arg(long)]
        scripts_file: Option<PathBuf>,
        #[arg(long)]
        filtered_output: Option<PathBuf>,
    },
    /// Reorders and cleans up names.
    Names {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long, default_value = "remove_parenthesis_permute_comma")]
        permuter: Permuter,
        /// Comma-separated entity types whose names are processed.
        #[arg(long, default_value = "PER")]
        types: String,
        #[arg(long)]
        stats_output: Option<PathBuf>,
        /// JSON object mapping language codes to readable names.
        #[arg(long)]
        language_names: Option<PathBuf>,
    },
    /// Splits a table into one file per language.
    Separate {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long)]
        by_type: bool,
    },
    /// Reshapes a table to one row per entity and one column per language.
    Matrix {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Writes per-language statistics.
    Stats {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long, default_value = "counts")]
        kind: StatsKind,
        #[arg(long, default_value_t = 4)]
        decimals: usize,
    },
    /// Draws a smaller, less imbalanced sample.
    Subsample {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long, default_value = "exponential_smoothing")]
        sampler: Sampler,
        #[arg(short = 'n', long)]
        num_samples: Option<usize>,
        #[arg(long, default_value_t = subsample::DEFAULT_SEED)]
        seed: u64,
        #[arg(long, default_value_t = 0.7)]
        smoothing_factor: f64,
        /// Logs original and smoothed language shares.
        #[arg(long)]
        show_proportions: bool,
    },
    /// Runs every stage as configured in a JSON file.
    Pipeline {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StatsKind {
    Counts,
    Entropy,
    EnglishMatch,
}

fn format_of(path: &Path, explicit: Option<Format>) -> Result<Format, Box<dyn Error>> {
    Ok(Format::resolve(path, explicit)?)
}

fn read_ids(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Subclasses { dump, output, types } => {
            let types = EntityType::parse_list(&types)?;
            let index = SubclassIndex::from_entities(DumpReader::open(&dump)?, &types)?;
            index.save(&output)?;
            info!("wrote subclass index to {:?}", output);
        }

        Command::Dump {
            dump,
            output,
            format,
            subclasses,
            types,
            languages,
            strict,
            ids,
            limit,
            include_aliases,
            columns,
        } => {
            let index = match &subclasses {
                Some(path) => SubclassIndex::load(path)?,
                None => SubclassIndex::roots_only(),
            };
            let options = ExtractOptions {
                types: EntityType::parse_list(&types)?,
                languages: parse_languages(&languages),
                strict,
                ids: match &ids {
                    Some(path) => read_ids(path)?,
                    None => Vec::new(),
                },
                limit,
                include_aliases,
            };
            let format = format_of(&output, format)?;
            let mut writer = RecordWriter::create(&output, format, &columns.columns())?;
            let mut reader = DumpReader::open(&dump)?;
            Extractor::new(index, options).run(reader.by_ref(), |r| writer.write(&r))?;
            if reader.decode_errors() > 0 {
                info!("{} dump lines could not be decoded", reader.decode_errors());
            }
            writer.finish()?;
        }

        Command::Dedup {
            table,
            kept_ids,
            restricted_languages,
            casefold,
        } => {
            let options = DedupOptions {
                kept_ids,
                restricted_languages: parse_languages(&restricted_languages),
                casefold,
            };
            let (records, _) = dedup::deduplicate(table.read()?, &options)?;
            table.write(&records)?;
        }

        Command::Script {
            table,
            method,
            critical_value,
            num_workers,
            scripts_file,
            filtered_output,
        } => {
            let options = ScriptOptions {
                method,
                critical_value,
                num_workers,
                scripts_file,
                ..Default::default()
            };
            let (kept, filtered) = tagger::run(table.read()?, &options)?;
            table.write(&kept)?;
            if let Some(path) = filtered_output {
                let format = Format::infer_or(&path, table.output_format)?;
                table::write_records(&path, format, &table.columns.columns(), &filtered)?;
                info!("wrote {} filtered rows to {:?}", filtered.len(), path);
            }
        }

        Command::Names {
            table,
            permuter,
            types,
            stats_output,
            language_names,
        } => {
            let options = NameOptions {
                permuter,
                types: EntityType::parse_list(&types)?,
            };
            let (records, stats) = names::standardize_names(table.read()?, &options);
            table.write(&records)?;
            if let Some(path) = stats_output {
                let language_names = match &language_names {
                    Some(p) => names::load_language_names(p)?,
                    None => HashMap::new(),
                };
                names::write_stats(&path, &stats, &language_names)?;
            }
        }

        Command::Separate { table, by_type } => {
            let records = table.read()?;
            let written = separate(
                &records,
                &table.output,
                table.output_format()?,
                &table.columns.columns(),
                by_type,
            )?;
            for (path, n) in written {
                info!("wrote {} rows to {:?}", n, path);
            }
        }

        Command::Matrix { table } => {
            let matrix = Matrix::from_records(&table.read()?);
            matrix.write(&table.output, table.output_format()?, &table.columns.columns())?;
            info!("wrote {} entities to {:?}", matrix.num_entities(), table.output);
        }

        Command::Stats { table, kind, decimals } => {
            let records = table.read()?;
            let format = table.output_format()?;
            match kind {
                StatsKind::Counts => {
                    stats::write_type_counts(&table.output, format, &stats::type_counts(&records))?
                }
                StatsKind::Entropy => stats::write_per_language(
                    &table.output,
                    format,
                    "entropy",
                    &stats::script_entropy(&records),
                    decimals,
                )?,
                StatsKind::EnglishMatch => stats::write_per_language(
                    &table.output,
                    format,
                    "english_match",
                    &stats::english_match(&records),
                    decimals,
                )?,
            }
        }

        Command::Subsample {
            table,
            sampler,
            num_samples,
            seed,
            smoothing_factor,
            show_proportions,
        } => {
            let records = table.read()?;
            if show_proportions {
                for (lang, (orig, smoothed)) in subsample::smoothed_proportions(&records, smoothing_factor) {
                    info!("[{}] share {:.6}, smoothed {:.6}", lang, orig, smoothed);
                }
            }
            let options = SampleOptions {
                sampler,
                num_samples,
                seed,
                smoothing_factor,
            };
            table.write(&subsample::subsample(records, &options))?;
        }

        Command::Pipeline { config } => {
            let summary = run_pipeline(&PipelineConfig::load(&config)?)?;
            info!(
                "pipeline done: {} entities matched, {} rows deduplicated, {} filtered by script, {} written",
                summary.extract.matched,
                summary.dedup.deduplicated,
                summary.script_filtered,
                summary.rows_written
            );
        }
    }
    Ok(())
}
