mod config;

use std::{
    collections::HashSet,
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use classtext_strings::{
    rewrite_classes, scan_classes, translate_all, ClassEntry, GlossaryTranslator,
};
use log::{error, info};

use crate::config::{load_glossary, Config};

#[derive(Parser)]
#[clap(name = "classtext", about = "Finds and translates user-visible strings in class files")]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[clap(about = "list the translatable strings of class files")]
    Scan {
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(short = 'j', long)]
        concurrency: Option<usize>,
        #[clap(required = true)]
        classes: Vec<PathBuf>,
    },
    #[clap(about = "translate the strings of class files through a glossary")]
    Rewrite {
        #[clap(long)]
        glossary: PathBuf,
        #[clap(long)]
        out_dir: PathBuf,
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(short = 'j', long)]
        concurrency: Option<usize>,
        #[clap(long)]
        batch_size: Option<usize>,
        #[clap(required = true)]
        classes: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    match Opts::parse().command {
        Command::Scan {
            config,
            concurrency,
            classes,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            scan(&config, &classes)
        }
        Command::Rewrite {
            glossary,
            out_dir,
            config,
            concurrency,
            batch_size,
            classes,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            rewrite(&config, &glossary, &out_dir, &classes)
        }
    }
}

/// Reads every class file, logging the ones that can't be read.
fn read_classes(paths: &[PathBuf]) -> (Vec<(PathBuf, ClassEntry)>, usize) {
    let mut entries = vec![];
    let mut failed = 0;
    for path in paths {
        match fs::read(path) {
            Ok(bytes) => entries.push((
                path.clone(),
                ClassEntry {
                    name: path.display().to_string(),
                    bytes,
                },
            )),
            Err(e) => {
                error!("Failed to read {}: {e}", path.display());
                failed += 1;
            }
        }
    }
    (entries, failed)
}

/// Where each input lands under `out_dir`: its path below the deepest
/// directory all inputs share, so same-named classes from different
/// packages stay apart.
fn output_paths(paths: &[PathBuf], out_dir: &Path) -> Vec<PathBuf> {
    let parents = paths
        .iter()
        .map(|path| {
            path.parent()
                .map(|parent| parent.components().collect::<Vec<_>>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();
    let common = match parents.split_first() {
        Some((first, rest)) => rest.iter().fold(first.len(), |len, parent| {
            first
                .iter()
                .zip(parent)
                .take(len)
                .take_while(|(a, b)| a == b)
                .count()
        }),
        None => 0,
    };

    paths
        .iter()
        .map(|path| {
            let relative = path
                .components()
                .skip(common)
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect::<PathBuf>();
            out_dir.join(relative)
        })
        .collect()
}

fn scan(config: &Config, paths: &[PathBuf]) -> anyhow::Result<()> {
    let filter = config.filter()?;
    let (entries, mut failed) = read_classes(paths);
    let entries = entries.into_iter().map(|(_, entry)| entry).collect::<Vec<_>>();

    let scan = scan_classes(&entries, &filter, config.concurrency)?;
    for failure in &scan.failures {
        error!("{}: {}", failure.name, failure.error);
    }
    failed += scan.failures.len();

    for candidate in scan.candidates.sorted() {
        if !filter.is_translatable(&candidate.text) {
            continue;
        }
        println!(
            "{:>6}  {:<11}  {:?}  {}",
            candidate.occurrences,
            candidate.kind.name(),
            candidate.text,
            candidate.files.join(", ")
        );
    }

    if failed > 0 {
        bail!("{failed} of {} class files failed", paths.len());
    }
    Ok(())
}

fn rewrite(config: &Config, glossary: &Path, out_dir: &Path, paths: &[PathBuf]) -> anyhow::Result<()> {
    let filter = config.filter()?;
    let translator = GlossaryTranslator::new(load_glossary(glossary)?);
    info!("Loaded {} glossary entries", translator.len());

    let (entries, mut failed) = read_classes(paths);
    let (read_paths, entries): (Vec<PathBuf>, Vec<ClassEntry>) = entries.into_iter().unzip();

    let scan = scan_classes(&entries, &filter, config.concurrency)?;
    let texts = scan.candidates.translatable_texts(&filter);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("Failed to start the translation runtime")?;
    let run = runtime.block_on(translate_all(
        &translator,
        &texts,
        &config.translation_settings(),
    ));

    let outcomes = rewrite_classes(entries, &run.translations, &filter, config.concurrency)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let mut modified = 0;
    let mut written = HashSet::new();
    for (out_path, outcome) in output_paths(&read_paths, out_dir).into_iter().zip(&outcomes) {
        if out_path == out_dir {
            error!("{} has no file name", outcome.name);
            failed += 1;
            continue;
        }
        if !written.insert(out_path.clone()) {
            error!(
                "{} would overwrite {}, skipping it",
                outcome.name,
                out_path.display()
            );
            failed += 1;
            continue;
        }

        match &outcome.report {
            Ok(report) if report.is_modified() => modified += 1,
            Ok(_) => {}
            Err(e) => {
                error!("{}: {e}", outcome.name);
                failed += 1;
            }
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&out_path, &outcome.bytes)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
    }

    info!(
        "{modified} of {} classes changed, {} of {} texts translated",
        outcomes.len(),
        run.translations.iter().filter(|(from, to)| from != to).count(),
        texts.len()
    );

    if failed > 0 {
        bail!("{failed} of {} class files failed", paths.len());
    }
    Ok(())
}
