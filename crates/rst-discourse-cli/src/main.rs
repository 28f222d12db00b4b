use anyhow::{bail, Context, Result};
use rst_discourse_config::Config;
use rst_discourse_engine::{io, Document};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct DocumentSummary {
    code: String,
    name: String,
    segments: usize,
    sentences: u32,
    tokens: usize,
    signals: usize,
    intra_sentential_relations: BTreeMap<String, usize>,
}

fn summarize(document: &Document) -> DocumentSummary {
    let sentences = document
        .segments()
        .iter()
        .filter_map(|node| node.as_segment())
        .map(|segment| segment.sentence_id)
        .max()
        .unwrap_or(0);
    let intra_sentential_relations = document
        .intra_sentential_relation_counts()
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    DocumentSummary {
        code: document.code().to_string(),
        name: document.name().to_string(),
        segments: document.segments().len(),
        sentences,
        tokens: document.token_dictionary().len(),
        signals: document.signals().len(),
        intra_sentential_relations,
    }
}

fn documents_dir(args: &[String]) -> Result<PathBuf> {
    if let Some(dir) = args.iter().find(|arg| !arg.starts_with("--")) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(config) = Config::load()? {
        return Ok(config.documents_path);
    }
    bail!(
        "no documents directory given; pass it as an argument or set `documents_path` in {}",
        Config::config_path().display()
    );
}

fn print_text_report(summaries: &[DocumentSummary]) {
    for summary in summaries {
        println!(
            "{}  {}  segments={} sentences={} tokens={} signals={}",
            summary.code,
            summary.name,
            summary.segments,
            summary.sentences,
            summary.tokens,
            summary.signals,
        );
        for (relation, count) in &summary.intra_sentential_relations {
            println!("    {relation}: {count}");
        }
    }
}

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let as_json = args.iter().any(|arg| arg == "--json");
    let dir = documents_dir(&args)?;

    let results = io::load_documents(&dir)
        .with_context(|| format!("failed to scan documents in {}", dir.display()))?;

    let mut summaries = Vec::new();
    let mut failed = 0usize;
    for entry in &results {
        match &entry.result {
            Ok(document) => summaries.push(summarize(document)),
            Err(err) => {
                failed += 1;
                log::warn!("skipping {}: {err}", entry.path.display());
            }
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_text_report(&summaries);
        println!("{} documents analyzed, {} skipped", summaries.len(), failed);
    }

    Ok(())
}
