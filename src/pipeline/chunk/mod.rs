pub mod logic;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::output::types::Meta;
use crate::pipeline::config::ReduceConfig;
use crate::source::{Source, SourceArgs};
use crate::telemetry::{self};
use crate::telemetry::emit::json_output;
use crate::telemetry::ops::chunk::Phase as ChunkPhase;

use self::logic::{char_len, chunk_text};

const PREVIEW_CHARS: usize = 60;

#[derive(Args, Debug)]
pub struct ChunkCmd {
    #[command(flatten)]
    source: SourceArgs,
    /// Max characters per chunk (defaults to RECAP_BUDGET or 15000)
    #[arg(long)]
    budget: Option<usize>,
    /// How many chunks to list in text output
    #[arg(long, default_value_t = 10)]
    show: usize,
}

#[derive(Serialize)]
struct ChunkInfo {
    index: usize,
    chars: usize,
    preview: String,
}

#[derive(Serialize)]
struct ChunkResult {
    source: String,
    input_chars: usize,
    budget: usize,
    chunks: Vec<ChunkInfo>,
}

pub async fn run(args: ChunkCmd) -> Result<()> {
    let t0 = Instant::now();
    let cfg = ReduceConfig::from_env().with_budget(args.budget);
    let log = telemetry::chunk();
    let _g = log.root_span_kv([
        ("file", format!("{:?}", args.source.file)),
        ("url", format!("{:?}", args.source.url)),
        ("budget", cfg.budget.to_string()),
        ("show", args.show.to_string()),
    ]).entered();

    let source = Source::from_args(&args.source)?;
    let text = {
        let _s = log.span_kv(&ChunkPhase::Load, [("source", source.label())]).entered();
        source.load().await?
    };

    let chunks = {
        let _s = log.span(&ChunkPhase::Split).entered();
        chunk_text(&text, cfg.budget).context("split text into chunks")?
    };
    let input_chars = char_len(&text);
    log.info(format!("✂️  {} chars → {} chunk(s) at budget {}", input_chars, chunks.len(), cfg.budget));

    let infos: Vec<ChunkInfo> = chunks
        .iter()
        .enumerate()
        .map(|(index, c)| ChunkInfo { index, chars: char_len(c), preview: preview(c, PREVIEW_CHARS) })
        .collect();
    for info in &infos {
        log.debug_kv("chunk", [("index", info.index.to_string()), ("chars", info.chars.to_string())]);
    }

    let _o = log.span(&ChunkPhase::Output).entered();
    if !json_output() {
        for info in infos.iter().take(args.show) {
            println!("[{:>3}] {:>6} chars  {}", info.index, info.chars, info.preview);
        }
        if infos.len() > args.show { println!("  ... ({} more)", infos.len() - args.show); }
    }
    let result = ChunkResult { source: source.label(), input_chars, budget: cfg.budget, chunks: infos };
    log.result(&result, Some(Meta::since(t0)))?;
    Ok(())
}

/// One-line preview: newlines flattened, cut at `max` chars with an ellipsis.
pub fn preview(s: &str, max: usize) -> String {
    let flat: String = s.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
    if char_len(&flat) <= max {
        return flat;
    }
    let mut out: String = flat.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("Week 1\nIntro.", 60), "Week 1 Intro.");
        assert_eq!(preview("abcdef", 3), "abc…");
        assert_eq!(preview("ééé", 3), "ééé");
    }
}
