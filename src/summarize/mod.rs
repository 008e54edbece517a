use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::llm::openai::{OpenAiClient, OpenAiConfig};
use crate::llm::LlmError;
use crate::output::types::Meta;
use crate::pipeline::chunk::logic::{char_len, chunk_text};
use crate::pipeline::config::ReduceConfig;
use crate::pipeline::error::PipelineError;
use crate::pipeline::reduce::{CountingObserver, LlmSummarizer, LlmSummarizerConfig, Reducer};
use crate::source::{Source, SourceArgs};
use crate::telemetry;
use crate::telemetry::ctx::{LogCtx, OpMarker};
use crate::telemetry::emit::json_output;
use crate::telemetry::ops::summarize::Phase as SummarizePhase;

/// Model knobs shared by every command that calls the completion endpoint.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Retries per chunk for timeouts, rate limits and 5xx
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,
}

impl LlmArgs {
    pub fn summarizer_config(&self) -> LlmSummarizerConfig {
        let mut cfg = LlmSummarizerConfig::default();
        cfg.model = self.model.clone();
        if let Some(max_tokens) = self.max_tokens { cfg.max_tokens = Some(max_tokens); }
        if let Some(temperature) = self.temperature { cfg.temperature = Some(temperature); }
        cfg.max_retries = self.max_retries;
        cfg
    }
}

#[derive(Args, Debug)]
pub struct SummarizeCmd {
    #[command(flatten)]
    source: SourceArgs,
    /// Max characters of the final summary (defaults to RECAP_BUDGET or 15000)
    #[arg(long)]
    budget: Option<usize>,
    #[command(flatten)]
    llm: LlmArgs,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Serialize)]
pub(crate) struct ReducePlan {
    pub source: String,
    pub input_chars: usize,
    pub budget: usize,
    pub needs_reduction: bool,
    pub first_level_chunks: usize,
    pub model: String,
}

#[derive(Serialize)]
struct SummarizeResult {
    source: String,
    input_chars: usize,
    budget: usize,
    levels: usize,
    summarize_calls: usize,
    output_chars: usize,
    summary: String,
}

#[derive(Debug)]
pub(crate) struct Reduced {
    pub text: String,
    pub levels: usize,
    pub calls: usize,
}

pub async fn run(args: SummarizeCmd, cancel: CancellationToken) -> Result<()> {
    let t0 = Instant::now();
    let cfg = ReduceConfig::from_env().with_budget(args.budget);
    let log = telemetry::summarize();
    let _g = log
        .root_span_kv([
            ("file", format!("{:?}", args.source.file)),
            ("url", format!("{:?}", args.source.url)),
            ("budget", cfg.budget.to_string()),
            ("model", format!("{:?}", args.llm.model)),
            ("dry_run", args.dry_run.to_string()),
        ])
        .entered();

    let source = Source::from_args(&args.source)?;
    let text = {
        let _s = log.span_kv(&SummarizePhase::Load, [("source", source.label())]).entered();
        source.load().await?
    };
    let input_chars = char_len(&text);

    let client_cfg = OpenAiConfig::from_env();
    if args.dry_run {
        let _s = log.span(&SummarizePhase::Plan).entered();
        let plan = build_plan(&source, &text, cfg.budget, args.llm.model.as_deref().unwrap_or(&client_cfg.model))?;
        log.info(format!(
            "📝 Summarize plan — {} chars, budget {}, {} first-level chunk(s)",
            plan.input_chars, plan.budget, plan.first_level_chunks
        ));
        log.info("   Dry run — no LLM calls made.");
        log.plan(&plan)?;
        return Ok(());
    }

    let reduced = {
        let _s = log.span(&SummarizePhase::Reduce).entered();
        reduce_with_llm(&log, &text, cfg.budget, client_cfg, &args.llm, cancel).await?
    };
    log.info(format!(
        "✅ {} → {} chars in {} level(s), {} call(s)",
        input_chars, char_len(&reduced.text), reduced.levels, reduced.calls
    ));

    let _o = log.span(&SummarizePhase::Output).entered();
    if !json_output() {
        println!("{}", reduced.text.trim_end());
    }
    let result = SummarizeResult {
        source: source.label(),
        input_chars,
        budget: cfg.budget,
        levels: reduced.levels,
        summarize_calls: reduced.calls,
        output_chars: char_len(&reduced.text),
        summary: reduced.text,
    };
    log.result(&result, Some(Meta::since(t0)))?;
    Ok(())
}

pub(crate) fn build_plan(source: &Source, text: &str, budget: usize, model: &str) -> Result<ReducePlan> {
    let input_chars = char_len(text);
    let needs_reduction = input_chars > budget;
    let first_level_chunks = if needs_reduction {
        chunk_text(text, budget).context("split text into chunks")?.len()
    } else {
        0
    };
    Ok(ReducePlan {
        source: source.label(),
        input_chars,
        budget,
        needs_reduction,
        first_level_chunks,
        model: model.to_string(),
    })
}

/// Reduce `text` through the configured completion endpoint, logging progress on `log`.
pub(crate) async fn reduce_with_llm<O: OpMarker>(
    log: &LogCtx<O>,
    text: &str,
    budget: usize,
    client_cfg: OpenAiConfig,
    llm: &LlmArgs,
    cancel: CancellationToken,
) -> Result<Reduced> {
    let client = OpenAiClient::new(client_cfg).context("init OpenAI client")?;
    let summarizer = LlmSummarizer::new(client, llm.summarizer_config());
    let counter = CountingObserver::new(log);

    let outcome = Reducer::new(&summarizer, budget)
        .with_observer(&counter)
        .with_cancel(cancel)
        .reduce(text)
        .await;

    match outcome {
        Ok(text) => Ok(Reduced { text, levels: counter.levels(), calls: counter.calls() }),
        Err(err) => {
            log.warn(failure_hint(&err));
            Err(anyhow::Error::new(err).context("reduce text"))
        }
    }
}

fn failure_hint(err: &PipelineError) -> String {
    match err {
        PipelineError::InvalidBudget { budget } => {
            format!("⚠️  Budget {budget} is not usable — pass --budget or set RECAP_BUDGET to a positive value.")
        }
        PipelineError::SummarizationFailed { level, chunk_index, source } => {
            match source.downcast_ref::<LlmError>() {
                Some(LlmError::MissingApiKey) => {
                    "⚠️  Missing OPENAI_API_KEY — set it or use --dry-run / OPENAI_BASE_URL for a compatible proxy.".to_string()
                }
                Some(LlmError::Timeout) => format!(
                    "⚠️  Chunk {chunk_index} at level {level} timed out — consider increasing OPENAI_TIMEOUT_SECS."
                ),
                _ => format!("⚠️  Chunk {chunk_index} at level {level} could not be summarized."),
            }
        }
        PipelineError::NoProgress { level, input_chars, output_chars } => format!(
            "⚠️  Level {level} did not shrink ({input_chars} → {output_chars} chars) — lower --max-tokens or raise --budget."
        ),
        PipelineError::Cancelled { level } => format!("⚠️  Cancelled during level {level}."),
    }
}
