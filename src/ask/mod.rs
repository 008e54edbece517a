use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::llm::openai::{OpenAiClient, OpenAiConfig};
use crate::llm::{ChatRequest, LlmClient, LlmError, Usage};
use crate::output::types::Meta;
use crate::pipeline::chunk::logic::char_len;
use crate::pipeline::config::ReduceConfig;
use crate::source::{Source, SourceArgs};
use crate::summarize::{build_plan, reduce_with_llm, LlmArgs, ReducePlan};
use crate::telemetry;
use crate::telemetry::emit::json_output;
use crate::telemetry::ops::ask::Phase as AskPhase;

pub const ASK_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based on the provided course content.";

#[derive(Args, Debug)]
pub struct AskCmd {
    question: String,
    #[command(flatten)]
    source: SourceArgs,
    /// Max characters of context sent with the question
    #[arg(long)]
    budget: Option<usize>,
    #[command(flatten)]
    llm: LlmArgs,
    #[arg(long)]
    system: Option<String>,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Serialize)]
struct AskPlan<'a> {
    question: &'a str,
    system_message: &'a str,
    #[serde(flatten)]
    context: ReducePlan,
}

#[derive(Serialize)]
struct AskResult<'a> {
    question: &'a str,
    model: String,
    answer: &'a str,
    context_chars: usize,
    levels: usize,
    summarize_calls: usize,
    finish_reason: Option<String>,
    usage: Option<Usage>,
}

pub async fn run(args: AskCmd, cancel: CancellationToken) -> Result<()> {
    let t0 = Instant::now();
    let cfg = ReduceConfig::from_env().with_budget(args.budget);
    let log = telemetry::ask();
    let _g = log
        .root_span_kv([
            ("file", format!("{:?}", args.source.file)),
            ("url", format!("{:?}", args.source.url)),
            ("budget", cfg.budget.to_string()),
            ("model", format!("{:?}", args.llm.model)),
            ("max_tokens", format!("{:?}", args.llm.max_tokens)),
            ("temperature", format!("{:?}", args.llm.temperature)),
            ("dry_run", args.dry_run.to_string()),
        ])
        .entered();

    let source = Source::from_args(&args.source)?;
    let text = {
        let _s = log.span_kv(&AskPhase::Load, [("source", source.label())]).entered();
        source.load().await?
    };

    let system_message = args
        .system
        .clone()
        .unwrap_or_else(|| ASK_SYSTEM_PROMPT.to_string());
    let client_cfg = OpenAiConfig::from_env();
    let model_name = args
        .llm
        .model
        .clone()
        .unwrap_or_else(|| client_cfg.model.clone());

    if args.dry_run {
        let plan = AskPlan {
            question: &args.question,
            system_message: &system_message,
            context: build_plan(&source, &text, cfg.budget, &model_name)?,
        };
        log.info(format!(
            "📝 Dry run — {} chars of context, {} first-level chunk(s); skipping LLM calls",
            plan.context.input_chars, plan.context.first_level_chunks
        ));
        log.plan(&plan)?;
        return Ok(());
    }

    let reduced = {
        let _s = log.span(&AskPhase::Reduce).entered();
        reduce_with_llm(&log, &text, cfg.budget, client_cfg.clone(), &args.llm, cancel.clone()).await?
    };
    if cancel.is_cancelled() {
        anyhow::bail!("cancelled before asking the question");
    }

    let client = OpenAiClient::new(client_cfg).context("init OpenAI client")?;
    let request = build_request(&args, &model_name, &system_message, &reduced.text);

    let _call_span = log.span(&AskPhase::CallLlm).entered();
    log.info("🧠 Calling chat completion endpoint");
    let response = match client.complete(request).await {
        Ok(resp) => resp,
        Err(err) => {
            match &err {
                LlmError::MissingApiKey => {
                    log.warn("⚠️  Missing OPENAI_API_KEY — set it or use --dry-run / OPENAI_BASE_URL for a compatible proxy.");
                }
                LlmError::Status { status, message } => {
                    log.warn(format!("⚠️  API error {} — {}", status, message));
                }
                LlmError::Timeout => {
                    log.warn("⚠️  Request timed out — consider retrying or increasing OPENAI_TIMEOUT_SECS.");
                }
                _ => {
                    log.error("request failed — see error details below.");
                }
            }
            return Err(anyhow::Error::new(err).context("call chat completion"));
        }
    };
    drop(_call_span);

    let answer = response.content.trim().to_string();
    if response.was_truncated() {
        log.warn("⚠️  Answer hit the token limit and may be cut off — raise --max-tokens.");
    }
    if let Some(usage) = &response.usage {
        log.info_kv("📊 usage", [
            ("prompt_tokens", format!("{:?}", usage.prompt_tokens)),
            ("completion_tokens", format!("{:?}", usage.completion_tokens)),
            ("finish_reason", format!("{:?}", response.finish_reason)),
        ]);
    }

    let _out_span = log.span(&AskPhase::Output).entered();
    if !json_output() {
        println!("{answer}");
    }
    let result = AskResult {
        question: &args.question,
        model: model_name,
        answer: &answer,
        context_chars: char_len(&reduced.text),
        levels: reduced.levels,
        summarize_calls: reduced.calls,
        finish_reason: response.finish_reason,
        usage: response.usage,
    };
    log.result(&result, Some(Meta::since(t0)))?;
    Ok(())
}

fn build_request(args: &AskCmd, model: &str, system: &str, context: &str) -> ChatRequest {
    ChatRequest::new(system, build_ask_prompt(&args.question, context))
        .with_model(Some(model.to_string()))
        .with_max_tokens(args.llm.max_tokens.or(Some(1024)))
        .with_temperature(args.llm.temperature)
}

pub fn build_ask_prompt(question: &str, context: &str) -> String {
    format!("Course content (summarized):\n{}\n\nPrompt:\n{}", context.trim_end(), question)
}
