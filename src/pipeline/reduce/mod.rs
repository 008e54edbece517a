pub mod summarizer;

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

use crate::pipeline::chunk::logic::{char_len, chunk_text};
use crate::pipeline::error::PipelineError;

pub use summarizer::{LlmSummarizer, LlmSummarizerConfig, Summarizer};

/// Receives progress while a reduction runs. Both hooks default to no-ops.
pub trait ReduceObserver: Send + Sync {
    fn on_level(&self, _level: usize, _input_chars: usize, _chunk_count: usize) {}
    fn on_chunk(&self, _level: usize, _index: usize, _count: usize) {}
}

/// Counts levels and summarize calls while forwarding to another observer.
pub struct CountingObserver<'a> {
    inner: &'a dyn ReduceObserver,
    levels: AtomicUsize,
    calls: AtomicUsize,
}

impl<'a> CountingObserver<'a> {
    pub fn new(inner: &'a dyn ReduceObserver) -> Self {
        Self { inner, levels: AtomicUsize::new(0), calls: AtomicUsize::new(0) }
    }

    pub fn levels(&self) -> usize {
        self.levels.load(Ordering::Relaxed)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ReduceObserver for CountingObserver<'_> {
    fn on_level(&self, level: usize, input_chars: usize, chunk_count: usize) {
        self.levels.fetch_add(1, Ordering::Relaxed);
        self.inner.on_level(level, input_chars, chunk_count);
    }

    fn on_chunk(&self, level: usize, index: usize, count: usize) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.on_chunk(level, index, count);
    }
}

/// Drives chunk -> summarize -> concatenate levels until the text fits `budget`.
pub struct Reducer<'a, S: ?Sized> {
    summarizer: &'a S,
    budget: usize,
    observer: Option<&'a dyn ReduceObserver>,
    cancel: Option<CancellationToken>,
}

impl<'a, S: Summarizer + ?Sized> Reducer<'a, S> {
    pub fn new(summarizer: &'a S, budget: usize) -> Self {
        Self { summarizer, budget, observer: None, cancel: None }
    }

    pub fn with_observer(mut self, observer: &'a dyn ReduceObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub async fn reduce(&self, text: &str) -> Result<String, PipelineError> {
        if self.budget == 0 {
            return Err(PipelineError::InvalidBudget { budget: self.budget });
        }

        let mut current = text.to_string();
        let mut level = 0usize;
        loop {
            self.check_cancel(level)?;

            let input_chars = char_len(&current);
            if input_chars <= self.budget {
                return Ok(current);
            }

            let chunks = chunk_text(&current, self.budget)?;
            if let Some(obs) = self.observer {
                obs.on_level(level, input_chars, chunks.len());
            }
            tracing::debug!(level, input_chars, chunks = chunks.len(), "reduce level");

            let mut combined = self.summarize_level(level, &chunks).await?;
            // the reduced text is the level text without its final separator
            if combined.ends_with('\n') {
                combined.pop();
            }
            let output_chars = char_len(&combined);
            if output_chars <= self.budget {
                return Ok(combined);
            }
            if output_chars >= input_chars {
                return Err(PipelineError::NoProgress { level, input_chars, output_chars });
            }

            current = combined;
            level += 1;
        }
    }

    /// Summarize every chunk in order, one call at a time, each summary followed by `\n`.
    pub(crate) async fn summarize_level(
        &self,
        level: usize,
        chunks: &[String],
    ) -> Result<String, PipelineError> {
        let mut combined = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            self.check_cancel(level)?;
            if let Some(obs) = self.observer {
                obs.on_chunk(level, index, chunks.len());
            }
            let summary = self
                .summarizer
                .summarize(chunk)
                .await
                .map_err(|err| PipelineError::SummarizationFailed {
                    level,
                    chunk_index: index,
                    source: Box::new(err),
                })?;
            combined.push_str(&summary);
            combined.push('\n');
        }
        Ok(combined)
    }

    fn check_cancel(&self, level: usize) -> Result<(), PipelineError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(PipelineError::Cancelled { level }),
            _ => Ok(()),
        }
    }
}

/// Plain form: reduce `text` to at most `budget` chars with no observer or cancellation.
pub async fn reduce<S: Summarizer + ?Sized>(
    text: &str,
    budget: usize,
    summarizer: &S,
) -> Result<String, PipelineError> {
    Reducer::new(summarizer, budget).reduce(text).await
}
