use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, info, Level, Span};

use crate::output::types::Meta;
use crate::pipeline::reduce::ReduceObserver;

use super::emit;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker: Send + Sync + 'static {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

/// Per-command logging handle. In JSON log mode every event carries `op`.
pub struct LogCtx<O: OpMarker> {
    json: bool,
    _op: PhantomData<O>,
}

macro_rules! op_event {
    ($ctx:expr, $level:expr, $msg:expr) => {
        if $ctx.json {
            tracing::event!($level, op = O::NAME, "{}", $msg)
        } else {
            tracing::event!($level, "{}", $msg)
        }
    };
    ($ctx:expr, $level:expr, $msg:expr, $kv:expr) => {
        if $ctx.json {
            tracing::event!($level, op = O::NAME, details = %kv_to_string($kv), "{}", $msg)
        } else {
            tracing::event!($level, "{}", $msg)
        }
    };
}

impl<O: OpMarker> LogCtx<O> {
    pub fn new(json: bool) -> Self {
        Self { json, _op: PhantomData }
    }

    /// Root span for the whole command; the start event lists the invocation's knobs.
    pub fn root_span_kv<'a>(&self, fields: impl IntoIterator<Item = (&'a str, String)>) -> Span {
        let details = kv_to_string(fields);
        info!(op = O::NAME, details = %details, "start");
        O::root_span()
    }

    pub fn span(&self, phase: &O::Phase) -> Span {
        phase.span()
    }

    pub fn span_kv<'a>(&self, phase: &O::Phase, fields: impl IntoIterator<Item = (&'a str, String)>) -> Span {
        let details = kv_to_string(fields);
        info!(op = O::NAME, phase = phase.name(), details = %details, "phase");
        phase.span()
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        op_event!(self, Level::INFO, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        op_event!(self, Level::WARN, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        op_event!(self, Level::ERROR, msg.as_ref());
    }

    pub fn info_kv<'a>(&self, msg: &str, kv: impl IntoIterator<Item = (&'a str, String)>) {
        op_event!(self, Level::INFO, msg, kv);
    }

    pub fn debug_kv<'a>(&self, msg: &str, kv: impl IntoIterator<Item = (&'a str, String)>) {
        op_event!(self, Level::DEBUG, msg, kv);
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> {
        emit::print_plan(O::NAME, plan, None)
    }

    pub fn result<T: Serialize>(&self, result: &T, meta: Option<Meta>) -> Result<()> {
        emit::print_result(O::NAME, result, meta)
    }
}

// Any op context can watch a reduction; levels at info, per-chunk calls at debug.
impl<O: OpMarker> ReduceObserver for LogCtx<O> {
    fn on_level(&self, level: usize, input_chars: usize, chunk_count: usize) {
        if self.json { info!(op = O::NAME, level, input_chars, chunk_count, "reduce_level"); }
        else { info!("🔁 Level {} — {} chars in {} chunk(s)", level, input_chars, chunk_count); }
    }

    fn on_chunk(&self, level: usize, index: usize, count: usize) {
        if self.json { debug!(op = O::NAME, level, index, count, "summarize_chunk"); }
        else { debug!("  summarizing chunk {}/{} (level {})", index + 1, count, level); }
    }
}

fn kv_to_string<'a>(kv: impl IntoIterator<Item = (&'a str, String)>) -> String {
    kv.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ")
}
