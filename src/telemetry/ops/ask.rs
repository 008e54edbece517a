use tracing::{info_span, Span};

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Ask;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Load,
    Reduce,
    CallLlm,
    Output,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Reduce => "reduce",
            Phase::CallLlm => "call_llm",
            Phase::Output => "output",
        }
    }

    fn span(&self) -> Span {
        match self {
            Phase::Load => info_span!("load"),
            Phase::Reduce => info_span!("reduce"),
            Phase::CallLlm => info_span!("call_llm"),
            Phase::Output => info_span!("output"),
        }
    }
}

impl OpMarker for Ask {
    const NAME: &'static str = "ask";
    type Phase = Phase;

    fn root_span() -> Span {
        info_span!("ask")
    }
}
