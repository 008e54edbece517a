use tracing::{info_span, Span};

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Summarize;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Load,
    Plan,
    Reduce,
    Output,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Plan => "plan",
            Phase::Reduce => "reduce",
            Phase::Output => "output",
        }
    }

    fn span(&self) -> Span {
        match self {
            Phase::Load => info_span!("load"),
            Phase::Plan => info_span!("plan"),
            Phase::Reduce => info_span!("reduce"),
            Phase::Output => info_span!("output"),
        }
    }
}

impl OpMarker for Summarize {
    const NAME: &'static str = "summarize";
    type Phase = Phase;

    fn root_span() -> Span {
        info_span!("summarize")
    }
}
