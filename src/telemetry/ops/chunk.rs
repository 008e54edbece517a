use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Chunk;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Split, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Load => "load",
        Phase::Split => "split",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::Load => info_span!("load"),
        Phase::Split => info_span!("split"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Chunk {
    const NAME: &'static str = "chunk";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("chunk") }
}
