use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct List;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Fetch, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Fetch => "fetch",
        Phase::Render => "render",
    }}
    fn span(&self) -> Span { match self {
        Phase::Fetch => info_span!("fetch"),
        Phase::Render => info_span!("render"),
    }}
}

impl OpMarker for List {
    const NAME: &'static str = "list";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("list") }
}
