use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Detail;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Fetch, Render, Export }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Fetch => "fetch",
        Phase::Render => "render",
        Phase::Export => "export",
    }}
    fn span(&self) -> Span { match self {
        Phase::Fetch => info_span!("fetch"),
        Phase::Render => info_span!("render"),
        Phase::Export => info_span!("export"),
    }}
}

impl OpMarker for Detail {
    const NAME: &'static str = "detail";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("detail") }
}
