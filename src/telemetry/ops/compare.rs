use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Compare;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Validate, Fetch, Render, Export }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Validate => "validate",
        Phase::Fetch => "fetch",
        Phase::Render => "render",
        Phase::Export => "export",
    }}
    fn span(&self) -> Span { match self {
        Phase::Validate => info_span!("validate"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Render => info_span!("render"),
        Phase::Export => info_span!("export"),
    }}
}

impl OpMarker for Compare {
    const NAME: &'static str = "compare";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("compare") }
}
