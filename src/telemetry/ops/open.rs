use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Open;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Resolve, Dispatch }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Resolve => "resolve",
        Phase::Dispatch => "dispatch",
    }}
    fn span(&self) -> Span { match self {
        Phase::Resolve => info_span!("resolve"),
        Phase::Dispatch => info_span!("dispatch"),
    }}
}

impl OpMarker for Open {
    const NAME: &'static str = "open";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("open") }
}
