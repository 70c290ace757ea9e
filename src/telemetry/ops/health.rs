use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Health;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Check }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Check => "check",
    }}
    fn span(&self) -> Span { match self {
        Phase::Check => info_span!("check"),
    }}
}

impl OpMarker for Health {
    const NAME: &'static str = "health";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("health") }
}
