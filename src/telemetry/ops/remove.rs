use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Remove;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Fetch, Confirm, Delete }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Fetch => "fetch",
        Phase::Confirm => "confirm",
        Phase::Delete => "delete",
    }}
    fn span(&self) -> Span { match self {
        Phase::Fetch => info_span!("fetch"),
        Phase::Confirm => info_span!("confirm"),
        Phase::Delete => info_span!("delete"),
    }}
}

impl OpMarker for Remove {
    const NAME: &'static str = "remove";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("remove") }
}
