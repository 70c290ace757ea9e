use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Upload;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Read, Send, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Read => "read",
        Phase::Send => "send",
        Phase::Render => "render",
    }}
    fn span(&self) -> Span { match self {
        Phase::Read => info_span!("read"),
        Phase::Send => info_span!("send"),
        Phase::Render => info_span!("render"),
    }}
}

impl OpMarker for Upload {
    const NAME: &'static str = "upload";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("upload") }
}
