pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use std::marker::PhantomData;
use std::time::Instant;

use ctx::{LogCtx, OpMarker};

fn ctx<O: OpMarker>() -> LogCtx<O> { LogCtx { json: config::logs_are_json(), started: Instant::now(), _marker: PhantomData } }

pub fn list() -> LogCtx<ops::list::List> { ctx() }
pub fn upload() -> LogCtx<ops::upload::Upload> { ctx() }
pub fn detail() -> LogCtx<ops::detail::Detail> { ctx() }
pub fn compare() -> LogCtx<ops::compare::Compare> { ctx() }
pub fn remove() -> LogCtx<ops::remove::Remove> { ctx() }
pub fn open() -> LogCtx<ops::open::Open> { ctx() }
pub fn health() -> LogCtx<ops::health::Health> { ctx() }
