//! Diagnostic tracing of matched frames.
//!
//! The classifier itself never writes anything. Whoever wants a trace of the
//! matches hands a [Tracer] and a [Clock] to the component reporting them.

use std::fmt;

use log::debug;
use pfilter_common::view_ethernet;

use crate::clock::Clock;

/// Sink for diagnostic messages.
pub trait Tracer {
    fn trace(&self, args: fmt::Arguments<'_>);
}

/// Forwards trace messages to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&self, args: fmt::Arguments<'_>) {
        debug!(target: "pfilter::trace", "{}", args);
    }
}

/// Traces the match time and source hardware address of `frame`.
pub fn trace_match<T, C>(tracer: &T, clock: &C, frame: &[u8])
where
    T: Tracer + ?Sized,
    C: Clock + ?Sized,
{
    let ts = clock.now().as_nanos();

    match view_ethernet(frame) {
        Ok(eth) => tracer.trace(format_args!(
            "ts={} src={} ethertype={:#06x}",
            ts, eth.source, eth.ethertype
        )),
        Err(err) => tracer.trace(format_args!("ts={} {}", ts, err)),
    }
}
