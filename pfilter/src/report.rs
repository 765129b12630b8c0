use std::fmt::{self, Write};
use std::time::Duration;

use log::debug;

use pfilter_common::{view_ethernet, view_ipv4, view_tcp, IpProto, ETH_HDR_LEN};
use pfilter_filter::{Filterable, Interpretor};

use crate::clock::{Clock, Timestamp};
use crate::trace::{trace_match, Tracer};

/// Totals of one classification run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub seen: u64,
    pub matched: u64,
    pub matched_bytes: u64,
    pub elapsed: Duration,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} frames matched ({}) in {:?}",
            self.matched,
            self.seen,
            humansize::format_size(self.matched_bytes, humansize::DECIMAL),
            self.elapsed,
        )
    }
}

/// Runs frames through a filter and keeps the totals.
///
/// The optional tracer receives one message per match, stamped by the clock.
pub struct Reporter<C: Clock> {
    interpretor: Interpretor,
    clock: C,
    tracer: Option<Box<dyn Tracer>>,
    explain: bool,
    started: Timestamp,
    summary: Summary,
}

impl<C: Clock> Reporter<C> {
    pub fn new(interpretor: Interpretor, clock: C) -> Self {
        let started = clock.now();
        Self {
            interpretor,
            clock,
            tracer: None,
            explain: false,
            started,
            summary: Summary::default(),
        }
    }

    pub fn with_tracer<T: Tracer + 'static>(mut self, tracer: T) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Logs the leaf of the filter that decided each frame.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Classifies one frame and returns whether it matched.
    pub fn process<F: Filterable + ?Sized>(&mut self, f: &F) -> bool {
        let frame = f.frame();
        self.summary.seen += 1;

        let explanation = self.interpretor.explain(frame);
        if self.explain {
            let outcome = match explanation.outcome {
                Some(true) => "match",
                Some(false) => "no match",
                None => "unreadable",
            };
            debug!(
                target: "pfilter::explain",
                "frame #{} {} bytes: {} by {:?}",
                self.summary.seen,
                frame.len(),
                outcome,
                explanation.leaf
            );
        }

        if !explanation.matched() {
            return false;
        }

        self.summary.matched += 1;
        self.summary.matched_bytes += frame.len() as u64;
        if let Some(tracer) = &self.tracer {
            trace_match(tracer.as_ref(), &self.clock, frame);
        }

        true
    }

    pub fn summary(&self) -> Summary {
        Summary {
            elapsed: self.started.saturating_elapsed_since(&self.clock.now()),
            ..self.summary
        }
    }
}

/// One line description of the headers of a frame, for display.
pub fn describe(frame: &[u8]) -> String {
    let eth = match view_ethernet(frame) {
        Ok(eth) => eth,
        Err(_) => return format!("truncated frame, {} bytes", frame.len()),
    };

    let mut out = format!("{} > {}", eth.source, eth.destination);
    if !eth.is_ipv4() {
        let _ = write!(out, " ethertype {:#06x}", eth.ethertype);
        return out;
    }

    let ip = match view_ipv4(frame, ETH_HDR_LEN) {
        Ok(ip) => ip,
        Err(_) => {
            out.push_str(" ipv4 truncated");
            return out;
        }
    };

    let _ = write!(out, " ipv4 {} > {}", ip.source(), ip.destination());
    match IpProto::try_from(ip.protocol) {
        Ok(IpProto::Tcp) if ip.is_header_len_valid() => {
            match view_tcp(frame, ip.payload_offset(ETH_HDR_LEN)) {
                Ok(tcp) => {
                    let _ = write!(out, " tcp {} > {}", tcp.source_port, tcp.destination_port);
                }
                Err(_) => out.push_str(" tcp truncated"),
            }
        }
        Ok(IpProto::Icmp) => out.push_str(" icmp"),
        Ok(IpProto::Udp) => out.push_str(" udp"),
        _ => {
            let _ = write!(out, " proto {}", ip.protocol);
        }
    }
    let _ = write!(out, ", {} bytes", frame.len());

    out
}
