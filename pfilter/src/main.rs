use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use pfilter::{
    clock::ClockNano,
    report::{describe, Reporter},
    source::{CapturedFrame, HexSource, PcapSource},
    trace::LogTracer,
};
use pfilter_filter::Interpretor;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filter expression, e.g. `icmp` or `tcp and dport[22]`.
    #[arg(default_value = "icmp")]
    filter: String,

    /// Legacy pcap capture of Ethernet frames to classify.
    #[arg(short, long, conflicts_with = "hex", required_unless_present = "hex")]
    pcap: Option<PathBuf>,

    /// Hex encoded Ethernet frame to classify, can be repeated.
    #[arg(short = 'x', long)]
    hex: Vec<String>,

    /// Size of the pcap read buffer, must hold the largest frame.
    #[arg(long, default_value_t = 65536)]
    snaplen: usize,

    /// Trace the source address and match time of every matching frame.
    #[arg(short, long)]
    trace: bool,

    /// Log which part of the filter decided every frame.
    #[arg(short, long)]
    explain: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let default_level = if args.trace || args.explain {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let interpretor = Interpretor::parse(&args.filter)
        .with_context(|| format!("invalid filter `{}`", args.filter))?;
    info!("filter: {:?}", interpretor.expr());

    let mut reporter = Reporter::new(interpretor, ClockNano::default()).with_explain(args.explain);
    if args.trace {
        reporter = reporter.with_tracer(LogTracer);
    }

    let mut on_frame = |captured: CapturedFrame<'_>| {
        if captured.data.len() < captured.orig_len {
            warn!(
                "frame truncated by the capture: {}/{} bytes",
                captured.data.len(),
                captured.orig_len
            );
        }
        if reporter.process(&captured) {
            println!(
                "{}.{:06} {}",
                captured.ts.as_secs(),
                captured.ts.subsec_micros(),
                describe(captured.data)
            );
        }
    };

    let count = if let Some(path) = &args.pcap {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut source = PcapSource::new(BufReader::new(file), args.snaplen)?;
        source.for_each_frame(&mut on_frame)?
    } else {
        let source = HexSource::parse(&args.hex)?;
        source.for_each_frame(&mut on_frame)
    };

    info!("read {} frames", count);
    info!("{}", reporter.summary());

    Ok(())
}
