use std::{fs, process::Command};

use pfilter::{clock::ClockNano, report::Reporter, source::PcapSource};
use pfilter_filter::{testing::FrameBuilder, Interpretor};

fn pcap_file(frames: &[Vec<u8>]) -> tempfile::NamedTempFile {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());

    for frame in frames {
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }

    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), out).unwrap();
    file
}

fn scenarios() -> Vec<Vec<u8>> {
    let mut arp = FrameBuilder::arp().build();
    arp.extend_from_slice(&[0xaa; 16]);

    vec![
        FrameBuilder::icmp().build(),
        FrameBuilder::tcp(22).build(),
        FrameBuilder::tcp(80).build(),
        arp,
        vec![0x08; 10],
        FrameBuilder::tcp(22).ihl(6).build(),
    ]
}

fn run(filter: &str, frames: &[Vec<u8>]) -> Vec<usize> {
    let file = pcap_file(frames);
    let mut source = PcapSource::new(fs::File::open(file.path()).unwrap(), 65536).unwrap();
    let mut reporter = Reporter::new(Interpretor::parse(filter).unwrap(), ClockNano::default());

    let mut matches = Vec::new();
    let mut index = 0;
    let count = source
        .for_each_frame(|captured| {
            if reporter.process(&captured) {
                matches.push(index);
            }
            index += 1;
        })
        .unwrap();

    assert_eq!(count, frames.len());
    assert_eq!(reporter.summary().seen, frames.len() as u64);
    assert_eq!(reporter.summary().matched, matches.len() as u64);
    matches
}

#[test]
fn icmp_capture() {
    assert_eq!(run("icmp", &scenarios()), vec![0]);
}

#[test]
fn ssh_capture() {
    assert_eq!(run("tcp and dport[22]", &scenarios()), vec![1, 5]);
    assert_eq!(run("dport[80]", &scenarios()), vec![2]);
}

#[test]
fn combined_capture() {
    assert_eq!(run("icmp or arp", &scenarios()), vec![0, 3]);
    assert_eq!(run("ipv4 and not tcp", &scenarios()), vec![0]);

    let mut frames = scenarios();
    let ssh = frames[1].clone();
    frames.push(ssh[..40].to_vec());
    assert_eq!(run("not dport[22]", &frames), vec![0, 2, 3]);
}

#[test]
fn cli_hex_frames() {
    let ssh = hex::encode(FrameBuilder::tcp(22).build());
    let http = hex::encode(FrameBuilder::tcp(80).build());

    let output = Command::new(env!("CARGO_BIN_EXE_pfilter"))
        .args(["tcp and dport[22]", "--hex", &ssh, "--hex", &http])
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("0.000000 "), "{stdout}");
    assert!(stdout.contains("tcp 54321 > 22"), "{stdout}");
}

#[test]
fn cli_negation_skips_truncated_frames() {
    let ssh = FrameBuilder::tcp(22).build();
    let http = hex::encode(FrameBuilder::tcp(80).build());

    let output = Command::new(env!("CARGO_BIN_EXE_pfilter"))
        .args([
            "tcp and not dport[22]",
            "--explain",
            "--hex",
            &hex::encode(&ssh[..40]),
            "--hex",
            &hex::encode(FrameBuilder::tcp(22).ihl(3).build()),
            "--hex",
            &http,
        ])
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.contains("tcp 54321 > 80"), "{stdout}");
}

#[test]
fn cli_rejects_bad_filter() {
    let output = Command::new(env!("CARGO_BIN_EXE_pfilter"))
        .args(["tcp and", "--hex", "00"])
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
