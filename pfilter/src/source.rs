//! Frame sources feeding the classifier.
//!
//! Frames come either from a legacy pcap capture or from hex strings given on
//! the command line. Both hand out raw Ethernet frames, the capture itself is
//! left to other tools.

use std::io::Read;
use std::time::Duration;

use log::{debug, trace};
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, Linktype, PcapBlockOwned, PcapError};
use pfilter_filter::Filterable;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid hex frame: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("unsupported link type {0}, only ethernet captures are supported")]
    LinkType(i32),
    #[error("pcap error: {0}")]
    Pcap(String),
}

/// A frame borrowed from a source, with its capture time.
#[derive(Debug, Clone, Copy)]
pub struct CapturedFrame<'a> {
    /// Capture time since the epoch, zero for frames without one.
    pub ts: Duration,
    /// Length of the frame on the wire, which can exceed the captured bytes.
    pub orig_len: usize,
    pub data: &'a [u8],
}

impl Filterable for CapturedFrame<'_> {
    fn frame(&self) -> &[u8] {
        self.data
    }
}

/// Decodes a frame written as hex octets.
///
/// Whitespace, `:` and `-` separators are ignored so both `0800` and
/// `08:00` are accepted.
pub fn parse_hex_frame(input: &str) -> Result<Vec<u8>, SourceError> {
    let digits = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect::<String>();

    Ok(hex::decode(digits)?)
}

/// Frames given as hex strings.
#[derive(Debug, Clone, Default)]
pub struct HexSource {
    frames: Vec<Vec<u8>>,
}

impl HexSource {
    pub fn parse<S: AsRef<str>>(inputs: &[S]) -> Result<Self, SourceError> {
        let frames = inputs
            .iter()
            .map(|input| parse_hex_frame(input.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn for_each_frame<F>(&self, mut f: F) -> usize
    where
        F: FnMut(CapturedFrame<'_>),
    {
        for data in &self.frames {
            f(CapturedFrame {
                ts: Duration::ZERO,
                orig_len: data.len(),
                data,
            });
        }

        self.frames.len()
    }
}

/// Reads Ethernet frames out of a legacy pcap capture.
pub struct PcapSource<R: Read> {
    reader: LegacyPcapReader<R>,
    /// Set by the file header, the sub-second timestamp field then holds
    /// nanoseconds instead of microseconds.
    nanosecond: bool,
}

impl<R: Read> PcapSource<R> {
    /// `capacity` is the size of the read buffer, it must hold the largest frame.
    pub fn new(input: R, capacity: usize) -> Result<Self, SourceError> {
        let reader = LegacyPcapReader::new(capacity, input)
            .map_err(|err| SourceError::Pcap(format!("{err:?}")))?;

        Ok(Self {
            reader,
            nanosecond: false,
        })
    }

    /// Calls `f` for every frame of the capture, in capture order, and returns
    /// the number of frames read.
    pub fn for_each_frame<F>(&mut self, mut f: F) -> Result<usize, SourceError>
    where
        F: FnMut(CapturedFrame<'_>),
    {
        let mut count = 0usize;

        loop {
            match self.reader.next() {
                Ok((offset, block)) => {
                    match block {
                        PcapBlockOwned::LegacyHeader(hdr) => {
                            debug!(
                                "pcap header version={}.{} snaplen={} linktype={}",
                                hdr.version_major, hdr.version_minor, hdr.snaplen, hdr.network.0
                            );
                            if hdr.network != Linktype::ETHERNET {
                                return Err(SourceError::LinkType(hdr.network.0));
                            }
                            self.nanosecond = hdr.is_nanosecond_precision();
                        }
                        PcapBlockOwned::Legacy(block) => {
                            count += 1;
                            trace!(
                                "frame #{} caplen={} origlen={}",
                                count,
                                block.caplen,
                                block.origlen
                            );
                            f(CapturedFrame {
                                ts: timestamp(block.ts_sec, block.ts_usec, self.nanosecond),
                                orig_len: block.origlen as usize,
                                data: block.data,
                            });
                        }
                        PcapBlockOwned::NG(_) => {
                            return Err(SourceError::Pcap("unexpected pcapng block".to_owned()));
                        }
                    }
                    self.reader.consume(offset);
                }
                Err(PcapError::Eof) => break,
                Err(PcapError::Incomplete(_)) => {
                    self.reader
                        .refill()
                        .map_err(|err| SourceError::Pcap(format!("{err:?}")))?;
                }
                Err(err) => return Err(SourceError::Pcap(format!("{err:?}"))),
            }
        }

        Ok(count)
    }
}

fn timestamp(secs: u32, fraction: u32, nanosecond: bool) -> Duration {
    let nanos = if nanosecond {
        fraction
    } else {
        fraction.saturating_mul(1000)
    };

    Duration::new(u64::from(secs), 0) + Duration::from_nanos(u64::from(nanos))
}
