//! Classification predicates over raw Ethernet frames.
//!
//! Each predicate walks the headers from the outside in: Ethernet at offset 0,
//! IPv4 right after it when the ethertype says so, then TCP after the IPv4
//! header and its options. The walk stops at the first layer that rules the
//! match out. A truncated or malformed header at any layer is a non-match, so
//! every predicate is total over all byte buffers.

use pfilter_common::{
    view_ethernet, view_ipv4, view_tcp, IpProto, Ipv4Header, TcpHeader, ETH_HDR_LEN,
};

/// IPv4 header of a frame.
///
/// `None` when a header is truncated, `Some(None)` for another ethertype.
fn ipv4(frame: &[u8]) -> Option<Option<Ipv4Header>> {
    let eth = view_ethernet(frame).ok()?;
    if !eth.is_ipv4() {
        return Some(None);
    }

    view_ipv4(frame, ETH_HDR_LEN).ok().map(Some)
}

/// TCP header of an IPv4 frame, found after the IPv4 options.
///
/// An IPv4 header length below 5 words is malformed and gives `None`, like a
/// truncated header.
fn tcp(frame: &[u8]) -> Option<Option<TcpHeader>> {
    let Some(ip) = ipv4(frame)? else {
        return Some(None);
    };
    if !ip.is_header_len_valid() {
        return None;
    }
    if !ip.is_protocol(IpProto::Tcp) {
        return Some(None);
    }

    view_tcp(frame, ip.payload_offset(ETH_HDR_LEN)).ok().map(Some)
}

/// Matches the ethertype, `None` when the Ethernet header is truncated.
pub fn match_ethertype(frame: &[u8], ethertype: u16) -> Option<bool> {
    view_ethernet(frame).ok().map(|eth| eth.ethertype == ethertype)
}

/// Matches IPv4 frames, `None` when a header is truncated.
pub fn match_ipv4(frame: &[u8]) -> Option<bool> {
    ipv4(frame).map(|ip| ip.is_some())
}

/// Matches the IPv4 transport protocol.
///
/// Only the fixed IPv4 header is read, the header length is not checked.
pub fn match_transport(frame: &[u8], protocol: u8) -> Option<bool> {
    ipv4(frame).map(|ip| ip.is_some_and(|ip| ip.protocol == protocol))
}

/// Runs `f` over the TCP header of the frame.
///
/// `Some(false)` for frames that are not TCP over IPv4, `None` when a header
/// is truncated or the IPv4 header length is malformed.
pub fn match_tcp<F>(frame: &[u8], f: F) -> Option<bool>
where
    F: FnOnce(&TcpHeader) -> bool,
{
    tcp(frame).map(|tcp| tcp.as_ref().is_some_and(f))
}

/// Returns true if the Ethernet header carries `ethertype`.
pub fn is_ethertype(frame: &[u8], ethertype: u16) -> bool {
    match_ethertype(frame, ethertype).unwrap_or(false)
}

/// Returns true for an IPv4 frame holding at least a complete fixed IPv4 header.
pub fn is_ipv4(frame: &[u8]) -> bool {
    match_ipv4(frame).unwrap_or(false)
}

/// Returns true if the IPv4 transport protocol is `protocol`.
pub fn is_transport(frame: &[u8], protocol: u8) -> bool {
    match_transport(frame, protocol).unwrap_or(false)
}

pub fn is_icmp(frame: &[u8]) -> bool {
    is_transport(frame, IpProto::Icmp.number())
}

/// Returns true for a TCP segment whose destination port is `port`.
///
/// `port` is in host order.
pub fn is_tcp_to_port(frame: &[u8], port: u16) -> bool {
    match_tcp(frame, |tcp| tcp.destination_port == port).unwrap_or(false)
}

/// Returns true for a TCP segment whose source port is `port`.
pub fn is_tcp_from_port(frame: &[u8], port: u16) -> bool {
    match_tcp(frame, |tcp| tcp.source_port == port).unwrap_or(false)
}
