//! Bounds checked views of the Ethernet, IPv4 and TCP headers of a frame.
//!
//! A view is decoded field by field out of a byte range that has been checked
//! against the frame length first, and owns the decoded values: nothing borrows
//! the frame once the constructor returns. Multi-byte fields travel in network
//! byte order and are converted to host order while decoding, which is a no-op
//! on big endian hosts and a byte swap on little endian ones.
//!
//! IP options and TCP options are never parsed, only skipped over through the
//! header length fields.

use core::net::Ipv4Addr;

use crate::types::{HeaderKind, IpProto, MacAddr, ETH_P_IP};

/// Length of an Ethernet II header.
pub const ETH_HDR_LEN: usize = 14;
/// Length of an IPv4 header without options.
pub const IPV4_HDR_LEN: usize = 20;
/// Length of a TCP header without options.
pub const TCP_HDR_LEN: usize = 20;

/// Error returned when a header view cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("{header} header at offset {offset} needs {required} bytes, frame holds {available}")]
    TooShort {
        header: HeaderKind,
        offset: usize,
        required: usize,
        available: usize,
    },
}

/// Returns the `N` bytes of `frame` starting at `offset`.
#[inline]
fn header_bytes<const N: usize>(
    frame: &[u8],
    offset: usize,
    header: HeaderKind,
) -> Result<&[u8; N], HeaderError> {
    offset
        .checked_add(N)
        .and_then(|end| frame.get(offset..end))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(HeaderError::TooShort {
            header,
            offset,
            required: N,
            available: frame.len(),
        })
}

#[inline]
fn be16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn be32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
fn mac(bytes: &[u8], at: usize) -> MacAddr {
    let mut addr = [0u8; MacAddr::LEN];
    addr.copy_from_slice(&bytes[at..at + MacAddr::LEN]);
    MacAddr(addr)
}

/// Ethernet II header, at the beginning of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address.
    pub destination: MacAddr,
    /// Source MAC address.
    pub source: MacAddr,
    /// Network layer protocol (host order).
    pub ethertype: u16,
}

impl EthernetHeader {
    pub const LEN: usize = ETH_HDR_LEN;

    /// Views the first 14 bytes of `frame`.
    pub fn parse(frame: &[u8]) -> Result<Self, HeaderError> {
        let bytes = header_bytes::<ETH_HDR_LEN>(frame, 0, HeaderKind::Ethernet)?;

        Ok(Self {
            destination: mac(bytes, 0),
            source: mac(bytes, 6),
            ethertype: be16(bytes, 12),
        })
    }

    #[inline]
    pub fn is_ipv4(&self) -> bool {
        self.ethertype == ETH_P_IP
    }
}

/// IPv4 header, without its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Version in the top nibble, header length in words in the bottom one.
    pub version_ihl: u8,
    pub tos: u8,
    pub total_length: u16,
    pub identification: u16,
    /// Flags in the top 3 bits, fragment offset in the rest.
    pub flags_frag_off: u16,
    pub ttl: u8,
    /// Transport protocol number.
    pub protocol: u8,
    pub checksum: u16,
    /// Source address (host order).
    pub src_addr: u32,
    /// Destination address (host order).
    pub dst_addr: u32,
}

impl Ipv4Header {
    /// Smallest legal value of the header length field, in 32 bits words.
    pub const MIN_IHL: u8 = 5;

    /// Views the 20 bytes of `frame` starting at `offset`.
    pub fn parse(frame: &[u8], offset: usize) -> Result<Self, HeaderError> {
        let bytes = header_bytes::<IPV4_HDR_LEN>(frame, offset, HeaderKind::Ipv4)?;

        Ok(Self {
            version_ihl: bytes[0],
            tos: bytes[1],
            total_length: be16(bytes, 2),
            identification: be16(bytes, 4),
            flags_frag_off: be16(bytes, 6),
            ttl: bytes[8],
            protocol: bytes[9],
            checksum: be16(bytes, 10),
            src_addr: be32(bytes, 12),
            dst_addr: be32(bytes, 16),
        })
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.version_ihl >> 4
    }

    /// Header length in 32 bits words.
    #[inline]
    pub fn ihl(&self) -> u8 {
        self.version_ihl & 0x0F
    }

    /// Header length in bytes, options included.
    #[inline]
    pub fn header_len(&self) -> usize {
        usize::from(self.ihl()) * 4
    }

    /// Whether the header length covers at least the fixed header.
    #[inline]
    pub fn is_header_len_valid(&self) -> bool {
        self.ihl() >= Self::MIN_IHL
    }

    /// Offset of the transport header, for a header viewed at `offset`.
    #[inline]
    pub fn payload_offset(&self, offset: usize) -> usize {
        offset.saturating_add(self.header_len())
    }

    #[inline]
    pub fn is_protocol(&self, proto: IpProto) -> bool {
        self.protocol == proto.number()
    }

    #[inline]
    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_addr)
    }

    #[inline]
    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_addr)
    }
}

/// TCP header, without its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence: u32,
    pub acknowledgment: u32,
    /// Data offset in the top nibble, control flags in the low 9 bits.
    pub data_offset_flags: u16,
    pub window: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// Views the 20 bytes of `frame` starting at `offset`.
    pub fn parse(frame: &[u8], offset: usize) -> Result<Self, HeaderError> {
        let bytes = header_bytes::<TCP_HDR_LEN>(frame, offset, HeaderKind::Tcp)?;

        Ok(Self {
            source_port: be16(bytes, 0),
            destination_port: be16(bytes, 2),
            sequence: be32(bytes, 4),
            acknowledgment: be32(bytes, 8),
            data_offset_flags: be16(bytes, 12),
            window: be16(bytes, 14),
            checksum: be16(bytes, 16),
            urgent_pointer: be16(bytes, 18),
        })
    }

    /// Header length in 32 bits words.
    #[inline]
    pub fn data_offset(&self) -> u8 {
        (self.data_offset_flags >> 12) as u8
    }

    #[inline]
    pub fn flags(&self) -> u16 {
        self.data_offset_flags & 0x01FF
    }
}

/// Views the Ethernet header at the start of `frame`.
#[inline]
pub fn view_ethernet(frame: &[u8]) -> Result<EthernetHeader, HeaderError> {
    EthernetHeader::parse(frame)
}

/// Views an IPv4 header at `offset`, usually [ETH_HDR_LEN].
#[inline]
pub fn view_ipv4(frame: &[u8], offset: usize) -> Result<Ipv4Header, HeaderError> {
    Ipv4Header::parse(frame, offset)
}

/// Views a TCP header at `offset`.
#[inline]
pub fn view_tcp(frame: &[u8], offset: usize) -> Result<TcpHeader, HeaderError> {
    TcpHeader::parse(frame, offset)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ETH: [u8; 14] = [
        0x02, 0x42, 0xac, 0x11, 0x00, 0x02, // dst
        0x00, 0x1b, 0x21, 0x0a, 0xff, 0x9c, // src
        0x08, 0x00, // IPv4
    ];

    const IPV4: [u8; 20] = [
        0x45, 0x10, 0x00, 0x3c, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06, 0xb1, 0xe6, 0xc0, 0xa8,
        0x01, 0x20, 0x01, 0x01, 0x01, 0x01,
    ];

    const TCP: [u8; 20] = [
        0xd4, 0x31, 0x00, 0x16, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x50, 0x02,
        0xfa, 0xf0, 0x12, 0x34, 0x00, 0x00,
    ];

    #[test]
    fn ethernet_view() {
        let hdr = view_ethernet(&ETH).unwrap();
        assert_eq!(
            hdr,
            EthernetHeader {
                destination: MacAddr([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]),
                source: MacAddr([0x00, 0x1b, 0x21, 0x0a, 0xff, 0x9c]),
                ethertype: 0x0800,
            }
        );
        assert!(hdr.is_ipv4());

        let mut arp = ETH;
        arp[12..14].copy_from_slice(&[0x08, 0x06]);
        assert!(!view_ethernet(&arp).unwrap().is_ipv4());
    }

    #[test]
    fn ethernet_too_short() {
        assert_eq!(
            view_ethernet(&ETH[..13]),
            Err(HeaderError::TooShort {
                header: HeaderKind::Ethernet,
                offset: 0,
                required: 14,
                available: 13,
            })
        );
        assert!(view_ethernet(&[]).is_err());
    }

    #[test]
    fn ipv4_view() {
        let frame = [&ETH[..], &IPV4[..]].concat();
        let hdr = view_ipv4(&frame, ETH_HDR_LEN).unwrap();

        assert_eq!(hdr.version(), 4);
        assert_eq!(hdr.ihl(), 5);
        assert_eq!(hdr.header_len(), 20);
        assert!(hdr.is_header_len_valid());
        assert_eq!(hdr.tos, 0x10);
        assert_eq!(hdr.total_length, 60);
        assert_eq!(hdr.identification, 0x1c46);
        assert_eq!(hdr.flags_frag_off, 0x4000);
        assert_eq!(hdr.ttl, 64);
        assert!(hdr.is_protocol(IpProto::Tcp));
        assert_eq!(hdr.checksum, 0xb1e6);
        assert_eq!(hdr.source(), Ipv4Addr::new(192, 168, 1, 32));
        assert_eq!(hdr.destination(), Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(hdr.payload_offset(ETH_HDR_LEN), 34);
    }

    #[test]
    fn ipv4_header_length_nibbles() {
        let mut ip = IPV4;

        ip[0] = 0x46;
        let hdr = view_ipv4(&ip, 0).unwrap();
        assert_eq!(hdr.version(), 4);
        assert_eq!(hdr.header_len(), 24);
        assert_eq!(hdr.payload_offset(ETH_HDR_LEN), 38);

        ip[0] = 0x43;
        let hdr = view_ipv4(&ip, 0).unwrap();
        assert_eq!(hdr.ihl(), 3);
        assert!(!hdr.is_header_len_valid());

        ip[0] = 0x6f;
        let hdr = view_ipv4(&ip, 0).unwrap();
        assert_eq!(hdr.version(), 6);
        assert_eq!(hdr.header_len(), 60);
    }

    #[test]
    fn ipv4_too_short() {
        let frame = [&ETH[..], &IPV4[..19]].concat();
        assert_eq!(
            view_ipv4(&frame, ETH_HDR_LEN),
            Err(HeaderError::TooShort {
                header: HeaderKind::Ipv4,
                offset: 14,
                required: 20,
                available: 33,
            })
        );
    }

    #[test]
    fn tcp_view() {
        let hdr = view_tcp(&TCP, 0).unwrap();
        assert_eq!(hdr.source_port, 54321);
        assert_eq!(hdr.destination_port, 22);
        assert_eq!(hdr.sequence, 1);
        assert_eq!(hdr.acknowledgment, 0);
        assert_eq!(hdr.data_offset(), 5);
        assert_eq!(hdr.flags(), 0x002);
        assert_eq!(hdr.window, 64240);
        assert_eq!(hdr.checksum, 0x1234);
        assert_eq!(hdr.urgent_pointer, 0);
    }

    #[test]
    fn tcp_port_byte_order() {
        let mut tcp = TCP;
        tcp[2..4].copy_from_slice(&[0x00, 0x17]);
        assert_eq!(view_tcp(&tcp, 0).unwrap().destination_port, 23);

        tcp[2..4].copy_from_slice(&[0x16, 0x00]);
        assert_eq!(view_tcp(&tcp, 0).unwrap().destination_port, 0x1600);
    }

    #[test]
    fn offset_overflow_is_too_short() {
        let err = view_tcp(&TCP, usize::MAX).unwrap_err();
        assert_eq!(
            err,
            HeaderError::TooShort {
                header: HeaderKind::Tcp,
                offset: usize::MAX,
                required: 20,
                available: 20,
            }
        );
        assert!(view_tcp(&TCP, 1).is_err());
    }

    #[test]
    fn error_display() {
        let err = view_ethernet(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ethernet header at offset 0 needs 14 bytes, frame holds 10"
        );
    }
}
