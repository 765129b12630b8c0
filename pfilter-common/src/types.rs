use core::fmt;

/// EtherType of an IPv4 payload.
pub const ETH_P_IP: u16 = 0x0800;
/// EtherType of an ARP payload.
pub const ETH_P_ARP: u16 = 0x0806;

/// Transport protocol numbers carried in the IPv4 header.
#[repr(u8)]
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IpProto {
    Icmp = 1,
    Tcp = 6,
    Udp = 17,
}

impl IpProto {
    #[inline]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

impl From<IpProto> for u8 {
    #[inline]
    fn from(proto: IpProto) -> u8 {
        proto.number()
    }
}

impl TryFrom<u8> for IpProto {
    type Error = u8;

    #[inline]
    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(Self::Icmp),
            6 => Ok(Self::Tcp),
            17 => Ok(Self::Udp),
            other => Err(other),
        }
    }
}

/// A 48 bits hardware address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const LEN: usize = 6;
}

/// Upper case hex octets separated by colons, `AA:BB:CC:DD:EE:FF`.
impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// The header a view was requested for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    Ethernet,
    Ipv4,
    Tcp,
}

impl HeaderKind {
    pub fn display(&self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Ipv4 => "ipv4",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Decision of a socket filter program for one frame.
#[repr(u64)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    Drop = 0,
    Accept = 1,
}

impl Verdict {
    #[inline]
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

impl From<bool> for Verdict {
    #[inline]
    fn from(matched: bool) -> Self {
        if matched {
            Self::Accept
        } else {
            Self::Drop
        }
    }
}

/// The return value of a socket filter program.
impl From<Verdict> for u64 {
    #[inline]
    fn from(verdict: Verdict) -> u64 {
        verdict as u64
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mac_addr_display() {
        let mac = MacAddr([0x00, 0x1b, 0x21, 0x0a, 0xff, 0x9c]);
        assert_eq!(mac.to_string(), "00:1B:21:0A:FF:9C");
        assert_eq!(MacAddr::default().to_string(), "00:00:00:00:00:00");
    }

    #[test]
    fn ip_proto_from_u8() {
        assert_eq!(IpProto::try_from(1), Ok(IpProto::Icmp));
        assert_eq!(IpProto::try_from(6), Ok(IpProto::Tcp));
        assert_eq!(IpProto::try_from(17), Ok(IpProto::Udp));
        assert_eq!(IpProto::try_from(47), Err(47));
        assert_eq!(u8::from(IpProto::Tcp), 6);
    }

    #[test]
    fn verdict_return_value() {
        assert_eq!(u64::from(Verdict::from(true)), 1);
        assert_eq!(u64::from(Verdict::from(false)), 0);
        assert!(Verdict::Accept.is_accept());
        assert!(!Verdict::Drop.is_accept());
    }
}
