//! Builders of Ethernet frames for tests.

use pfilter_common::{IpProto, ETH_P_ARP, ETH_P_IP};

/// Builds an Ethernet frame carrying an IPv4 header and a transport header.
///
/// The network and transport headers are always emitted, whatever the
/// ethertype, so that gating on outer layers can be observed.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    destination_mac: [u8; 6],
    source_mac: [u8; 6],
    ethertype: u16,
    ihl: u8,
    protocol: u8,
    source_port: u16,
    destination_port: u16,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self {
            destination_mac: [0x02, 0x42, 0xac, 0x11, 0x00, 0x02],
            source_mac: [0x00, 0x1b, 0x21, 0x0a, 0xff, 0x9c],
            ethertype: ETH_P_IP,
            ihl: 5,
            protocol: IpProto::Tcp.number(),
            source_port: 54321,
            destination_port: 22,
        }
    }
}

impl FrameBuilder {
    /// An ICMP echo request.
    pub fn icmp() -> Self {
        Self::default().protocol(IpProto::Icmp.number())
    }

    /// A TCP SYN to `port`.
    pub fn tcp(port: u16) -> Self {
        Self::default().destination_port(port)
    }

    /// An ARP ethertype followed by bytes that would read as TCP to port 22.
    pub fn arp() -> Self {
        Self::default().ethertype(ETH_P_ARP)
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn source_mac(mut self, mac: [u8; 6]) -> Self {
        self.source_mac = mac;
        self
    }

    /// Header length in words. Values above 5 pad the header with options.
    pub fn ihl(mut self, ihl: u8) -> Self {
        self.ihl = ihl & 0x0F;
        self
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn source_port(mut self, port: u16) -> Self {
        self.source_port = port;
        self
    }

    pub fn destination_port(mut self, port: u16) -> Self {
        self.destination_port = port;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let options_len = (usize::from(self.ihl) * 4).saturating_sub(20);
        let transport = self.transport();
        let total_length = (20 + options_len + transport.len()) as u16;

        let mut frame = Vec::with_capacity(14 + usize::from(total_length));

        frame.extend_from_slice(&self.destination_mac);
        frame.extend_from_slice(&self.source_mac);
        frame.extend_from_slice(&self.ethertype.to_be_bytes());

        frame.push(0x40 | self.ihl);
        frame.push(0);
        frame.extend_from_slice(&total_length.to_be_bytes());
        frame.extend_from_slice(&0x1c46u16.to_be_bytes());
        frame.extend_from_slice(&0x4000u16.to_be_bytes());
        frame.push(64);
        frame.push(self.protocol);
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(&[192, 168, 1, 32]);
        frame.extend_from_slice(&[10, 0, 0, 1]);
        // NOP options.
        frame.resize(frame.len() + options_len, 0x01);

        frame.extend_from_slice(&transport);
        frame
    }

    fn transport(&self) -> Vec<u8> {
        if self.protocol == IpProto::Tcp.number() {
            let mut tcp = Vec::with_capacity(20);
            tcp.extend_from_slice(&self.source_port.to_be_bytes());
            tcp.extend_from_slice(&self.destination_port.to_be_bytes());
            tcp.extend_from_slice(&1u32.to_be_bytes());
            tcp.extend_from_slice(&0u32.to_be_bytes());
            tcp.extend_from_slice(&0x5002u16.to_be_bytes());
            tcp.extend_from_slice(&64240u16.to_be_bytes());
            tcp.extend_from_slice(&[0, 0, 0, 0]);
            tcp
        } else if self.protocol == IpProto::Icmp.number() {
            vec![8, 0, 0xf7, 0xff, 0, 1, 0, 0]
        } else {
            vec![0; 8]
        }
    }
}
