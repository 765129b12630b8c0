use pfilter_common::{IpProto, ETH_P_ARP};

/// The expression of the filter language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    EtherType(u16),
    Ipv4,

    /// IPv4 transport protocol number.
    Protocol(u8),

    /// TCP destination port.
    DstPort(u16),
    /// TCP source port.
    SrcPort(u16),
    /// TCP source or destination port.
    Port(u16),

    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

peg::parser!(pub grammar parser() for str {

    pub rule filter() -> Expr
        = logic()

    rule operand() -> Expr
        = ipv4() / arp() / ether() / icmp() / tcp() / udp() / proto() / ports()

    rule ipv4() -> Expr
        = _ "ipv4" _ { Expr::Ipv4 }

    rule arp() -> Expr
        = _ "arp" _ { Expr::EtherType(ETH_P_ARP) }

    rule ether() -> Expr
        = _ "ether[" n:number16() "]" _ { Expr::EtherType(n) }

    rule icmp() -> Expr
        = _ "icmp" _ { Expr::Protocol(IpProto::Icmp.number()) }

    rule tcp() -> Expr
        = _ "tcp" _ { Expr::Protocol(IpProto::Tcp.number()) }

    rule udp() -> Expr
        = _ "udp" _ { Expr::Protocol(IpProto::Udp.number()) }

    rule proto() -> Expr
        = _ "proto[" n:number8() "]" _ { Expr::Protocol(n) }

    rule ports() -> Expr
        = port() / dst_port() / src_port()

    rule port() -> Expr
        = _ "port[" n:number16() "]" _ { Expr::Port(n) }

    rule dst_port() -> Expr
        = _ "dport[" n:number16() "]" _ { Expr::DstPort(n) }

    rule src_port() -> Expr
        = _ "sport[" n:number16() "]" _ { Expr::SrcPort(n) }

    rule number16() -> u16
        = "0x" n:$(['0'..='9' | 'a'..='f' | 'A'..='F']+) {? u16::from_str_radix(n, 16).or(Err("invalid 16 bits number")) }
        / n:$(['0'..='9']+) {? n.parse::<u16>().or(Err("invalid 16 bits number")) }

    rule number8() -> u8
        = "0x" n:$(['0'..='9' | 'a'..='f' | 'A'..='F']+) {? u8::from_str_radix(n, 16).or(Err("invalid 8 bits number")) }
        / n:$(['0'..='9']+) {? n.parse::<u8>().or(Err("invalid 8 bits number")) }

    rule logic() -> Expr = precedence!{
      a:(@) _ "or" _ b:@ { Expr::Or(Box::new(a), Box::new(b)) }
      a:(@) _ "and" _ b:@ { Expr::And(Box::new(a), Box::new(b)) }
      --
      _ "not" !['a'..='z' | '0'..='9' | '['] _ a:@ { Expr::Not(Box::new(a)) }
      --
      s: operand() { s }
      _ "(" _ e:logic() _ ")" _ { e }
    }

    rule _() =  quiet!{[' ' | '\t']*}
});
