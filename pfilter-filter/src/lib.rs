use peg::{error::ParseError, str::LineCol};

mod frontend;
mod interpretor;
pub mod predicate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use frontend::*;
pub use interpretor::*;
pub use predicate::{
    is_ethertype, is_icmp, is_ipv4, is_tcp_from_port, is_tcp_to_port, is_transport,
};

/// Error returned when a filter expression does not parse.
pub type Error = ParseError<LineCol>;

/// A captured frame that can be run through a filter.
pub trait Filterable {
    /// Raw link layer bytes, starting with the Ethernet header.
    fn frame(&self) -> &[u8];
}

impl Filterable for [u8] {
    fn frame(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> Filterable for [u8; N] {
    fn frame(&self) -> &[u8] {
        self
    }
}

impl Filterable for Vec<u8> {
    fn frame(&self) -> &[u8] {
        self
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn frame(&self) -> &[u8] {
        (**self).frame()
    }
}
