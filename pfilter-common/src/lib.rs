#![cfg_attr(not(test), no_std)]

pub mod headers;
pub mod types;

pub use headers::*;
pub use types::*;
