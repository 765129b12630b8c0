pub mod clock;
pub mod report;
pub mod source;
pub mod trace;
