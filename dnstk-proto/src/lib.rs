mod core;
pub mod dns;
pub mod io;

pub use crate::core::{DnsError, ErrorKind};
