//! IPv6 address and prefix arithmetic.

mod addr;

pub use addr::{Ipv6AddrExt, Ipv6AddrScope, Ipv6LongestPrefixTable, Ipv6Prefix, Ipv6PrefixParsingError};
