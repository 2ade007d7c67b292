//! Wire types shared by the NDP engine: link-layer addresses, IPv6 prefix
//! arithmetic, and the byte-exact ICMPv6 Neighbor Discovery messages.

pub mod icmpv6;
pub mod ip;
pub mod mac;
pub mod queue;

pub use ip::{Ipv6AddrExt, Ipv6AddrScope, Ipv6LongestPrefixTable, Ipv6Prefix, Ipv6PrefixParsingError};
pub use mac::MacAddress;
