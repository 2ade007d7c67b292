//! Error and outcome types for the NDP engine (ambient error-handling
//! convention: small enums implementing [`std::error::Error`], composed into
//! `io::Result` at collaborator boundaries — no `thiserror`).

use std::{error, fmt, io};

/// Failure modes of the neighbor cache (C1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The cache has no free slot and no entry was evictable (all entries
    /// are `REACHABLE`/`PROBE` with pending traffic).
    PoolFull,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolFull => write!(f, "neighbor cache is full"),
        }
    }
}

impl error::Error for CacheError {}

impl From<CacheError> for io::Error {
    fn from(e: CacheError) -> Self {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

/// Resolution failures (§7 "Resolution failures"), surfaced to the caller
/// at the `Unresolved` boundary of [`ResolveOutcome`] instead of the raw
/// [`CacheError`] so the two error taxonomies in §7 stay distinct: `NoRoute`
/// / `NeighborUnreachable` for protocol-level resolution failure, `PoolFull`
/// for resource exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// No default router exists and `dst` does not match any on-link
    /// prefix or link-local scope; cached as a negative destination-cache
    /// entry so repeated sends don't re-walk the router list (§4.5).
    NoRoute,
    /// The neighbor cache has no free slot and no entry was evictable.
    PoolFull,
    /// The entry's per-neighbor transmit queue was already at its
    /// configured cap; the new payload was dropped rather than queued
    /// (§4.1 `enqueue`).
    QueueFull,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRoute => write!(f, "no route to destination"),
            Self::PoolFull => write!(f, "neighbor cache is full"),
            Self::QueueFull => write!(f, "per-neighbor transmit queue is full"),
        }
    }
}

impl error::Error for ResolveError {}

impl From<CacheError> for ResolveError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::PoolFull => Self::PoolFull,
        }
    }
}

/// The outcome of a resolve request (C7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome<L> {
    /// A link-layer address is already known and may be used immediately.
    Resolved(L),
    /// A link-layer address is known but its entry is `STALE`; it may be
    /// used immediately while reachability is reconfirmed in the
    /// background.
    StaleResolved(L),
    /// No link-layer address is known yet; resolution has been kicked off
    /// (or was already in flight) and the caller's payload was queued.
    Pending,
    /// Resolution could not even be started or the payload could not be
    /// queued; see [`ResolveError`] for the specific reason.
    Unresolved(ResolveError),
}

/// The terminal result of a Duplicate Address Detection run (C8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DadOutcome {
    /// No conflicting Neighbor Advertisement/Solicitation was observed
    /// within the probe window; the address may be assigned.
    Unique,
    /// A conflicting message was observed; the address must not be used.
    Duplicate,
}

/// Configuration validation failure (C9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    OutOfRange { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { field } => write!(f, "{field} is out of its allowed range"),
        }
    }
}

impl error::Error for ConfigError {}

/// Reasons an inbound NDP message is dropped before being applied to any
/// component state (§4.6 / §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// The IPv6 hop limit was not 255 (messages must be generated on-link).
    HopLimitNotMax,
    /// A Neighbor/Router Advertisement or Solicitation targeted a multicast
    /// address.
    TargetIsMulticast,
    /// A Router Solicitation's source was unspecified but it carried a
    /// source link-layer-address option.
    SllaWithUnspecifiedSource,
    /// An option's length field was zero.
    ZeroLengthOption,
    /// The message was shorter than its fixed header.
    Truncated,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HopLimitNotMax => write!(f, "hop limit was not 255"),
            Self::TargetIsMulticast => write!(f, "target address is multicast"),
            Self::SllaWithUnspecifiedSource => {
                write!(f, "source link-layer option present with unspecified source")
            }
            Self::ZeroLengthOption => write!(f, "option length field was zero"),
            Self::Truncated => write!(f, "message shorter than its fixed header"),
        }
    }
}

impl error::Error for MessageError {}

impl From<MessageError> for io::Error {
    fn from(e: MessageError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}
