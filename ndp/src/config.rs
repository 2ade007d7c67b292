//! Tunable knobs for the engine (C9), with RFC 4861 defaults and the
//! validated ranges carried over from the embedded implementation this
//! engine's timing model was distilled from.

use std::time::Duration;

use ndp_types::icmpv6::{
    NDP_MAX_MULTICAST_SOLICIT, NDP_MAX_RTR_SOLICITATIONS, NDP_MAX_UNICAST_SOLICIT, NDP_REACHABLE_TIME,
    NDP_RETRANS_TIMER, NDP_RTR_SOLICITATION_INTERVAL,
};

use crate::error::ConfigError;

/// The maximum number of consecutive DAD failures a prefix may cause before
/// autoconfiguration gives up on it (supplemented from `net_dad.c`'s
/// `NET_DAD_MAX_COLLISIONS`).
pub const NET_DAD_MAX_COLLISIONS: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the neighbor cache arena, per interface.
    pub neighbor_cache_size: usize,
    /// How long a `STALE` entry may sit unused before it is garbage-
    /// collected (§4.9 "Neighbor-cache STALE timeout"). Unlike the other
    /// durations in this table this isn't itself a retransmit interval;
    /// it bounds how long a cold entry lingers in the cache.
    pub stale_timeout: Duration,
    /// Base reachable time (§4.2); the engine applies the RFC 4861 §6.3.4
    /// random factor in [0.5, 1.5] on top of this when (re)computing it
    /// from a Router Advertisement.
    pub reachable_time: Duration,
    /// Retransmission interval for Neighbor Solicitations during address
    /// resolution and NUD probing.
    pub retrans_timer: Duration,
    /// Delay before the first NUD probe after an entry goes `STALE` due to
    /// upper-layer traffic (§4.2; §4.9 "DELAY -> PROBE default" is 3s here,
    /// not RFC 4861's own 5s `DELAY_FIRST_PROBE_TIME`).
    pub delay_first_probe: Duration,
    /// Maximum Neighbor Solicitation retransmissions for multicast-address
    /// resolution (`INCOMPLETE`) before giving up.
    pub max_multicast_solicit: u32,
    /// Maximum Neighbor Solicitation retransmissions for unicast NUD
    /// (`PROBE`) before declaring an entry unreachable.
    pub max_unicast_solicit: u32,
    /// Maximum Router Solicitations sent on interface bring-up.
    pub max_rtr_solicitations: u32,
    /// Spacing between Router Solicitation retransmissions.
    pub rtr_solicitation_interval: Duration,
    /// Maximum consecutive DAD collisions tolerated for an autoconfigured
    /// prefix before autoconfiguration is abandoned for it.
    pub dad_max_collisions: u32,
    /// Number of DAD probes sent before declaring an address unique (§4.9
    /// "DAD solicitation max retries"; default 3, matching this engine's
    /// knob table rather than RFC 4862's own `DupAddrDetectTransmits`
    /// default of 1).
    pub dad_transmits: u32,
    /// Per-entry transmit queue cap (§4.1 `enqueue`, §4.9 "Per-entry
    /// tx-queue cap"), applied to every [`crate::cache::NeighborCache`]
    /// entry created from this point on.
    pub tx_queue_cap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            neighbor_cache_size: 64,
            stale_timeout: Duration::from_secs(600),
            reachable_time: NDP_REACHABLE_TIME,
            retrans_timer: NDP_RETRANS_TIMER,
            delay_first_probe: Duration::from_secs(3),
            max_multicast_solicit: NDP_MAX_MULTICAST_SOLICIT as u32,
            max_unicast_solicit: NDP_MAX_UNICAST_SOLICIT as u32,
            max_rtr_solicitations: NDP_MAX_RTR_SOLICITATIONS as u32,
            rtr_solicitation_interval: NDP_RTR_SOLICITATION_INTERVAL,
            dad_max_collisions: NET_DAD_MAX_COLLISIONS,
            dad_transmits: 3,
            tx_queue_cap: 2,
        }
    }
}

impl Config {
    pub fn set_reachable_time(&mut self, secs: u64) -> Result<(), ConfigError> {
        if !(1..=120).contains(&secs) {
            return Err(ConfigError::OutOfRange { field: "reachable_time" });
        }
        self.reachable_time = Duration::from_secs(secs);
        Ok(())
    }

    pub fn set_retrans_timer(&mut self, secs: u64) -> Result<(), ConfigError> {
        if !(1..=10).contains(&secs) {
            return Err(ConfigError::OutOfRange { field: "retrans_timer" });
        }
        self.retrans_timer = Duration::from_secs(secs);
        Ok(())
    }

    pub fn set_delay_first_probe(&mut self, secs: u64) -> Result<(), ConfigError> {
        if !(1..=10).contains(&secs) {
            return Err(ConfigError::OutOfRange { field: "delay_first_probe" });
        }
        self.delay_first_probe = Duration::from_secs(secs);
        Ok(())
    }

    pub fn set_neighbor_cache_size(&mut self, size: usize) -> Result<(), ConfigError> {
        if !(1..=4096).contains(&size) {
            return Err(ConfigError::OutOfRange { field: "neighbor_cache_size" });
        }
        self.neighbor_cache_size = size;
        Ok(())
    }

    pub fn set_dad_max_collisions(&mut self, n: u32) -> Result<(), ConfigError> {
        if !(1..=16).contains(&n) {
            return Err(ConfigError::OutOfRange { field: "dad_max_collisions" });
        }
        self.dad_max_collisions = n;
        Ok(())
    }

    pub fn set_stale_timeout(&mut self, secs: u64) -> Result<(), ConfigError> {
        if !(60..=600).contains(&secs) {
            return Err(ConfigError::OutOfRange { field: "stale_timeout" });
        }
        self.stale_timeout = Duration::from_secs(secs);
        Ok(())
    }

    pub fn set_max_multicast_solicit(&mut self, n: u32) -> Result<(), ConfigError> {
        if n > 5 {
            return Err(ConfigError::OutOfRange { field: "max_multicast_solicit" });
        }
        self.max_multicast_solicit = n;
        Ok(())
    }

    pub fn set_max_unicast_solicit(&mut self, n: u32) -> Result<(), ConfigError> {
        if n > 5 {
            return Err(ConfigError::OutOfRange { field: "max_unicast_solicit" });
        }
        self.max_unicast_solicit = n;
        Ok(())
    }

    /// `n = 0` disables DAD entirely (§8 "max_retries = 0 ... DAD with
    /// max=0 treats any address as immediately unique").
    pub fn set_dad_transmits(&mut self, n: u32) -> Result<(), ConfigError> {
        if n > 5 {
            return Err(ConfigError::OutOfRange { field: "dad_transmits" });
        }
        self.dad_transmits = n;
        Ok(())
    }

    pub fn set_tx_queue_cap(&mut self, cap: usize, buffer_pool_size: usize) -> Result<(), ConfigError> {
        if cap > buffer_pool_size {
            return Err(ConfigError::OutOfRange { field: "tx_queue_cap" });
        }
        self.tx_queue_cap = cap;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_their_own_valid_ranges() {
        let cfg = Config::default();
        assert!(cfg.reachable_time.as_secs() <= 120);
        assert!(cfg.retrans_timer.as_secs() <= 10);
    }

    #[test]
    fn setters_reject_out_of_range_values() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.set_reachable_time(0),
            Err(ConfigError::OutOfRange { field: "reachable_time" })
        );
        assert_eq!(
            cfg.set_retrans_timer(11),
            Err(ConfigError::OutOfRange { field: "retrans_timer" })
        );
        assert!(cfg.set_reachable_time(60).is_ok());
    }
}
