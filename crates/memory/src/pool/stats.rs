//! Pool statistics

use core::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared by the pool implementations
#[derive(Debug, Default)]
pub struct PoolStats {
    rented: AtomicU64,
    hits: AtomicU64,
    created: AtomicU64,
    returned: AtomicU64,
    declined: AtomicU64,
}

impl PoolStats {
    pub(crate) fn record_rent(&self, hit: bool) {
        self.rented.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.created.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_return(&self, accepted: bool) {
        if accepted {
            self.returned.fetch_add(1, Ordering::Relaxed);
        } else {
            self.declined.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of the counters
    #[must_use]
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            rented: self.rented.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            declined: self.declined.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`PoolStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Total rent calls
    pub rented: u64,
    /// Rents served from retained objects
    pub hits: u64,
    /// Rents that had to allocate
    pub created: u64,
    /// Returns the pool accepted
    pub returned: u64,
    /// Returns the pool declined
    pub declined: u64,
}

impl PoolStatsSnapshot {
    /// Fraction of rents served without allocating
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.rented == 0 {
            0.0
        } else {
            self.hits as f64 / self.rented as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = PoolStats::default();
        stats.record_rent(false);
        stats.record_rent(true);
        stats.record_return(true);
        stats.record_return(false);

        let snap = stats.snapshot();
        assert_eq!(snap.rented, 2);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.created, 1);
        assert_eq!(snap.returned, 1);
        assert_eq!(snap.declined, 1);
        assert!((snap.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_hit_rate() {
        assert_eq!(PoolStatsSnapshot::default().hit_rate(), 0.0);
    }
}
