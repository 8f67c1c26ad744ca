//! Page pool for bounding in-flight pipelines
//!
//! Provides a shared concurrency limit for page pipelines:
//! - Slot acquisition (waits when the pool is full)
//! - Automatic release when a slot guard drops
//! - Pool statistics and monitoring
//!
//! One pool is shared by every category of a run, so the limit applies to
//! the run as a whole. Slots are granted in arrival order but pipelines
//! complete in any order.

use crate::error::PoolError;
use parking_lot::Mutex;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots handed out
    pub dispatched: usize,
    /// Slots returned
    pub completed: usize,
    /// Currently held slots
    pub active: usize,
    /// Highest simultaneous `active`
    pub peak_active: usize,
}

/// Held pool slot; released on drop
#[derive(Debug)]
pub struct PageSlot<'a> {
    _permit: SemaphorePermit<'a>,
    stats: &'a Mutex<PoolStats>,
}

impl Drop for PageSlot<'_> {
    fn drop(&mut self) {
        let mut stats = self.stats.lock();
        stats.active = stats.active.saturating_sub(1);
        stats.completed += 1;
    }
}

/// Bounded pool of page pipeline slots
#[derive(Debug)]
pub struct PagePool {
    /// Maximum in-flight pipelines
    max_size: usize,
    /// Slot permits
    permits: Semaphore,
    /// Statistics
    stats: Mutex<PoolStats>,
}

impl PagePool {
    /// Create new page pool
    ///
    /// A `max_size` of zero is raised to one.
    #[inline]
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            max_size,
            permits: Semaphore::new(max_size),
            stats: Mutex::new(PoolStats::default()),
        }
    }

    /// Wait for a free slot
    ///
    /// # Errors
    /// - `PoolError::Closed` if the pool was closed
    pub async fn acquire(&self) -> Result<PageSlot<'_>, PoolError> {
        let permit = self.permits.acquire().await.map_err(|_| PoolError::Closed)?;

        let mut stats = self.stats.lock();
        stats.dispatched += 1;
        stats.active += 1;
        stats.peak_active = stats.peak_active.max(stats.active);
        drop(stats);

        Ok(PageSlot {
            _permit: permit,
            stats: &self.stats,
        })
    }

    /// Stop handing out slots; pending and future acquires fail
    #[inline]
    pub fn close(&self) {
        self.permits.close();
    }

    /// Get pool statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        *self.stats.lock()
    }

    /// Maximum in-flight pipelines
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Currently free slots
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for PagePool {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::time::Duration;

    #[tokio::test]
    async fn page_pool_acquire_and_release() {
        let pool = PagePool::new(2);

        let slot1 = pool.acquire().await.unwrap();
        let _slot2 = pool.acquire().await.unwrap();
        assert_eq!(pool.available(), 0);

        // Third acquire waits
        let third = tokio::time::timeout(Duration::from_millis(20), pool.acquire()).await;
        assert!(third.is_err());

        drop(slot1);
        let slot3 = tokio::time::timeout(Duration::from_millis(20), pool.acquire()).await;
        assert!(slot3.is_ok());
    }

    #[tokio::test]
    async fn page_pool_stats() {
        let pool = PagePool::new(2);

        let slot = pool.acquire().await.unwrap();
        let stats = pool.stats();
        assert_eq!(stats.active, 1);
        assert_eq!(stats.dispatched, 1);

        drop(slot);
        let stats = pool.stats();
        assert_eq!(stats.active, 0);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn page_pool_bounds_concurrency() {
        let pool = PagePool::new(3);

        let work = (0..12).map(|_| async {
            let _slot = pool.acquire().await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        });
        join_all(work).await;

        let stats = pool.stats();
        assert_eq!(stats.dispatched, 12);
        assert_eq!(stats.completed, 12);
        assert!(stats.peak_active <= 3);
        assert!(stats.peak_active >= 1);
    }

    #[tokio::test]
    async fn closed_pool_rejects() {
        let pool = PagePool::new(1);
        pool.close();
        assert!(matches!(pool.acquire().await, Err(PoolError::Closed)));
    }

    #[test]
    fn zero_size_is_raised() {
        assert_eq!(PagePool::new(0).max_size(), 1);
    }
}
