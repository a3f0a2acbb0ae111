//! Object pool for short-lived records
//!
//! Released records are kept (up to a retain limit) and handed back out by
//! `acquire`, so steady-state explosions stop allocating.

#[derive(Debug, Clone)]
pub struct Pool<T> {
    free: Vec<T>,
    retain: usize,
}

impl<T: Default> Pool<T> {
    /// Pool that keeps at most `retain` released records
    pub fn with_retain(retain: usize) -> Self {
        Self {
            free: Vec::new(),
            retain,
        }
    }

    /// Take a recycled record, or a fresh default one
    pub fn acquire(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Return a record; dropped if the pool is already full
    pub fn release(&mut self, item: T) {
        if self.free.len() < self.retain {
            self.free.push(item);
        }
    }

    /// Records ready for reuse
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn retain_limit(&self) -> usize {
        self.retain
    }

    /// Drop every retained record
    pub fn clear(&mut self) {
        self.free.clear();
        self.free.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_acquire_reuses_released() {
        let mut pool: Pool<Vec<u8>> = Pool::with_retain(4);
        let mut item = pool.acquire();
        item.push(42);
        pool.release(item);
        assert_eq!(pool.idle(), 1);

        let reused = pool.acquire();
        assert_eq!(reused, vec![42]);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_clear() {
        let mut pool: Pool<u32> = Pool::with_retain(8);
        pool.release(1);
        pool.release(2);
        pool.clear();
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.acquire(), 0);
    }

    proptest! {
        #[test]
        fn prop_idle_never_exceeds_retain(retain in 0usize..64, releases in 0usize..256) {
            let mut pool: Pool<u32> = Pool::with_retain(retain);
            for i in 0..releases {
                pool.release(i as u32);
            }
            prop_assert_eq!(pool.idle(), releases.min(retain));
        }
    }
}
