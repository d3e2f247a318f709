//! Rotating pool of API credentials.
//!
//! The provider throttles per key, so callers rotate to the next key on
//! auth/quota errors instead of backing off the whole run. Rotation is a
//! single atomic increment; concurrent readers simply see either the old
//! or the new index.

use std::sync::atomic::{AtomicUsize, Ordering};

pub struct KeyPool {
    keys: Vec<String>,
    index: AtomicUsize,
}

impl KeyPool {
    /// Build a pool from one or more keys. Empty pools are a config error.
    pub fn new(keys: Vec<String>) -> anyhow::Result<Self> {
        if keys.is_empty() {
            anyhow::bail!("KeyPool requires at least one API key");
        }
        Ok(Self {
            keys,
            index: AtomicUsize::new(0),
        })
    }

    pub fn current(&self) -> &str {
        let i = self.index.load(Ordering::Relaxed) % self.keys.len();
        &self.keys[i]
    }

    /// Advance to the next key, wrapping around. Returns the new active key.
    pub fn rotate(&self) -> &str {
        let i = self.index.fetch_add(1, Ordering::Relaxed) + 1;
        &self.keys[i % self.keys.len()]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_wraps_around() {
        let pool = KeyPool::new(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(pool.current(), "a");
        assert_eq!(pool.rotate(), "b");
        assert_eq!(pool.current(), "b");
        assert_eq!(pool.rotate(), "a");
        assert_eq!(pool.current(), "a");
    }

    #[test]
    fn single_key_pool_rotates_to_itself() {
        let pool = KeyPool::new(vec!["only".into()]).unwrap();
        assert_eq!(pool.rotate(), "only");
        assert_eq!(pool.current(), "only");
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(KeyPool::new(vec![]).is_err());
    }
}
