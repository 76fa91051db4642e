use std::collections::HashMap;

use crate::bridge::Resolver;

/// Default wrap-around bound for nonces; stays well inside the integer range
/// JavaScript represents exactly.
pub const DEFAULT_NONCE_BOUND: u64 = 1 << 31;

/// In-flight requests keyed by nonce.
///
/// Nonces increase monotonically modulo the bound and are never reused
/// while still pending.
pub struct PendingRequests<T> {
    next: u64,
    bound: u64,
    pending: HashMap<u64, Resolver<T>>,
}

impl<T> PendingRequests<T> {
    pub fn new(bound: u64) -> Self {
        Self {
            next: 0,
            bound: bound.max(1),
            pending: HashMap::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() as u64 >= self.bound
    }

    /// Registers `resolver` under a fresh nonce. Returns `None` if every
    /// nonce below the bound is pending.
    pub fn insert(&mut self, resolver: Resolver<T>) -> Option<u64> {
        if self.is_full() {
            return None;
        }
        loop {
            let nonce = self.next;
            self.next = (self.next + 1) % self.bound;
            if !self.pending.contains_key(&nonce) {
                self.pending.insert(nonce, resolver);
                return Some(nonce);
            }
        }
    }

    /// Removes and returns the resolver waiting on `nonce`.
    pub fn take(&mut self, nonce: u64) -> Option<Resolver<T>> {
        self.pending.remove(&nonce)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
