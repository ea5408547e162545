// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_timing --heading-base-level=0

//! Waymark Timing: a host-agnostic deadline queue.
//!
//! The interaction engine never sleeps or spawns. Work that must happen later
//! (a binding retry, the next eviction sweep) is scheduled into a
//! [`TimerQueue`] with an absolute deadline in host milliseconds. The host
//! asks for [`TimerQueue::next_deadline`], arranges to call back, and then
//! collects everything due with [`TimerQueue::pop_due`].
//!
//! Timers are cancellable. Cancellation is lazy: the heap entry stays until
//! it surfaces and is then skipped, so [`TimerQueue::cancel`] is O(1).
//!
//! Timers with equal deadlines fire in scheduling order.
//!
//! ## Minimal example
//!
//! ```rust
//! use waymark_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let retry = timers.schedule(300, "retry schools");
//! timers.schedule(30_000, "sweep");
//!
//! assert_eq!(timers.next_deadline(), Some(300));
//! assert!(timers.pop_due(299).is_empty());
//!
//! let due = timers.pop_due(300);
//! assert_eq!(due, [(retry, "retry schools")]);
//! assert_eq!(timers.next_deadline(), Some(30_000));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Reverse;

use hashbrown::HashMap;

/// Handle to a scheduled timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A min-queue of deadlines carrying payloads.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    /// `(deadline, id)`, earliest first. May hold cancelled ids.
    heap: BinaryHeap<Reverse<(u64, TimerId)>>,
    /// Payloads of live timers.
    live: HashMap<TimerId, T>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedules `payload` to fire at the absolute time `at`.
    pub fn schedule(&mut self, at: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((at, id)));
        self.live.insert(id, payload);
        id
    }

    /// Cancels a timer, returning its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let payload = self.live.remove(&id);
        if self.live.is_empty() {
            self.heap.clear();
        }
        payload
    }

    /// Cancels every timer whose payload matches `predicate`, returning how
    /// many were cancelled.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.live.len();
        self.live.retain(|_, payload| !predicate(payload));
        if self.live.is_empty() {
            self.heap.clear();
        }
        before - self.live.len()
    }

    /// Returns `true` if `id` is scheduled and has not fired or been cancelled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Returns the earliest live deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        // Cancelled entries can sit at the top; skip over them without popping.
        if let Some(Reverse((at, id))) = self.heap.peek()
            && self.live.contains_key(id)
        {
            return Some(*at);
        }
        self.heap
            .iter()
            .filter(|Reverse((_, id))| self.live.contains_key(id))
            .map(|Reverse((at, _))| *at)
            .min()
    }

    /// Removes and returns every live timer with a deadline at or before
    /// `now`, earliest first.
    pub fn pop_due(&mut self, now: u64) -> Vec<(TimerId, T)> {
        let mut due = Vec::new();
        while let Some(Reverse((at, id))) = self.heap.peek().copied() {
            if at > now {
                break;
            }
            self.heap.pop();
            if let Some(payload) = self.live.remove(&id) {
                due.push((id, payload));
            }
        }
        due
    }

    /// Number of live timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no timers are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}
