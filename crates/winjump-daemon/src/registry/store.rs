use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::descriptor::WindowDescriptor;

struct Entry {
    descriptor: WindowDescriptor,
    /// Insertion order, used to break recency ties.
    seq: u64,
}

/// Issues strictly increasing timestamps, even within one clock tick.
#[derive(Debug, Default)]
struct RecencyClock {
    last: Option<DateTime<Utc>>,
}

impl RecencyClock {
    fn next(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}

/// Authoritative index of tracked windows, keyed by window id.
///
/// Pure bookkeeping: nothing here talks to the window source. The registry
/// is owned by a single worker, so `&mut self` methods are never interleaved.
#[derive(Default)]
pub struct WindowRegistry {
    entries: HashMap<String, Entry>,
    next_seq: u64,
    clock: RecencyClock,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh recency timestamp, later than any issued before.
    pub fn stamp(&mut self) -> DateTime<Utc> {
        self.clock.next()
    }

    pub fn get(&self, id: &str) -> Option<&WindowDescriptor> {
        self.entries.get(id).map(|entry| &entry.descriptor)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or update a descriptor. Returns true when the id was new.
    ///
    /// An update keeps the original insertion position and never moves
    /// `last_used_at` backwards.
    pub fn upsert(&mut self, descriptor: WindowDescriptor) -> bool {
        match self.entries.get_mut(&descriptor.id) {
            Some(entry) => {
                let last_used_at = entry.descriptor.last_used_at.max(descriptor.last_used_at);
                entry.descriptor = WindowDescriptor {
                    last_used_at,
                    ..descriptor
                };
                false
            }
            None => {
                let seq = self.allocate_seq();
                self.entries
                    .insert(descriptor.id.clone(), Entry { descriptor, seq });
                true
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<WindowDescriptor> {
        self.entries.remove(id).map(|entry| entry.descriptor)
    }

    /// Remove every descriptor matching `pred`, returned in insertion order.
    pub fn remove_by_predicate<F>(&mut self, mut pred: F) -> Vec<WindowDescriptor>
    where
        F: FnMut(&WindowDescriptor) -> bool,
    {
        let ids: Vec<String> = self
            .entries
            .values()
            .filter(|entry| pred(&entry.descriptor))
            .map(|entry| entry.descriptor.id.clone())
            .collect();

        let mut removed: Vec<Entry> = ids
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect();
        removed.sort_by_key(|entry| entry.seq);
        removed.into_iter().map(|entry| entry.descriptor).collect()
    }

    /// Remove all descriptors of a process. Returns how many were removed.
    pub fn remove_pid(&mut self, pid: u32) -> usize {
        let removed = self.remove_by_predicate(|d| d.pid == pid);
        if !removed.is_empty() {
            debug!(
                event = "daemon.registry.pid_evicted",
                pid = pid,
                count = removed.len(),
            );
        }
        removed.len()
    }

    /// Atomically replace the whole contents.
    ///
    /// Ids already present keep their insertion position and recency floor;
    /// new ids are appended in the given order.
    pub fn replace_all(&mut self, descriptors: Vec<WindowDescriptor>) {
        let mut previous = std::mem::take(&mut self.entries);
        let mut seen: HashSet<String> = HashSet::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if !seen.insert(descriptor.id.clone()) {
                continue;
            }
            let entry = match previous.remove(&descriptor.id) {
                Some(old) => Entry {
                    seq: old.seq,
                    descriptor: WindowDescriptor {
                        last_used_at: old.descriptor.last_used_at.max(descriptor.last_used_at),
                        ..descriptor
                    },
                },
                None => Entry {
                    seq: self.allocate_seq(),
                    descriptor,
                },
            };
            self.entries.insert(entry.descriptor.id.clone(), entry);
        }
    }

    /// Immutable copy ordered by `last_used_at` descending, ties by insertion order.
    pub fn snapshot_sorted_by_recency(&self) -> Vec<WindowDescriptor> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.descriptor
                .last_used_at
                .cmp(&a.descriptor.last_used_at)
                .then(a.seq.cmp(&b.seq))
        });
        entries
            .into_iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Descriptors of one process in insertion order.
    pub fn windows_for_pid(&self, pid: u32) -> Vec<WindowDescriptor> {
        let mut entries: Vec<&Entry> = self
            .entries
            .values()
            .filter(|entry| entry.descriptor.pid == pid)
            .collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
            .into_iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Earliest-inserted descriptor of `pid` with exactly this title.
    pub fn find_by_pid_and_title(&self, pid: u32, title: &str) -> Option<&WindowDescriptor> {
        self.entries
            .values()
            .filter(|entry| entry.descriptor.pid == pid && entry.descriptor.title == title)
            .min_by_key(|entry| entry.seq)
            .map(|entry| &entry.descriptor)
    }

    /// Bump recency of one descriptor. Returns the new timestamp.
    pub fn touch(&mut self, id: &str) -> Option<DateTime<Utc>> {
        if !self.entries.contains_key(id) {
            return None;
        }
        let stamp = self.clock.next();
        let entry = self.entries.get_mut(id)?;
        entry.descriptor.last_used_at = stamp;
        Some(stamp)
    }

    /// Bump recency of every descriptor of a process.
    pub fn touch_pid(&mut self, pid: u32) -> usize {
        let stamp = self.clock.next();
        let mut touched = 0;
        for entry in self.entries.values_mut() {
            if entry.descriptor.pid == pid {
                entry.descriptor.last_used_at = stamp;
                touched += 1;
            }
        }
        touched
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn allocate_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
