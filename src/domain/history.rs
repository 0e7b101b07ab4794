// Rolling history buffer - Bounded window of recent readings
use super::reading::CanonicalReading;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;

/// Insertion-ordered readings, oldest first.
///
/// A reading whose `time` equals the newest stored `time` is a provider retry
/// and is dropped. Past `capacity`, the oldest entries are evicted.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    readings: VecDeque<CanonicalReading>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `reading` unless it repeats the newest entry's time.
    /// Returns whether the buffer changed.
    pub fn append(&mut self, reading: CanonicalReading) -> bool {
        if self
            .latest()
            .is_some_and(|last| last.time == reading.time)
        {
            return false;
        }

        self.readings.push_back(reading);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
        true
    }

    /// Replaces the whole window, keeping only the newest `capacity` entries.
    pub fn replace(&mut self, readings: Vec<CanonicalReading>) {
        let skip = readings.len().saturating_sub(self.capacity);
        self.readings = readings.into_iter().skip(skip).collect();
    }

    pub fn latest(&self) -> Option<&CanonicalReading> {
        self.readings.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalReading> {
        self.readings.iter()
    }

    pub fn to_vec(&self) -> Vec<CanonicalReading> {
        self.readings.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
