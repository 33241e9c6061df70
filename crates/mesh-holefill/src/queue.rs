//! Priority bucket queues for corner classification.
//!
//! Corners are partitioned into four buckets by their interior angle, one
//! per rule class. Within a bucket corners are ordered by ascending degree;
//! the buckets themselves are drained in fixed priority order (Rule 1
//! before Rule 2 before Rule 3). This is deliberately an approximate
//! priority structure, not a global min-heap: which corners get resolved
//! first shapes the output, so the bucket behavior is load-bearing.

use crate::angle::AngleId;

/// Rule class of a boundary corner, chosen by its interior angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleClass {
    /// Angle <= 75 degrees: close with one triangle.
    Rule1,
    /// Angle <= 135 degrees: split with one new vertex.
    Rule2,
    /// Angle < 180 degrees: widen with an offset vertex.
    Rule3,
    /// Angle >= 180 degrees: never drained by the main loop.
    Reflex,
}

impl RuleClass {
    /// Classify a degree value. Evaluated in fixed order, first match wins.
    pub fn classify(degree: f64) -> Self {
        if degree <= 75.0 {
            RuleClass::Rule1
        } else if degree <= 135.0 {
            RuleClass::Rule2
        } else if degree < 180.0 {
            RuleClass::Rule3
        } else {
            RuleClass::Reflex
        }
    }
}

/// One bucket: corners ordered by ascending degree.
#[derive(Debug, Default)]
pub struct RuleQueue {
    entries: Vec<(f64, AngleId)>,
}

impl RuleQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a corner, keeping ascending degree order. Equal degrees are
    /// kept in insertion order.
    pub fn insert(&mut self, degree: f64, id: AngleId) {
        let pos = self.entries.partition_point(|&(d, _)| d <= degree);
        self.entries.insert(pos, (degree, id));
    }

    /// Remove a specific corner. No-op if absent.
    pub fn remove(&mut self, id: AngleId) -> bool {
        if let Some(pos) = self.entries.iter().position(|&(_, e)| e == id) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove and return the corner of least degree.
    pub fn pop_smallest(&mut self) -> Option<AngleId> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0).1)
        }
    }

    /// Whether a specific corner is queued here.
    pub fn contains(&self, id: AngleId) -> bool {
        self.entries.iter().any(|&(_, e)| e == id)
    }
}

/// The four rule buckets. A corner lives in exactly one of them at a time.
#[derive(Debug, Default)]
pub struct QueueSet {
    pub rule1: RuleQueue,
    pub rule2: RuleQueue,
    pub rule3: RuleQueue,
    pub reflex: RuleQueue,
}

impl QueueSet {
    /// Create four empty buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a corner into the bucket matching its degree.
    pub fn insert(&mut self, degree: f64, id: AngleId) {
        self.bucket_mut(RuleClass::classify(degree)).insert(degree, id);
    }

    /// Remove a corner, using `degree` to pick its bucket. Falls back to
    /// scanning the remaining buckets if the degree was stale; idempotent
    /// if the corner is queued nowhere.
    pub fn remove(&mut self, degree: f64, id: AngleId) -> bool {
        if self.bucket_mut(RuleClass::classify(degree)).remove(id) {
            return true;
        }
        self.rule1.remove(id)
            || self.rule2.remove(id)
            || self.rule3.remove(id)
            || self.reflex.remove(id)
    }

    /// Whether a corner is queued in any bucket.
    pub fn contains(&self, id: AngleId) -> bool {
        self.rule1.contains(id)
            || self.rule2.contains(id)
            || self.rule3.contains(id)
            || self.reflex.contains(id)
    }

    /// Total corners queued across the three active rule buckets.
    pub fn rule_len(&self) -> usize {
        self.rule1.len() + self.rule2.len() + self.rule3.len()
    }

    fn bucket_mut(&mut self, class: RuleClass) -> &mut RuleQueue {
        match class {
            RuleClass::Rule1 => &mut self.rule1,
            RuleClass::Rule2 => &mut self.rule2,
            RuleClass::Rule3 => &mut self.rule3,
            RuleClass::Reflex => &mut self.reflex,
        }
    }
}
