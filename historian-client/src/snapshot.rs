//! Snapshot records and the request shapes sent across the transport.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::point::PointId;
use crate::timestamp::Timestamp;

// ------------------------------------------------------------------ //
//  Caller-facing records                                              //
// ------------------------------------------------------------------ //

/// One value for one point at one time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub point_id: PointId,
    pub value: f64,
    pub timestamp: Timestamp,
}

/// A value with a wall-clock moment that has not been converted yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatSnapshot {
    pub point_id: PointId,
    pub value: f64,
    pub moment: NaiveDateTime,
}

impl From<FloatSnapshot> for SnapshotRecord {
    fn from(s: FloatSnapshot) -> Self {
        SnapshotRecord {
            point_id: s.point_id,
            value: s.value,
            timestamp: Timestamp::from(s.moment),
        }
    }
}

/// Parallel point ids, values and timestamps for one batch write.
///
/// Items are only ever added whole, so the three sequences always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotBatch {
    point_ids: Vec<PointId>,
    values: Vec<f64>,
    timestamps: Vec<Timestamp>,
}

impl SnapshotBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            point_ids: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            timestamps: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point_id: PointId, value: f64, timestamp: Timestamp) {
        self.point_ids.push(point_id);
        self.values.push(value);
        self.timestamps.push(timestamp);
    }

    pub fn len(&self) -> usize {
        self.point_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_ids.is_empty()
    }

    pub fn point_ids(&self) -> &[PointId] {
        &self.point_ids
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn get(&self, index: usize) -> Option<SnapshotRecord> {
        Some(SnapshotRecord {
            point_id: *self.point_ids.get(index)?,
            value: self.values[index],
            timestamp: self.timestamps[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = SnapshotRecord> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

impl Extend<SnapshotRecord> for SnapshotBatch {
    fn extend<I: IntoIterator<Item = SnapshotRecord>>(&mut self, iter: I) {
        for r in iter {
            self.push(r.point_id, r.value, r.timestamp);
        }
    }
}

impl FromIterator<SnapshotRecord> for SnapshotBatch {
    fn from_iter<I: IntoIterator<Item = SnapshotRecord>>(iter: I) -> Self {
        let mut batch = SnapshotBatch::new();
        batch.extend(iter);
        batch
    }
}

impl FromIterator<FloatSnapshot> for SnapshotBatch {
    fn from_iter<I: IntoIterator<Item = FloatSnapshot>>(iter: I) -> Self {
        iter.into_iter().map(SnapshotRecord::from).collect()
    }
}

// ------------------------------------------------------------------ //
//  Boundary request shapes                                            //
// ------------------------------------------------------------------ //

/// Arguments of a single put call. Only the real value and the timestamp
/// are ever set; integer value, binary size, status and flags stay zero and
/// no binary payload is sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotPut {
    pub point_id: PointId,
    pub value: f64,
    pub int_value: i32,
    pub binary_size: u32,
    pub status: i32,
    pub flags: i16,
    pub timestamp: Timestamp,
}

impl SnapshotPut {
    pub fn new(point_id: PointId, value: f64, timestamp: Timestamp) -> Self {
        Self {
            point_id,
            value,
            int_value: 0,
            binary_size: 0,
            status: 0,
            flags: 0,
            timestamp,
        }
    }
}

/// Arguments of a batch put call: one parallel sequence per native
/// parameter, all `count()` long.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPut {
    point_ids: Vec<PointId>,
    values: Vec<f64>,
    int_values: Vec<i32>,
    binary_sizes: Vec<u32>,
    statuses: Vec<i32>,
    flags: Vec<i16>,
    timestamps: Vec<Timestamp>,
}

impl BatchPut {
    pub fn new(batch: &SnapshotBatch) -> Self {
        let count = batch.len();
        Self {
            point_ids: batch.point_ids.clone(),
            values: batch.values.clone(),
            int_values: vec![0; count],
            binary_sizes: vec![0; count],
            statuses: vec![0; count],
            flags: vec![0; count],
            timestamps: batch.timestamps.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.point_ids.len()
    }

    pub fn point_ids(&self) -> &[PointId] {
        &self.point_ids
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn int_values(&self) -> &[i32] {
        &self.int_values
    }

    pub fn binary_sizes(&self) -> &[u32] {
        &self.binary_sizes
    }

    pub fn statuses(&self) -> &[i32] {
        &self.statuses
    }

    pub fn flags(&self) -> &[i16] {
        &self.flags
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Item `index` in single-put shape.
    pub fn item(&self, index: usize) -> Option<SnapshotPut> {
        Some(SnapshotPut {
            point_id: *self.point_ids.get(index)?,
            value: self.values[index],
            int_value: self.int_values[index],
            binary_size: self.binary_sizes[index],
            status: self.statuses[index],
            flags: self.flags[index],
            timestamp: self.timestamps[index],
        })
    }
}
