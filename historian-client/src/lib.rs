//! Write-path client for a process historian.
//!
//! Resolves tag names to point ids and writes time-stamped values to them,
//! one at a time or in batches:
//!
//! ```text
//! Session::connect --> normalize_tag_name --> resolve_point --> write_snapshot(_batch)
//! ```
//!
//! The historian itself sits behind [`HistorianTransport`]. With the `piapi`
//! feature the crate provides a transport over the vendor library; the
//! `test-support` feature exports a scripted [`FakeTransport`].

pub mod config;
pub mod error;
pub mod point;
pub mod session;
pub mod snapshot;
pub mod tag;
pub mod timestamp;
pub mod transport;

#[cfg(feature = "piapi")]
pub mod piapi;

pub use config::ClientConfig;
pub use error::{HistorianError, NativeCode, Result, TransportError};
pub use point::PointId;
pub use session::{Session, MAX_POINT_NAME_LEN};
pub use snapshot::{BatchPut, FloatSnapshot, SnapshotBatch, SnapshotPut, SnapshotRecord};
pub use tag::{normalize_tag_name, TagNormalizer};
pub use timestamp::Timestamp;
pub use transport::{check_item_codes, HistorianTransport};

#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeTransport, TransportCall, FAKE_POINT_NOT_FOUND};

#[cfg(feature = "piapi")]
pub use piapi::PiApiTransport;
