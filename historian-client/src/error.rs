//! Error types surfaced by the historian client.

use thiserror::Error;

use crate::point::PointId;
use crate::timestamp::Timestamp;

/// Raw status returned by a historian boundary call. Zero means success.
pub type NativeCode = i32;

/// Failure to move a call across the transport boundary at all, as opposed
/// to the historian answering with a non-zero [`NativeCode`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("argument for {call} contains an interior NUL byte")]
    InteriorNul { call: &'static str },
    #[error("batch of {0} items exceeds the native count range")]
    BatchTooLarge(usize),
    #[error("item code buffer holds {got} entries, batch has {expected}")]
    ItemCodesLength { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum HistorianError {
    #[error("piut_setservernode({server}) returned error {code}")]
    Connect { server: String, code: NativeCode },

    #[error("no historian server has been connected")]
    NotConnected,

    #[error("tag name '{0}' must contain at least one valid starting character")]
    InvalidTagName(String),

    #[error("historian point name {name} > {max} bytes not supported")]
    NameTooLong { name: String, max: usize },

    #[error("error finding historian point {name}, pipt_findpoint returned error {code}")]
    PointNotFound { name: String, code: NativeCode },

    #[error("pisn_putsnapshotx returned error {code}, point number {point_id}, ts {timestamp}, value {value}")]
    Write {
        point_id: PointId,
        value: f64,
        timestamp: Timestamp,
        code: NativeCode,
    },

    /// Aggregate batch failure. `index` is the last item whose own code was
    /// non-zero; `failing_indices` lists every such item in order.
    #[error("pisn_putsnapshotsx returned error {code}, item {index}, point number {point_id}, ts {timestamp}, value {value}, err {item_code}")]
    BatchWrite {
        code: NativeCode,
        index: usize,
        point_id: PointId,
        timestamp: Timestamp,
        value: f64,
        item_code: NativeCode,
        failing_indices: Vec<usize>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl HistorianError {
    /// Native status carried by the error, if the historian produced one.
    pub fn native_code(&self) -> Option<NativeCode> {
        match self {
            HistorianError::Connect { code, .. }
            | HistorianError::PointNotFound { code, .. }
            | HistorianError::Write { code, .. }
            | HistorianError::BatchWrite { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T, E = HistorianError> = std::result::Result<T, E>;
