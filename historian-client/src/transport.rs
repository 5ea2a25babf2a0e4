//! The call boundary to the historian.

use crate::error::{NativeCode, TransportError};
use crate::point::PointId;
use crate::snapshot::{BatchPut, SnapshotPut};

// ------------------------------------------------------------------ //
//  Trait                                                              //
// ------------------------------------------------------------------ //

/// Blocking call/response access to a historian.
///
/// Each method is one round trip and mirrors one native entry point. A
/// returned [`NativeCode`] of zero means success; interpreting non-zero codes
/// is left to [`Session`](crate::Session). `Err` is reserved for calls that
/// could not be issued at all.
pub trait HistorianTransport {
    fn set_server_node(&mut self, name: &str) -> Result<NativeCode, TransportError>;

    fn find_point(&mut self, name: &str) -> Result<(NativeCode, PointId), TransportError>;

    fn put_snapshot(&mut self, put: &SnapshotPut) -> Result<NativeCode, TransportError>;

    /// `item_codes` receives one status per item. Implementations reject a
    /// buffer whose length differs from `batch.count()` via
    /// [`check_item_codes`].
    fn put_snapshots(
        &mut self,
        batch: &BatchPut,
        item_codes: &mut [NativeCode],
    ) -> Result<NativeCode, TransportError>;
}

/// Ensure `item_codes` has exactly one slot per batch item.
pub fn check_item_codes(batch: &BatchPut, item_codes: &[NativeCode]) -> Result<(), TransportError> {
    if item_codes.len() != batch.count() {
        return Err(TransportError::ItemCodesLength {
            expected: batch.count(),
            got: item_codes.len(),
        });
    }
    Ok(())
}

impl<T: HistorianTransport + ?Sized> HistorianTransport for Box<T> {
    fn set_server_node(&mut self, name: &str) -> Result<NativeCode, TransportError> {
        (**self).set_server_node(name)
    }

    fn find_point(&mut self, name: &str) -> Result<(NativeCode, PointId), TransportError> {
        (**self).find_point(name)
    }

    fn put_snapshot(&mut self, put: &SnapshotPut) -> Result<NativeCode, TransportError> {
        (**self).put_snapshot(put)
    }

    fn put_snapshots(
        &mut self,
        batch: &BatchPut,
        item_codes: &mut [NativeCode],
    ) -> Result<NativeCode, TransportError> {
        (**self).put_snapshots(batch, item_codes)
    }
}

// ------------------------------------------------------------------ //
//  FakeTransport (for tests)                                          //
// ------------------------------------------------------------------ //

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, TransportCall, FAKE_POINT_NOT_FOUND};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Code returned by [`FakeTransport::find_point`] for unknown names.
    pub const FAKE_POINT_NOT_FOUND: NativeCode = -5;

    /// One call observed by a [`FakeTransport`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum TransportCall {
        SetServerNode(String),
        FindPoint(String),
        PutSnapshot(SnapshotPut),
        PutSnapshots(BatchPut),
    }

    #[derive(Debug, Default)]
    struct Script {
        connect_code: NativeCode,
        put_code: NativeCode,
        batch_code: NativeCode,
        batch_item_codes: Vec<NativeCode>,
        points: HashMap<String, PointId>,
        calls: Vec<TransportCall>,
    }

    /// In-memory transport that answers with scripted codes and records
    /// every call for assertions. Clones share the same script and log.
    #[derive(Debug, Default, Clone)]
    pub struct FakeTransport {
        script: Arc<Mutex<Script>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `name` resolve to `id`.
        pub fn with_point(self, name: &str, id: i32) -> Self {
            self.script
                .lock()
                .unwrap()
                .points
                .insert(name.to_string(), PointId(id));
            self
        }

        pub fn fail_connect(self, code: NativeCode) -> Self {
            self.set_connect_code(code);
            self
        }

        /// Change the code returned by later `set_server_node` calls, for
        /// every clone sharing this script.
        pub fn set_connect_code(&self, code: NativeCode) {
            self.script.lock().unwrap().connect_code = code;
        }

        pub fn fail_put(self, code: NativeCode) -> Self {
            self.script.lock().unwrap().put_code = code;
            self
        }

        /// Answer batch puts with aggregate `code` and the given per-item
        /// codes (missing items report zero).
        pub fn fail_batch(self, code: NativeCode, item_codes: Vec<NativeCode>) -> Self {
            {
                let mut script = self.script.lock().unwrap();
                script.batch_code = code;
                script.batch_item_codes = item_codes;
            }
            self
        }

        /// Non-destructive snapshot of calls made so far.
        pub fn calls(&self) -> Vec<TransportCall> {
            self.script.lock().unwrap().calls.clone()
        }

        /// Consume all calls recorded so far.
        pub fn drain(&self) -> Vec<TransportCall> {
            self.script.lock().unwrap().calls.drain(..).collect()
        }
    }

    impl HistorianTransport for FakeTransport {
        fn set_server_node(&mut self, name: &str) -> Result<NativeCode, TransportError> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(TransportCall::SetServerNode(name.to_string()));
            Ok(script.connect_code)
        }

        fn find_point(&mut self, name: &str) -> Result<(NativeCode, PointId), TransportError> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(TransportCall::FindPoint(name.to_string()));
            Ok(match script.points.get(name) {
                Some(id) => (0, *id),
                None => (FAKE_POINT_NOT_FOUND, PointId(0)),
            })
        }

        fn put_snapshot(&mut self, put: &SnapshotPut) -> Result<NativeCode, TransportError> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(TransportCall::PutSnapshot(*put));
            Ok(script.put_code)
        }

        fn put_snapshots(
            &mut self,
            batch: &BatchPut,
            item_codes: &mut [NativeCode],
        ) -> Result<NativeCode, TransportError> {
            check_item_codes(batch, item_codes)?;
            let mut script = self.script.lock().unwrap();
            script.calls.push(TransportCall::PutSnapshots(batch.clone()));
            for (slot, code) in item_codes.iter_mut().zip(&script.batch_item_codes) {
                *slot = *code;
            }
            Ok(script.batch_code)
        }
    }
}
