//! Connection-bound access to a historian: connect, resolve, write.
//!
//! A [`Session`] owns the transport and remembers which server node it was
//! pointed at. Every operation is one blocking round trip and every method
//! takes `&mut self`: the server binding is shared state on the historian
//! side, so callers that share a session across threads must serialize
//! access themselves (for example behind a `Mutex`).

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{HistorianError, NativeCode, Result};
use crate::point::PointId;
use crate::snapshot::{BatchPut, SnapshotBatch, SnapshotPut};
use crate::tag::TagNormalizer;
use crate::timestamp::Timestamp;
use crate::transport::HistorianTransport;

/// Longest point name the lookup call accepts, in bytes as sent to the
/// native call.
pub const MAX_POINT_NAME_LEN: usize = 80;

pub struct Session<T> {
    transport: T,
    normalizer: TagNormalizer,
    server: Option<String>,
}

impl<T: HistorianTransport> Session<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            normalizer: TagNormalizer::new(config.point_prefix.clone()),
            server: None,
        }
    }

    /// Server node of the last successful [`connect`](Self::connect).
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.server.is_some()
    }

    pub fn normalizer(&self) -> &TagNormalizer {
        &self.normalizer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    // ------------------------------------------------------------------ //
    //  Connection gate                                                    //
    // ------------------------------------------------------------------ //

    /// Point the session at `server`. May be called again to re-point it;
    /// a failed call leaves the session disconnected.
    pub fn connect(&mut self, server: &str) -> Result<()> {
        debug!(server, "setting historian server node");
        self.server = None;

        let code = self.transport.set_server_node(server)?;
        if code != 0 {
            warn!(server, code, "piut_setservernode failed");
            return Err(HistorianError::Connect {
                server: server.to_string(),
                code,
            });
        }

        info!(server, "historian server node set");
        self.server = Some(server.to_string());
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.server.is_none() {
            return Err(HistorianError::NotConnected);
        }
        Ok(())
    }

    // ------------------------------------------------------------------ //
    //  Names and points                                                   //
    // ------------------------------------------------------------------ //

    /// Normalize a caller tag name and apply the configured prefix.
    pub fn normalize_tag_name(&self, raw: &str) -> Result<String> {
        self.normalizer.normalize(raw)
    }

    /// Look up an already normalized point name.
    pub fn resolve_point(&mut self, name: &str) -> Result<PointId> {
        self.ensure_connected()?;

        if name.len() > MAX_POINT_NAME_LEN {
            return Err(HistorianError::NameTooLong {
                name: name.to_string(),
                max: MAX_POINT_NAME_LEN,
            });
        }

        let (code, point_id) = self.transport.find_point(name)?;
        if code != 0 {
            warn!(name, code, "pipt_findpoint failed");
            return Err(HistorianError::PointNotFound {
                name: name.to_string(),
                code,
            });
        }

        debug!(name, %point_id, "resolved historian point");
        Ok(point_id)
    }

    /// Normalize `raw` and resolve the result. Returns the name that was
    /// looked up alongside its id.
    pub fn resolve_tag(&mut self, raw: &str) -> Result<(String, PointId)> {
        let name = self.normalize_tag_name(raw)?;
        let point_id = self.resolve_point(&name)?;
        Ok((name, point_id))
    }

    // ------------------------------------------------------------------ //
    //  Writes                                                             //
    // ------------------------------------------------------------------ //

    /// Write one value at `moment`, given in the historian's reporting zone.
    pub fn write_snapshot(
        &mut self,
        point_id: PointId,
        value: f64,
        moment: NaiveDateTime,
    ) -> Result<()> {
        self.ensure_connected()?;

        let timestamp = Timestamp::from(moment);
        let put = SnapshotPut::new(point_id, value, timestamp);

        let code = self.transport.put_snapshot(&put)?;
        if code != 0 {
            warn!(%point_id, code, "pisn_putsnapshotx failed");
            return Err(HistorianError::Write {
                point_id,
                value,
                timestamp,
                code,
            });
        }
        Ok(())
    }

    /// Write every item of `batch` in one call.
    ///
    /// When the aggregate call fails the error describes the last item whose
    /// own code is non-zero; `failing_indices` on the error lists all of
    /// them. An empty batch is not sent.
    pub fn write_snapshot_batch(&mut self, batch: &SnapshotBatch) -> Result<()> {
        self.ensure_connected()?;

        if batch.is_empty() {
            debug!("skipping empty snapshot batch");
            return Ok(());
        }

        let put = BatchPut::new(batch);
        let mut item_codes: Vec<NativeCode> = vec![0; put.count()];

        let code = self.transport.put_snapshots(&put, &mut item_codes)?;
        if code == 0 {
            debug!(count = put.count(), "snapshot batch written");
            return Ok(());
        }

        let failing_indices = failing_items(&item_codes);
        let index = failing_indices.last().copied().unwrap_or(0);
        let item_code = item_codes[index];
        warn!(
            code,
            count = put.count(),
            failed = failing_indices.len(),
            index,
            "pisn_putsnapshotsx failed"
        );

        Err(HistorianError::BatchWrite {
            code,
            index,
            point_id: batch.point_ids()[index],
            timestamp: batch.timestamps()[index],
            value: batch.values()[index],
            item_code,
            failing_indices,
        })
    }
}

/// Indices of items with a non-zero status, in order.
fn failing_items(item_codes: &[NativeCode]) -> Vec<usize> {
    item_codes
        .iter()
        .enumerate()
        .filter(|(_, code)| **code != 0)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotRecord;
    use crate::transport::{FakeTransport, TransportCall, FAKE_POINT_NOT_FOUND};
    use chrono::NaiveDate;

    fn moment(second: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_milli_opt(9, 15, second, milli)
            .unwrap()
    }

    fn connected(fake: &FakeTransport) -> Session<FakeTransport> {
        let mut session = Session::new(fake.clone(), &ClientConfig::default());
        session.connect("pi-test").unwrap();
        fake.drain();
        session
    }

    fn batch_of(n: i32) -> SnapshotBatch {
        (0..n)
            .map(|i| SnapshotRecord {
                point_id: PointId(100 + i),
                value: f64::from(i) * 1.5,
                timestamp: Timestamp::from(moment(i as u32, 0)),
            })
            .collect()
    }

    // ------------------------------------------------------------------ //
    //  Connect                                                            //
    // ------------------------------------------------------------------ //

    #[test]
    fn connect_sets_server() {
        let fake = FakeTransport::new();
        let mut session = Session::new(fake.clone(), &ClientConfig::default());
        assert!(!session.is_connected());

        session.connect("pi01").unwrap();
        assert_eq!(session.server(), Some("pi01"));
        assert_eq!(fake.calls(), vec![TransportCall::SetServerNode("pi01".into())]);
    }

    #[test]
    fn connect_failure_carries_code_and_disconnects() {
        let fake = FakeTransport::new();
        let mut session = Session::new(fake.clone(), &ClientConfig::default());
        session.connect("pi01").unwrap();

        fake.set_connect_code(-10400);
        let err = session.connect("pi02").unwrap_err();
        assert!(matches!(
            err,
            HistorianError::Connect { ref server, code: -10400 } if server == "pi02"
        ));
        assert!(!session.is_connected());
        assert_eq!(err.native_code(), Some(-10400));
    }

    #[test]
    fn operations_require_connection() {
        let fake = FakeTransport::new().with_point("x", 1);
        let mut session = Session::new(fake.clone(), &ClientConfig::default());

        assert!(matches!(session.resolve_point("x"), Err(HistorianError::NotConnected)));
        assert!(matches!(
            session.write_snapshot(PointId(1), 1.0, moment(0, 0)),
            Err(HistorianError::NotConnected)
        ));
        assert!(matches!(
            session.write_snapshot_batch(&batch_of(1)),
            Err(HistorianError::NotConnected)
        ));
        assert!(fake.calls().is_empty());
    }

    // ------------------------------------------------------------------ //
    //  Resolve                                                            //
    // ------------------------------------------------------------------ //

    #[test]
    fn resolve_point_returns_id() {
        let fake = FakeTransport::new().with_point("TI-100", 4711);
        let mut session = connected(&fake);

        assert_eq!(session.resolve_point("TI-100").unwrap(), PointId(4711));
        assert_eq!(fake.calls(), vec![TransportCall::FindPoint("TI-100".into())]);
    }

    #[test]
    fn resolve_unknown_point_carries_code() {
        let fake = FakeTransport::new();
        let mut session = connected(&fake);

        let err = session.resolve_point("nope").unwrap_err();
        assert!(matches!(
            err,
            HistorianError::PointNotFound { ref name, code } if name == "nope" && code == FAKE_POINT_NOT_FOUND
        ));
    }

    #[test]
    fn name_over_80_chars_never_reaches_transport() {
        let fake = FakeTransport::new();
        let mut session = connected(&fake);
        let name = "A".repeat(81);

        let err = session.resolve_point(&name).unwrap_err();
        assert!(matches!(err, HistorianError::NameTooLong { max: 80, .. }));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn multibyte_prefix_counts_bytes_not_chars() {
        let fake = FakeTransport::new();
        let config = ClientConfig {
            point_prefix: "Anlage_ü:".into(),
            ..ClientConfig::default()
        };
        let mut session = Session::new(fake.clone(), &config);
        session.connect("pi").unwrap();
        fake.drain();

        // 80 chars, 81 bytes once the prefix is applied.
        let raw = "A".repeat(71);
        let err = session.resolve_tag(&raw).unwrap_err();
        assert!(matches!(err, HistorianError::NameTooLong { ref name, .. } if name.len() == 81));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn session_exposes_configured_normalizer() {
        let config = ClientConfig {
            point_prefix: "U7:".into(),
            ..ClientConfig::default()
        };
        let session = Session::new(FakeTransport::new(), &config);
        assert_eq!(session.normalizer().prefix(), "U7:");
    }

    #[test]
    fn name_of_exactly_80_chars_is_looked_up() {
        let name = "B".repeat(80);
        let fake = FakeTransport::new().with_point(&name, 3);
        let mut session = connected(&fake);

        assert_eq!(session.resolve_point(&name).unwrap(), PointId(3));
    }

    #[test]
    fn resolve_tag_applies_prefix() {
        let fake = FakeTransport::new().with_point("SITE:Flow.Rate", 9);
        let config = ClientConfig {
            point_prefix: "SITE:".into(),
            ..ClientConfig::default()
        };
        let mut session = Session::new(fake.clone(), &config);
        session.connect("pi").unwrap();

        let (name, id) = session.resolve_tag("::Flow Rate").unwrap();
        assert_eq!(name, "SITE:Flow.Rate");
        assert_eq!(id, PointId(9));
    }

    #[test]
    fn resolve_tag_rejects_invalid_name_without_lookup() {
        let fake = FakeTransport::new();
        let mut session = connected(&fake);

        assert!(matches!(
            session.resolve_tag("!!"),
            Err(HistorianError::InvalidTagName(_))
        ));
        assert!(fake.calls().is_empty());
    }

    // ------------------------------------------------------------------ //
    //  Single write                                                       //
    // ------------------------------------------------------------------ //

    #[test]
    fn write_snapshot_sends_value_and_timestamp() {
        let fake = FakeTransport::new();
        let mut session = connected(&fake);

        session.write_snapshot(PointId(5), 21.75, moment(2, 500)).unwrap();

        let calls = fake.calls();
        let [TransportCall::PutSnapshot(put)] = calls.as_slice() else {
            panic!("unexpected calls: {calls:?}");
        };
        assert_eq!(put.point_id, PointId(5));
        assert_eq!(put.value, 21.75);
        assert_eq!(put.timestamp.second, 2.5);
        assert_eq!((put.int_value, put.binary_size, put.status, put.flags), (0, 0, 0, 0));
    }

    #[test]
    fn write_snapshot_failure_carries_context() {
        let fake = FakeTransport::new().fail_put(-11046);
        let mut session = connected(&fake);

        let err = session.write_snapshot(PointId(5), 1.0, moment(7, 0)).unwrap_err();
        match err {
            HistorianError::Write { point_id, value, timestamp, code } => {
                assert_eq!(point_id, PointId(5));
                assert_eq!(value, 1.0);
                assert_eq!(timestamp, Timestamp::from(moment(7, 0)));
                assert_eq!(code, -11046);
            }
            other => panic!("expected Write, got {other:?}"),
        }
    }

    // ------------------------------------------------------------------ //
    //  Batch write                                                        //
    // ------------------------------------------------------------------ //

    #[test]
    fn batch_success_sends_one_call() {
        let fake = FakeTransport::new();
        let mut session = connected(&fake);
        let batch = batch_of(4);

        session.write_snapshot_batch(&batch).unwrap();

        let calls = fake.calls();
        let [TransportCall::PutSnapshots(put)] = calls.as_slice() else {
            panic!("unexpected calls: {calls:?}");
        };
        assert_eq!(put.count(), 4);
        assert_eq!(put.point_ids(), batch.point_ids());
        assert_eq!(put.values(), batch.values());
        assert_eq!(put.timestamps(), batch.timestamps());
    }

    #[test]
    fn batch_failure_reports_last_failing_item() {
        let fake = FakeTransport::new().fail_batch(-30000, vec![0, -11, 0, -12, 0]);
        let mut session = connected(&fake);
        let batch = batch_of(5);

        let err = session.write_snapshot_batch(&batch).unwrap_err();
        match err {
            HistorianError::BatchWrite {
                code,
                index,
                point_id,
                timestamp,
                value,
                item_code,
                failing_indices,
            } => {
                assert_eq!(code, -30000);
                assert_eq!(index, 3);
                assert_eq!(point_id, PointId(103));
                assert_eq!(timestamp, batch.timestamps()[3]);
                assert_eq!(value, 4.5);
                assert_eq!(item_code, -12);
                assert_eq!(failing_indices, vec![1, 3]);
            }
            other => panic!("expected BatchWrite, got {other:?}"),
        }
    }

    #[test]
    fn batch_failure_without_item_codes_reports_first_item() {
        let fake = FakeTransport::new().fail_batch(-1, vec![]);
        let mut session = connected(&fake);
        let batch = batch_of(3);

        match session.write_snapshot_batch(&batch).unwrap_err() {
            HistorianError::BatchWrite { index, item_code, point_id, failing_indices, .. } => {
                assert_eq!(index, 0);
                assert_eq!(item_code, 0);
                assert_eq!(point_id, PointId(100));
                assert!(failing_indices.is_empty());
            }
            other => panic!("expected BatchWrite, got {other:?}"),
        }
    }

    #[test]
    fn item_codes_without_aggregate_failure_are_success() {
        let fake = FakeTransport::new().fail_batch(0, vec![0, -3]);
        let mut session = connected(&fake);

        assert!(session.write_snapshot_batch(&batch_of(2)).is_ok());
    }

    #[test]
    fn empty_batch_is_not_sent() {
        let fake = FakeTransport::new().fail_batch(-1, vec![]);
        let mut session = connected(&fake);

        session.write_snapshot_batch(&SnapshotBatch::new()).unwrap();
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn single_and_batch_write_share_fields() {
        let fake = FakeTransport::new();
        let mut session = connected(&fake);
        let at = moment(2, 500);

        session.write_snapshot(PointId(42), 3.25, at).unwrap();
        let mut batch = SnapshotBatch::new();
        batch.push(PointId(42), 3.25, Timestamp::from(at));
        session.write_snapshot_batch(&batch).unwrap();

        let calls = fake.drain();
        let [TransportCall::PutSnapshot(single), TransportCall::PutSnapshots(many)] =
            calls.as_slice()
        else {
            panic!("unexpected calls: {calls:?}");
        };
        assert_eq!(many.item(0), Some(*single));
    }

    #[test]
    fn failing_items_in_order() {
        assert_eq!(failing_items(&[0, 1, 0, -2]), vec![1, 3]);
        assert!(failing_items(&[0, 0]).is_empty());
    }
}
