//! Transport over the vendor PI API library (`piapi`).
//!
//! Only built with the `piapi` feature. The library keeps the active server
//! node in process-global state, so at most one [`Session`](crate::Session)
//! should drive a `PiApiTransport` at a time.

use std::ffi::{c_char, CString};
use std::ptr;

use crate::error::{NativeCode, TransportError};
use crate::point::PointId;
use crate::snapshot::{BatchPut, SnapshotPut};
use crate::timestamp::Timestamp;
use crate::transport::{check_item_codes, HistorianTransport};

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct PiTimestamp {
    month: i32,
    year: i32,
    day: i32,
    hour: i32,
    minute: i32,
    tzinfo: i32,
    second: f64,
}

impl From<Timestamp> for PiTimestamp {
    fn from(ts: Timestamp) -> Self {
        PiTimestamp {
            month: ts.month,
            year: ts.year,
            day: ts.day,
            hour: ts.hour,
            minute: ts.minute,
            tzinfo: ts.tzinfo,
            second: ts.second,
        }
    }
}

#[link(name = "piapi")]
extern "system" {
    fn piut_setservernode(servername: *const c_char) -> i32;

    fn pipt_findpoint(tagname: *const c_char, pt: *mut i32) -> i32;

    fn pisn_putsnapshotx(
        pt: i32,
        drval: *mut f64,
        ival: *mut i32,
        bval: *mut u8,
        bsize: *mut u32,
        istat: *mut i32,
        flags: *mut i16,
        timestamp: *mut PiTimestamp,
    ) -> i32;

    fn pisn_putsnapshotsx(
        count: i32,
        pt: *mut i32,
        drval: *mut f64,
        ival: *mut i32,
        bval: *mut *mut u8,
        bsize: *mut u32,
        istat: *mut i32,
        flags: *mut i16,
        timestamp: *mut PiTimestamp,
        errors: *mut i32,
    ) -> i32;
}

fn c_string(call: &'static str, s: &str) -> Result<CString, TransportError> {
    CString::new(s).map_err(|_| TransportError::InteriorNul { call })
}

#[derive(Debug, Default)]
pub struct PiApiTransport {
    _private: (),
}

impl PiApiTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistorianTransport for PiApiTransport {
    fn set_server_node(&mut self, name: &str) -> Result<NativeCode, TransportError> {
        let name = c_string("piut_setservernode", name)?;
        // SAFETY: `name` is a valid NUL-terminated string for the whole call.
        Ok(unsafe { piut_setservernode(name.as_ptr()) })
    }

    fn find_point(&mut self, name: &str) -> Result<(NativeCode, PointId), TransportError> {
        let name = c_string("pipt_findpoint", name)?;
        let mut pt: i32 = 0;
        // SAFETY: the caller has already bounded the name length; `pt` is a
        // live out-parameter.
        let code = unsafe { pipt_findpoint(name.as_ptr(), &mut pt) };
        Ok((code, PointId(pt)))
    }

    fn put_snapshot(&mut self, put: &SnapshotPut) -> Result<NativeCode, TransportError> {
        let mut drval = put.value;
        let mut ival = put.int_value;
        let mut bsize = put.binary_size;
        let mut istat = put.status;
        let mut flags = put.flags;
        let mut ts = PiTimestamp::from(put.timestamp);
        // SAFETY: every pointer refers to a local that outlives the call; a
        // null binary buffer with size zero means "no binary value".
        Ok(unsafe {
            pisn_putsnapshotx(
                put.point_id.get(),
                &mut drval,
                &mut ival,
                ptr::null_mut(),
                &mut bsize,
                &mut istat,
                &mut flags,
                &mut ts,
            )
        })
    }

    fn put_snapshots(
        &mut self,
        batch: &BatchPut,
        item_codes: &mut [NativeCode],
    ) -> Result<NativeCode, TransportError> {
        check_item_codes(batch, item_codes)?;
        let count = batch.count();
        let native_count =
            i32::try_from(count).map_err(|_| TransportError::BatchTooLarge(count))?;

        let mut pt: Vec<i32> = batch.point_ids().iter().map(|p| p.get()).collect();
        let mut drval = batch.values().to_vec();
        let mut ival = batch.int_values().to_vec();
        let mut bsize = batch.binary_sizes().to_vec();
        let mut istat = batch.statuses().to_vec();
        let mut flags = batch.flags().to_vec();
        let mut ts: Vec<PiTimestamp> =
            batch.timestamps().iter().copied().map(PiTimestamp::from).collect();

        // SAFETY: all arrays, `item_codes` included, hold exactly `count`
        // elements (checked above) and live for the whole call; the binary
        // value array is absent.
        Ok(unsafe {
            pisn_putsnapshotsx(
                native_count,
                pt.as_mut_ptr(),
                drval.as_mut_ptr(),
                ival.as_mut_ptr(),
                ptr::null_mut(),
                bsize.as_mut_ptr(),
                istat.as_mut_ptr(),
                flags.as_mut_ptr(),
                ts.as_mut_ptr(),
                item_codes.as_mut_ptr(),
            )
        })
    }
}
