//! Voucher Fixtures

use serde::Deserialize;

use crate::vouchers::VoucherRecord;

/// Wrapper for vouchers in YAML, written in the backend's record format
#[derive(Debug, Deserialize)]
pub struct VouchersFixture {
    /// Voucher records
    pub vouchers: Vec<VoucherRecord>,
}
