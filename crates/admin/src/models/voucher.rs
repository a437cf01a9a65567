//! Discount vouchers.

use core::fmt;
use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boutique_core::{Price, VoucherId};

/// How a voucher's value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    /// Percentage off the subtotal (1-100).
    Percent,
    /// Fixed amount off, capped at the subtotal.
    Fixed,
}

impl VoucherKind {
    pub const ALL: [Self; 2] = [Self::Percent, Self::Fixed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Fixed => "fixed",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Percent => "Percent off",
            Self::Fixed => "Fixed amount",
        }
    }
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoucherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("invalid voucher kind: {s}"))
    }
}

/// A discount code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: VoucherId,
    /// Uppercase alphanumeric code.
    pub code: String,
    pub kind: VoucherKind,
    pub value: Decimal,
    /// `None` means unlimited.
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    /// Last day the code is valid.
    pub expires_on: Option<NaiveDate>,
    pub active: bool,
}

impl Voucher {
    /// Active, not past its expiry day and below its usage limit.
    #[must_use]
    pub fn is_redeemable(&self, today: NaiveDate) -> bool {
        self.active
            && self.expires_on.is_none_or(|last_day| today <= last_day)
            && self.usage_limit.is_none_or(|limit| self.times_used < limit)
    }

    /// Value as shown in tables: `15%` or `$10.00`.
    #[must_use]
    pub fn value_display(&self) -> String {
        match self.kind {
            VoucherKind::Percent => format!("{}%", self.value.normalize()),
            VoucherKind::Fixed => Price::usd(self.value).display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(kind: VoucherKind, value: Decimal) -> Voucher {
        Voucher {
            id: VoucherId::new(1),
            code: "WELCOME10".to_string(),
            kind,
            value,
            usage_limit: Some(3),
            times_used: 0,
            expires_on: NaiveDate::from_ymd_opt(2026, 12, 31),
            active: true,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn test_redeemable_until_last_day() {
        let v = voucher(VoucherKind::Percent, Decimal::from(10));
        assert!(v.is_redeemable(day(2026, 12, 31)));
        assert!(!v.is_redeemable(day(2027, 1, 1)));
    }

    #[test]
    fn test_not_redeemable_when_used_up_or_inactive() {
        let mut v = voucher(VoucherKind::Percent, Decimal::from(10));
        v.times_used = 3;
        assert!(!v.is_redeemable(day(2026, 6, 1)));

        let mut v = voucher(VoucherKind::Percent, Decimal::from(10));
        v.active = false;
        assert!(!v.is_redeemable(day(2026, 6, 1)));

        let mut v = voucher(VoucherKind::Percent, Decimal::from(10));
        v.usage_limit = None;
        v.expires_on = None;
        v.times_used = 10_000;
        assert!(v.is_redeemable(day(2030, 1, 1)));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(voucher(VoucherKind::Percent, Decimal::new(1500, 2)).value_display(), "15%");
        assert_eq!(
            voucher(VoucherKind::Fixed, Decimal::new(2500, 2)).value_display(),
            "$25.00"
        );
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("fixed".parse::<VoucherKind>(), Ok(VoucherKind::Fixed));
        assert!("bogo".parse::<VoucherKind>().is_err());
    }
}
