//! # Transaction Module
//!
//! Một khoản chi trong ledger, gắn với người trả tiền (payer).
//! Amount là giá trị thập phân opaque: không kiểm tra dấu, không làm tròn.

use crate::error::{CoreError, CoreResult};
use crate::id::{LedgerId, TransactionId, UserId};
use crate::ledger::{DATETIME_FORMAT, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a payment happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTime {
    /// Stored as `YYYY-MM-DD`
    Date(NaiveDate),
    /// Stored as `YYYY-MM-DD HH:MM:SS`
    DateTime(NaiveDateTime),
}

impl PaymentTime {
    /// Today's UTC calendar date.
    pub fn today() -> Self {
        PaymentTime::Date(Utc::now().date_naive())
    }

    /// Text written to storage
    pub fn to_stored(&self) -> String {
        match self {
            PaymentTime::Date(d) => d.format(DATE_FORMAT).to_string(),
            PaymentTime::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Parse either stored form.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
            return Ok(PaymentTime::DateTime(dt));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(PaymentTime::Date)
            .map_err(|_| CoreError::InvalidTimestamp(s.to_string()))
    }
}

impl fmt::Display for PaymentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}

impl From<NaiveDate> for PaymentTime {
    fn from(value: NaiveDate) -> Self {
        PaymentTime::Date(value)
    }
}

impl From<NaiveDateTime> for PaymentTime {
    fn from(value: NaiveDateTime) -> Self {
        PaymentTime::DateTime(value)
    }
}

/// A recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub ledger_id: LedgerId,
    pub payer_id: UserId,
    pub amount: Decimal,
    pub description: Option<String>,
    /// Payment time exactly as stored
    pub payment_time: String,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} paid {} on {}", self.payer_id, self.amount, self.payment_time)
    }
}

/// Parse a stored amount.
///
/// The engine may hand back exponent notation for very large or small
/// values, so both plain and scientific forms are accepted.
pub fn parse_amount(s: &str) -> CoreResult<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|e| CoreError::InvalidAmount(format!("{} ({})", s, e)))
}

/// Sum of amounts where `None` counts as zero.
///
/// Fails with `InvalidAmount` when the sum leaves the `Decimal` range.
pub fn total<I>(amounts: I) -> CoreResult<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    amounts
        .into_iter()
        .flatten()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| CoreError::InvalidAmount("sum exceeds the decimal range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_time_stored_forms() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(PaymentTime::Date(date).to_stored(), "2025-09-01");

        let dt = date.and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(PaymentTime::DateTime(dt).to_stored(), "2025-09-01 12:30:00");
    }

    #[test]
    fn test_payment_time_parse() {
        assert!(matches!(PaymentTime::parse("2025-09-01"), Ok(PaymentTime::Date(_))));
        assert!(matches!(
            PaymentTime::parse("2025-09-01 12:30:00"),
            Ok(PaymentTime::DateTime(_))
        ));
        assert!(PaymentTime::parse("yesterday").is_err());
    }

    #[test]
    fn test_payment_time_today_is_date() {
        let today = PaymentTime::today();
        assert_eq!(today.to_stored(), Utc::now().date_naive().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5").unwrap(), dec!(12.50));
        assert_eq!(parse_amount("-3").unwrap(), dec!(-3));
        assert_eq!(parse_amount("1.5e3").unwrap(), dec!(1500));
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn test_total_skips_missing() {
        assert_eq!(total(Vec::<Option<Decimal>>::new()).unwrap(), Decimal::ZERO);
        assert_eq!(
            total(vec![Some(dec!(12.50)), None, Some(dec!(7.25)), Some(dec!(-2))]).unwrap(),
            dec!(17.75)
        );
    }

    #[test]
    fn test_total_overflow_is_error() {
        let err = total(vec![Some(Decimal::MAX), Some(Decimal::MAX)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount(_)));

        // Back inside the range once a negative amount follows
        assert_eq!(
            total(vec![Some(Decimal::MAX), Some(dec!(-1)), Some(dec!(1))]).unwrap(),
            Decimal::MAX
        );
    }
}
