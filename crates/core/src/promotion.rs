//! Discounts and vouchers.
//!
//! Both carry a percentage *or* a fixed amount (never both) and a validity
//! window. Discounts apply automatically to the products they list; vouchers
//! are redeemed by code at checkout.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates;
use crate::types::{AppliedVoucher, DiscountId, Money, ProductId, PromotionStatus, VoucherId};

/// Why a promotion's value fields are unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
    #[error("either a percentage or an amount is required")]
    MissingValue,
    #[error("a promotion cannot have both a percentage and an amount")]
    BothValues,
    #[error("percentage must be greater than 0 and at most 100")]
    PercentageOutOfRange,
    #[error("amount must be greater than 0")]
    NonPositiveAmount,
}

/// The reduction a promotion grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountValue {
    Percentage(Decimal),
    Amount(Money),
}

impl DiscountValue {
    /// Build from the wire representation, enforcing percentage XOR amount.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] if neither or both are set, or the value
    /// is out of range.
    pub fn from_parts(
        percentage: Option<Decimal>,
        amount: Option<Money>,
    ) -> Result<Self, PromotionError> {
        match (percentage, amount) {
            (Some(_), Some(_)) => Err(PromotionError::BothValues),
            (None, None) => Err(PromotionError::MissingValue),
            (Some(p), None) if p <= Decimal::ZERO || p > Decimal::ONE_HUNDRED => {
                Err(PromotionError::PercentageOutOfRange)
            }
            (Some(p), None) => Ok(Self::Percentage(p)),
            (None, Some(a)) if a.amount() <= 0 => Err(PromotionError::NonPositiveAmount),
            (None, Some(a)) => Ok(Self::Amount(a)),
        }
    }

    /// Split back into the wire representation.
    #[must_use]
    pub const fn into_parts(self) -> (Option<Decimal>, Option<Money>) {
        match self {
            Self::Percentage(p) => (Some(p), None),
            Self::Amount(a) => (None, Some(a)),
        }
    }

    /// Reduction on `base`, never more than `base`.
    #[must_use]
    pub fn apply_to(self, base: Money) -> Money {
        let off = match self {
            Self::Percentage(p) => base.percent(p),
            Self::Amount(a) => a,
        };
        off.min(base)
    }
}

impl std::fmt::Display for DiscountValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage(p) => write!(f, "{}%", p.normalize()),
            Self::Amount(a) => write!(f, "{a}"),
        }
    }
}

/// Derive a promotion's status at `now`.
///
/// `Upcoming` if `now < start`, `Expired` if `now > end`, else `Active`.
/// A missing bound never excludes. Both bounds are compared as instants, so
/// a date-only end (midnight) expires at the start of that day.
#[must_use]
pub fn derive_status(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> PromotionStatus {
    if start.is_some_and(|s| now < s) {
        PromotionStatus::Upcoming
    } else if end.is_some_and(|e| now > e) {
        PromotionStatus::Expired
    } else {
        PromotionStatus::Active
    }
}

/// Behaviour shared by discounts and vouchers.
pub trait Promotion {
    fn start_date(&self) -> Option<NaiveDateTime>;
    fn end_date(&self) -> Option<NaiveDateTime>;
    fn discount_percentage(&self) -> Option<Decimal>;
    fn discount_amount(&self) -> Option<Money>;

    fn status_at(&self, now: NaiveDateTime) -> PromotionStatus {
        derive_status(self.start_date(), self.end_date(), now)
    }

    /// # Errors
    ///
    /// See [`DiscountValue::from_parts`].
    fn value(&self) -> Result<DiscountValue, PromotionError> {
        DiscountValue::from_parts(self.discount_percentage(), self.discount_amount())
    }
}

/// Product-scoped sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DiscountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub discount_name: String,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Money>,
    #[serde(default, with = "dates::flexible")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, with = "dates::flexible")]
    pub end_date: Option<NaiveDateTime>,
    /// Empty means the discount is not restricted to particular products.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

impl Discount {
    #[must_use]
    pub fn applies_to(&self, product: ProductId) -> bool {
        self.product_ids.is_empty() || self.product_ids.contains(&product)
    }
}

/// Code redeemed at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VoucherId>,
    pub code: String,
    #[serde(default)]
    pub discount_name: String,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Money>,
    #[serde(default, with = "dates::flexible")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, with = "dates::flexible")]
    pub end_date: Option<NaiveDateTime>,
}

impl Voucher {
    /// The shape the pricing code works with.
    #[must_use]
    pub fn as_applied(&self) -> AppliedVoucher {
        AppliedVoucher {
            code: Some(self.code.clone()),
            discount_amount: self.discount_amount,
            discount_percentage: self.discount_percentage,
        }
    }
}

macro_rules! impl_promotion {
    ($ty:ty) => {
        impl Promotion for $ty {
            fn start_date(&self) -> Option<NaiveDateTime> {
                self.start_date
            }

            fn end_date(&self) -> Option<NaiveDateTime> {
                self.end_date
            }

            fn discount_percentage(&self) -> Option<Decimal> {
                self.discount_percentage
            }

            fn discount_amount(&self) -> Option<Money> {
                self.discount_amount
            }
        }
    };
}

impl_promotion!(Discount);
impl_promotion!(Voucher);

/// Price of `product` after the largest active discount that covers it.
///
/// Discounts with an unusable value are ignored.
#[must_use]
pub fn sale_price(
    product: ProductId,
    price: Money,
    discounts: &[Discount],
    now: NaiveDateTime,
) -> Money {
    let best = discounts
        .iter()
        .filter(|d| d.applies_to(product) && d.status_at(now) == PromotionStatus::Active)
        .filter_map(|d| d.value().ok())
        .map(|v| v.apply_to(price))
        .max()
        .unwrap_or(Money::ZERO);
    price.saturating_sub(best)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_status_upcoming_active_expired() {
        let start = Some(at(2025, 6, 1));
        let end = Some(at(2025, 6, 30));

        let upcoming = derive_status(start, end, at(2025, 5, 1));
        assert_eq!(upcoming, PromotionStatus::Upcoming);
        assert_eq!(upcoming.label(), "Chưa diễn ra");

        let active = derive_status(start, end, at(2025, 6, 15));
        assert_eq!(active, PromotionStatus::Active);
        assert_eq!(active.label(), "Đang diễn ra");

        let expired = derive_status(start, end, at(2025, 7, 1));
        assert_eq!(expired, PromotionStatus::Expired);
        assert_eq!(expired.label(), "Đã hết hạn");
    }

    #[test]
    fn test_status_bounds_are_inclusive() {
        let start = at(2025, 6, 1);
        let end = at(2025, 6, 30);
        assert_eq!(derive_status(Some(start), Some(end), start), PromotionStatus::Active);
        assert_eq!(derive_status(Some(start), Some(end), end), PromotionStatus::Active);
    }

    #[test]
    fn test_missing_bounds_do_not_exclude() {
        assert_eq!(derive_status(None, None, at(2030, 1, 1)), PromotionStatus::Active);
    }

    #[test]
    fn test_value_requires_exactly_one_field() {
        assert_eq!(
            DiscountValue::from_parts(None, None),
            Err(PromotionError::MissingValue)
        );
        assert_eq!(
            DiscountValue::from_parts(Some(Decimal::from(10)), Some(Money::new(1))),
            Err(PromotionError::BothValues)
        );
        assert_eq!(
            DiscountValue::from_parts(Some(Decimal::from(101)), None),
            Err(PromotionError::PercentageOutOfRange)
        );
        assert_eq!(
            DiscountValue::from_parts(None, Some(Money::ZERO)),
            Err(PromotionError::NonPositiveAmount)
        );
        assert_eq!(
            DiscountValue::from_parts(Some(Decimal::from(15)), None),
            Ok(DiscountValue::Percentage(Decimal::from(15)))
        );
    }

    #[test]
    fn test_apply_to_caps_at_base() {
        let big = DiscountValue::Amount(Money::new(500_000));
        assert_eq!(big.apply_to(Money::new(120_000)), Money::new(120_000));
        let pct = DiscountValue::Percentage(Decimal::from(25));
        assert_eq!(pct.apply_to(Money::new(120_000)), Money::new(30_000));
    }

    #[test]
    fn test_display() {
        assert_eq!(DiscountValue::Percentage(Decimal::new(100, 1)).to_string(), "10%");
        assert_eq!(DiscountValue::Amount(Money::new(30_000)).to_string(), "30.000 ₫");
    }

    #[test]
    fn test_voucher_from_wire_with_array_dates() {
        let voucher: Voucher = serde_json::from_value(json!({
            "id": 3,
            "code": "SUMMER10",
            "discount_name": "Hè rực rỡ",
            "discount_percentage": 10,
            "start_date": [2025, 6, 1],
            "end_date": "2025-06-30T23:59:59"
        }))
        .unwrap();

        assert_eq!(voucher.status_at(at(2025, 6, 15)), PromotionStatus::Active);
        assert_eq!(voucher.value().unwrap(), DiscountValue::Percentage(Decimal::from(10)));
        assert_eq!(voucher.as_applied().code.as_deref(), Some("SUMMER10"));
    }

    #[test]
    fn test_sale_price_takes_best_active_discount() {
        let discounts: Vec<Discount> = serde_json::from_value(json!([
            {"discount_name": "a", "discount_amount": 10000, "product_ids": [1]},
            {"discount_name": "b", "discount_percentage": 20},
            {"discount_name": "expired", "discount_percentage": 90,
             "end_date": "2020-01-01T00:00:00"},
            {"discount_name": "broken"}
        ]))
        .unwrap();
        let now = at(2025, 6, 1);
        assert_eq!(
            sale_price(ProductId::new(1), Money::new(100_000), &discounts, now),
            Money::new(80_000)
        );
        assert_eq!(
            sale_price(ProductId::new(1), Money::new(40_000), &discounts, now),
            Money::new(30_000)
        );
        assert_eq!(
            sale_price(ProductId::new(9), Money::new(50_000), &[], now),
            Money::new(50_000)
        );
    }

    #[test]
    fn test_discount_scope() {
        let discount: Discount = serde_json::from_value(json!({
            "discount_name": "Sách thiếu nhi",
            "discount_amount": 5000,
            "product_ids": [1, 2]
        }))
        .unwrap();
        assert!(discount.applies_to(ProductId::new(2)));
        assert!(!discount.applies_to(ProductId::new(3)));
    }
}
