//! # Coupon Wire Types
//!
//! The coupon shape returned to owners. Field names are camelCase on the
//! wire, matching the owner-web contract.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use curb_core::Timestamp;

/// How a coupon's `discount` value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount` is a fixed amount in the local currency.
    Amount,
    /// `discount` is a percentage off.
    Percentage,
}

impl DiscountType {
    /// Return the wire representation of this discount type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Percentage => "percentage",
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issued coupon as presented to the owner.
///
/// `id` identifies the *issuance* (the binding of a template to a marker),
/// not the template — redemption operates on this id. `expiresAt` is the
/// issuance's own expiry clock, independent of any declaration deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponInfo {
    /// Issuance identifier (redeem with this).
    pub id: Uuid,
    /// Coupon display name.
    pub name: String,
    /// Longer description shown on the coupon.
    pub description: String,
    /// Participating shop or association name.
    pub shop_name: String,
    /// Discount value, interpreted per `discountType`.
    pub discount: u32,
    /// Interpretation of `discount`.
    pub discount_type: DiscountType,
    /// When this issuance stops being redeemable.
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let info = CouponInfo {
            id: Uuid::nil(),
            name: "Shopping voucher".to_string(),
            description: "500 yen off at member shops".to_string(),
            shop_name: "Kita Ward Shopping Arcade".to_string(),
            discount: 500,
            discount_type: DiscountType::Amount,
            expires_at: Timestamp::parse("2026-09-04T12:00:00Z").unwrap(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["shopName"], "Kita Ward Shopping Arcade");
        assert_eq!(json["discountType"], "amount");
        assert_eq!(json["expiresAt"], "2026-09-04T12:00:00Z");
    }

    #[test]
    fn test_discount_type_roundtrip() {
        for dt in [DiscountType::Amount, DiscountType::Percentage] {
            let json = serde_json::to_string(&dt).unwrap();
            assert_eq!(json, format!("\"{dt}\""));
            let parsed: DiscountType = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, dt);
        }
    }
}
