//! # In-Memory Coupon Issuer
//!
//! The reference [`CouponIssuer`] implementation: a template catalog plus
//! issuance records behind `parking_lot` locks. Locks are synchronous and
//! never held across `.await` points; the async trait surface exists for
//! implementations that really do go over the network.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use curb_core::{MarkerCode, Timestamp};

use crate::info::{CouponInfo, DiscountType};
use crate::issuer::{CouponError, CouponIssuer};

/// Lifecycle status of one coupon issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuanceStatus {
    /// Redeemable.
    Active,
    /// Redeemed by the owner.
    Used,
    /// The issuance's expiry clock ran out before redemption.
    Expired,
}

/// A coupon template configured by the shop association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponTemplate {
    /// Template identifier.
    pub id: Uuid,
    /// Coupon display name.
    pub name: String,
    /// Longer description shown on the coupon.
    pub description: String,
    /// Participating shop or association name.
    pub shop_name: String,
    /// Discount value, interpreted per `discount_type`.
    pub discount: u32,
    /// Interpretation of `discount`.
    pub discount_type: DiscountType,
    /// Days an issuance stays redeemable.
    pub valid_days: i64,
    /// Whether this template may currently be issued.
    pub is_active: bool,
    /// When the template was configured. The newest active template wins.
    pub created_at: Timestamp,
}

/// One issuance: a template bound to a marker with its own expiry clock.
#[derive(Debug, Clone)]
struct IssuanceRecord {
    id: Uuid,
    marker: MarkerCode,
    #[allow(dead_code)]
    owner_email: Option<String>,
    name: String,
    description: String,
    shop_name: String,
    discount: u32,
    discount_type: DiscountType,
    status: IssuanceStatus,
    issued_at: Timestamp,
    expires_at: Timestamp,
}

impl IssuanceRecord {
    fn to_info(&self) -> CouponInfo {
        CouponInfo {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            shop_name: self.shop_name.clone(),
            discount: self.discount,
            discount_type: self.discount_type,
            expires_at: self.expires_at,
        }
    }
}

/// In-memory [`CouponIssuer`]. Cloning shares the underlying catalog and
/// issuance records.
#[derive(Debug, Clone, Default)]
pub struct MemoryCouponIssuer {
    templates: Arc<RwLock<Vec<CouponTemplate>>>,
    issuances: Arc<RwLock<HashMap<Uuid, IssuanceRecord>>>,
}

impl MemoryCouponIssuer {
    /// Create an issuer with an empty catalog. Issuance returns `Ok(None)`
    /// until a template is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an issuer seeded with the default shop-association catalog:
    /// a 500-yen shopping voucher (30 days) and a 20 % café discount
    /// (14 days).
    pub fn with_default_catalog() -> Self {
        let issuer = Self::new();
        let now = Timestamp::now();
        issuer.add_template(CouponTemplate {
            id: Uuid::new_v4(),
            name: "Shopping arcade voucher (500 yen)".to_string(),
            description: "500 yen off at Kita Ward Shopping Arcade member shops".to_string(),
            shop_name: "Kita Ward Shopping Arcade".to_string(),
            discount: 500,
            discount_type: DiscountType::Amount,
            valid_days: 30,
            is_active: true,
            created_at: now,
        });
        issuer.add_template(CouponTemplate {
            id: Uuid::new_v4(),
            name: "Cafe discount (20%)".to_string(),
            description: "20% off at the arcade cafe".to_string(),
            shop_name: "Arcade Cafe".to_string(),
            discount: 20,
            discount_type: DiscountType::Percentage,
            valid_days: 14,
            is_active: true,
            created_at: now.add_secs(1),
        });
        issuer
    }

    /// Add a template to the catalog.
    pub fn add_template(&self, template: CouponTemplate) {
        self.templates.write().push(template);
    }

    /// Number of issuances ever made (all statuses).
    pub fn issuance_count(&self) -> usize {
        self.issuances.read().len()
    }

    /// The newest active template, if any.
    fn current_template(&self) -> Option<CouponTemplate> {
        self.templates
            .read()
            .iter()
            .filter(|t| t.is_active)
            .max_by_key(|t| t.created_at)
            .cloned()
    }

    #[cfg(test)]
    fn insert_issuance(&self, record: IssuanceRecord) {
        self.issuances.write().insert(record.id, record);
    }
}

#[async_trait]
impl CouponIssuer for MemoryCouponIssuer {
    async fn issue_for_final_unlock(
        &self,
        marker: &MarkerCode,
        owner_email: Option<&str>,
    ) -> Result<Option<CouponInfo>, CouponError> {
        let template = match self.current_template() {
            Some(t) => t,
            None => {
                tracing::warn!(marker = %marker, "no active coupon template available");
                return Ok(None);
            }
        };

        let now = Timestamp::now();
        let record = IssuanceRecord {
            id: Uuid::new_v4(),
            marker: marker.clone(),
            owner_email: owner_email.map(str::to_string),
            name: template.name,
            description: template.description,
            shop_name: template.shop_name,
            discount: template.discount,
            discount_type: template.discount_type,
            status: IssuanceStatus::Active,
            issued_at: now,
            expires_at: now.add_secs(template.valid_days * 86_400),
        };
        let info = record.to_info();
        self.issuances.write().insert(record.id, record);

        tracing::info!(marker = %marker, issuance = %info.id, "coupon issued for final unlock");
        Ok(Some(info))
    }

    async fn coupons_for_marker(
        &self,
        marker: &MarkerCode,
    ) -> Result<Vec<CouponInfo>, CouponError> {
        let guard = self.issuances.read();
        let mut records: Vec<&IssuanceRecord> = guard
            .values()
            .filter(|r| &r.marker == marker)
            .filter(|r| matches!(r.status, IssuanceStatus::Active | IssuanceStatus::Used))
            .collect();
        records.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(records.into_iter().map(IssuanceRecord::to_info).collect())
    }

    async fn redeem(&self, issuance_id: Uuid) -> Result<(), CouponError> {
        let mut guard = self.issuances.write();
        let record = guard
            .get_mut(&issuance_id)
            .ok_or(CouponError::NotFound(issuance_id))?;

        if record.status != IssuanceStatus::Active {
            return Err(CouponError::NotActive(issuance_id));
        }

        let now = Timestamp::now();
        if now > record.expires_at {
            record.status = IssuanceStatus::Expired;
            return Err(CouponError::Expired(issuance_id));
        }

        record.status = IssuanceStatus::Used;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(code: &str) -> MarkerCode {
        MarkerCode::new(code).unwrap()
    }

    #[tokio::test]
    async fn test_empty_catalog_issues_nothing() {
        let issuer = MemoryCouponIssuer::new();
        let result = issuer
            .issue_for_final_unlock(&marker("ABC123"), None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(issuer.issuance_count(), 0);
    }

    #[tokio::test]
    async fn test_issue_uses_newest_active_template() {
        let issuer = MemoryCouponIssuer::with_default_catalog();
        let info = issuer
            .issue_for_final_unlock(&marker("ABC123"), Some("owner@example.com"))
            .await
            .unwrap()
            .expect("catalog is seeded");
        // The cafe coupon was configured after the voucher.
        assert_eq!(info.discount_type, DiscountType::Percentage);
        assert_eq!(info.discount, 20);
        assert_eq!(issuer.issuance_count(), 1);
    }

    #[tokio::test]
    async fn test_inactive_templates_are_skipped() {
        let issuer = MemoryCouponIssuer::new();
        issuer.add_template(CouponTemplate {
            id: Uuid::new_v4(),
            name: "Retired offer".to_string(),
            description: "no longer issued".to_string(),
            shop_name: "Old Shop".to_string(),
            discount: 100,
            discount_type: DiscountType::Amount,
            valid_days: 7,
            is_active: false,
            created_at: Timestamp::now(),
        });
        let result = issuer
            .issue_for_final_unlock(&marker("ABC123"), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_expiry_clock_from_valid_days() {
        let issuer = MemoryCouponIssuer::new();
        issuer.add_template(CouponTemplate {
            id: Uuid::new_v4(),
            name: "Week pass".to_string(),
            description: "seven days".to_string(),
            shop_name: "Shop".to_string(),
            discount: 5,
            discount_type: DiscountType::Percentage,
            valid_days: 7,
            is_active: true,
            created_at: Timestamp::now(),
        });
        let before = Timestamp::now();
        let info = issuer
            .issue_for_final_unlock(&marker("ABC123"), None)
            .await
            .unwrap()
            .unwrap();
        // Issued "now": expiry lands 7 days out, to the second.
        let distance = before.seconds_until(info.expires_at);
        assert!((7 * 86_400..=7 * 86_400 + 1).contains(&distance));
    }

    #[tokio::test]
    async fn test_coupons_for_marker_filters_and_sorts() {
        let issuer = MemoryCouponIssuer::with_default_catalog();
        let m1 = marker("ABC123");
        let m2 = marker("XYZ789");
        issuer.issue_for_final_unlock(&m1, None).await.unwrap();
        issuer.issue_for_final_unlock(&m2, None).await.unwrap();

        let coupons = issuer.coupons_for_marker(&m1).await.unwrap();
        assert_eq!(coupons.len(), 1);
        assert!(issuer.coupons_for_marker(&marker("NONE")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_moves_active_to_used() {
        let issuer = MemoryCouponIssuer::with_default_catalog();
        let m = marker("ABC123");
        let info = issuer
            .issue_for_final_unlock(&m, None)
            .await
            .unwrap()
            .unwrap();

        issuer.redeem(info.id).await.unwrap();

        // Used coupons still show up in the marker listing.
        assert_eq!(issuer.coupons_for_marker(&m).await.unwrap().len(), 1);

        // A second redemption fails: the issuance is no longer active.
        assert!(matches!(
            issuer.redeem(info.id).await,
            Err(CouponError::NotActive(_))
        ));
    }

    #[tokio::test]
    async fn test_redeem_unknown_issuance() {
        let issuer = MemoryCouponIssuer::new();
        assert!(matches!(
            issuer.redeem(Uuid::new_v4()).await,
            Err(CouponError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_redeem_past_expiry_marks_expired() {
        let issuer = MemoryCouponIssuer::new();
        let id = Uuid::new_v4();
        let past = Timestamp::now().add_secs(-10);
        issuer.insert_issuance(IssuanceRecord {
            id,
            marker: marker("ABC123"),
            owner_email: None,
            name: "stale".to_string(),
            description: "already over".to_string(),
            shop_name: "Shop".to_string(),
            discount: 1,
            discount_type: DiscountType::Amount,
            status: IssuanceStatus::Active,
            issued_at: past.add_secs(-86_400),
            expires_at: past,
        });

        assert!(matches!(
            issuer.redeem(id).await,
            Err(CouponError::Expired(_))
        ));
        // Expired issuances drop out of the marker listing.
        assert!(issuer
            .coupons_for_marker(&marker("ABC123"))
            .await
            .unwrap()
            .is_empty());
    }
}
