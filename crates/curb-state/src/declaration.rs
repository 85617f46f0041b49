//! # Declaration Records
//!
//! The declaration is one temp-unlock episode for a marker: the instant it
//! was declared, the two derived deadlines, and the monotonic
//! `temporary → finalized` status. The report is the coarse status mirror
//! shown to ward staff (`reported → temporary → resolved`); the state
//! machine keeps it in sync with the declaration.
//!
//! Wire format is camelCase to match the owner-web contract, with two
//! historical spellings preserved exactly: `imageUrl` and `ocr_text`.

use serde::{Deserialize, Serialize};

use curb_core::{MarkerCode, Timestamp, UnlockWindows};

/// Maximum length of the free-text notes captured at temp-unlock.
pub const MAX_NOTES_LEN: usize = 2_000;

// ─── Status Enums ────────────────────────────────────────────────────

/// Status of a declaration. Monotonic: once `finalized`, never `temporary`
/// again — a later temp-unlock creates a *new* declaration instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationStatus {
    /// Temporarily unlocked; the eligibility and expiry clocks are running.
    Temporary,
    /// Permanently unlocked (terminal).
    Finalized,
}

impl DeclarationStatus {
    /// Return the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temporary => "temporary",
            Self::Finalized => "finalized",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl std::fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse report status mirrored from the declaration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Reported abandoned; no owner action yet.
    Reported,
    /// Owner has temporarily unlocked the marker.
    Temporary,
    /// Owner completed the final unlock.
    Resolved,
}

impl ReportStatus {
    /// Return the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "reported",
            Self::Temporary => "temporary",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Declaration ─────────────────────────────────────────────────────

/// One temp-unlock episode for a marker.
///
/// Both deadlines are derived from `declared_at` at creation time through
/// [`UnlockWindows`]; `eligible_final_at` may afterwards be rewritten only
/// by the test-support hook. `finalized_at` is stamped exactly once, on
/// the `temporary → finalized` transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Instant the temporary unlock was requested.
    pub declared_at: Timestamp,
    /// Instant after which final unlock becomes permitted.
    pub eligible_final_at: Timestamp,
    /// Instant after which the temporary state auto-expires.
    pub expires_at: Timestamp,
    /// Current status.
    pub status: DeclarationStatus,
    /// Set exactly once, on finalization.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finalized_at: Option<Timestamp>,
    /// Free text captured at temp-unlock.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}

impl Declaration {
    /// Create a fresh temporary declaration at `declared_at`, deriving both
    /// deadlines through the configured windows.
    pub fn declare(declared_at: Timestamp, windows: &UnlockWindows, notes: Option<String>) -> Self {
        Self {
            declared_at,
            eligible_final_at: windows.eligible_final_from(declared_at),
            expires_at: windows.expires_from(declared_at),
            status: DeclarationStatus::Temporary,
            finalized_at: None,
            notes,
        }
    }

    /// Whether the temporary state has auto-expired at `now`.
    ///
    /// Finalized declarations never expire — the expiry clock only governs
    /// the temporary state.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.status == DeclarationStatus::Temporary && now >= self.expires_at
    }
}

// ─── Marker Entry ────────────────────────────────────────────────────

/// A physical marker, identified by its externally assigned code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// The scanned marker code.
    pub code: MarkerCode,
}

/// The report associated 1:1 with a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Report identifier (`"r-" + code`).
    pub id: String,
    /// Coarse status mirror.
    pub status: ReportStatus,
    /// Photo captured by the reporter, if any.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    /// Registration number text extracted from the photo, if any.
    pub ocr_text: String,
}

impl Report {
    /// Synthesize the default report for a marker that has never been
    /// declared: status `reported`, empty image and OCR fields.
    pub fn synthesized(code: &MarkerCode) -> Self {
        Self {
            id: format!("r-{code}"),
            status: ReportStatus::Reported,
            image_url: String::new(),
            ocr_text: String::new(),
        }
    }
}

/// Everything stored per marker code: the marker itself, its report, and
/// the *current* declaration (a new temp-unlock after finalization
/// replaces it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEntry {
    /// The marker.
    pub marker: Marker,
    /// The associated report.
    pub report: Report,
    /// The current declaration, if any.
    pub declaration: Option<Declaration>,
}

impl MarkerEntry {
    /// Synthesize the default entry for a marker with no prior history.
    pub fn synthesized(code: &MarkerCode) -> Self {
        Self {
            marker: Marker { code: code.clone() },
            report: Report::synthesized(code),
            declaration: None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> UnlockWindows {
        UnlockWindows::default()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_declare_derives_deadlines_to_the_second() {
        let declared = ts("2026-08-05T12:00:00Z");
        let d = Declaration::declare(declared, &windows(), None);
        assert_eq!(d.declared_at, declared);
        assert_eq!(d.eligible_final_at, ts("2026-08-05T12:15:00Z"));
        assert_eq!(d.expires_at, ts("2026-08-06T12:00:00Z"));
        assert_eq!(d.status, DeclarationStatus::Temporary);
        assert!(d.finalized_at.is_none());
    }

    #[test]
    fn test_expiry_only_governs_temporary() {
        let declared = ts("2026-08-05T12:00:00Z");
        let mut d = Declaration::declare(declared, &windows(), None);
        assert!(!d.is_expired(ts("2026-08-06T11:59:59Z")));
        assert!(d.is_expired(ts("2026-08-06T12:00:00Z")));

        d.status = DeclarationStatus::Finalized;
        d.finalized_at = Some(ts("2026-08-05T12:20:00Z"));
        assert!(!d.is_expired(ts("2026-08-07T00:00:00Z")));
    }

    #[test]
    fn test_declaration_serde_roundtrip_preserves_all_fields() {
        let mut d = Declaration::declare(
            ts("2026-08-05T12:00:00Z"),
            &windows(),
            Some("left by the east exit".to_string()),
        );
        d.status = DeclarationStatus::Finalized;
        d.finalized_at = Some(ts("2026-08-05T12:20:00Z"));

        let json = serde_json::to_string(&d).unwrap();
        let parsed: Declaration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn test_declaration_wire_is_camel_case() {
        let d = Declaration::declare(ts("2026-08-05T12:00:00Z"), &windows(), None);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["declaredAt"], "2026-08-05T12:00:00Z");
        assert_eq!(json["eligibleFinalAt"], "2026-08-05T12:15:00Z");
        assert_eq!(json["expiresAt"], "2026-08-06T12:00:00Z");
        assert_eq!(json["status"], "temporary");
        // Unset optionals stay off the wire.
        assert!(json.get("finalizedAt").is_none());
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_report_synthesized_shape() {
        let code = MarkerCode::new("ABC123").unwrap();
        let report = Report::synthesized(&code);
        assert_eq!(report.id, "r-ABC123");
        assert_eq!(report.status, ReportStatus::Reported);
        assert!(report.image_url.is_empty());
        assert!(report.ocr_text.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["ocr_text"], "");
        assert_eq!(json["status"], "reported");
    }

    #[test]
    fn test_marker_entry_synthesized_has_no_declaration() {
        let code = MarkerCode::new("ABC123").unwrap();
        let entry = MarkerEntry::synthesized(&code);
        assert_eq!(entry.marker.code, code);
        assert!(entry.declaration.is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(DeclarationStatus::Temporary.to_string(), "temporary");
        assert_eq!(DeclarationStatus::Finalized.to_string(), "finalized");
        assert_eq!(ReportStatus::Reported.to_string(), "reported");
        assert_eq!(ReportStatus::Resolved.to_string(), "resolved");
        assert!(DeclarationStatus::Finalized.is_terminal());
        assert!(!DeclarationStatus::Temporary.is_terminal());
    }
}
