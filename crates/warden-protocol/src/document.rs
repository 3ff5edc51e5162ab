//! The persisted shape of the punishment ledger.
//!
//! One logical document holds every active record:
//!
//! ```text
//! {
//!   "bans":  { "<player uuid>": { "playerName", "reason", "expireTime"?, "createdTime" } },
//!   "mutes": { "<player uuid>": { ... same shape ... } }
//! }
//! ```
//!
//! Times are milliseconds since the Unix epoch. A permanent record has no
//! `expireTime`. Older files wrote `-1` for "permanent"; any negative
//! value still decodes as permanent so those files keep loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::PunishmentKind;

/// The whole ledger as it sits on disk.
///
/// `BTreeMap` keeps the keys sorted so the file is stable between saves.
/// Keys stay as strings here; the ledger parses them into `PlayerId`s
/// and skips any that don't parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDocument {
    /// Active bans keyed by player UUID string.
    #[serde(default)]
    pub bans: BTreeMap<String, StoredPunishment>,
    /// Active mutes keyed by player UUID string.
    #[serde(default)]
    pub mutes: BTreeMap<String, StoredPunishment>,
}

impl LedgerDocument {
    /// The section of the document holding records of `kind`.
    pub fn section(&self, kind: PunishmentKind) -> &BTreeMap<String, StoredPunishment> {
        match kind {
            PunishmentKind::Ban => &self.bans,
            PunishmentKind::Mute => &self.mutes,
        }
    }

    /// Mutable access to the section holding records of `kind`.
    pub fn section_mut(
        &mut self,
        kind: PunishmentKind,
    ) -> &mut BTreeMap<String, StoredPunishment> {
        match kind {
            PunishmentKind::Ban => &mut self.bans,
            PunishmentKind::Mute => &mut self.mutes,
        }
    }

    /// Total number of records across both sections.
    pub fn len(&self) -> usize {
        self.bans.len() + self.mutes.len()
    }

    /// Returns `true` if the document holds no records.
    pub fn is_empty(&self) -> bool {
        self.bans.is_empty() && self.mutes.is_empty()
    }
}

/// One persisted punishment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPunishment {
    /// The player's name at the time the punishment was imposed.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub player_name: String,

    /// Free-form reason shown to the player.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub reason: String,

    /// Expiry in epoch milliseconds; `None` means permanent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_expiry"
    )]
    pub expire_time: Option<i64>,

    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_time: i64,
}

/// Accepts an absent field, `null`, or a number. Negative numbers are the
/// old permanent sentinel and map to `None`.
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.filter(|ms| *ms >= 0))
}

/// Older files wrote `null` for a missing reason.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_sentinel_decodes_as_permanent() {
        let json = r#"{
            "bans": {
                "0f8fad5b-d9cb-469f-a165-70867728950e": {
                    "playerName": "Steve",
                    "reason": "griefing",
                    "expireTime": -1,
                    "createdTime": 1700000000000
                }
            }
        }"#;
        let doc: LedgerDocument = serde_json::from_str(json).unwrap();
        let record = &doc.bans["0f8fad5b-d9cb-469f-a165-70867728950e"];
        assert_eq!(record.expire_time, None);
        assert_eq!(record.player_name, "Steve");
        assert!(doc.mutes.is_empty(), "missing section defaults to empty");
    }

    #[test]
    fn test_permanent_record_omits_expire_time() {
        let record = StoredPunishment {
            player_name: "Alex".into(),
            reason: "spam".into(),
            expire_time: None,
            created_time: 5,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("expireTime"));
        assert!(json.contains("\"createdTime\":5"));
    }

    #[test]
    fn test_timed_record_keeps_expire_time() {
        let json = r#"{"playerName":"Alex","reason":"spam","expireTime":9000,"createdTime":5}"#;
        let record: StoredPunishment = serde_json::from_str(json).unwrap();
        assert_eq!(record.expire_time, Some(9000));
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let json = r#"{"playerName":"Alex","createdTime":5}"#;
        let record: StoredPunishment = serde_json::from_str(json).unwrap();
        assert_eq!(record.reason, "");
        assert_eq!(record.expire_time, None);
    }

    #[test]
    fn test_null_reason_decodes_as_empty() {
        let json = r#"{"playerName":"Alex","reason":null,"createdTime":5}"#;
        let record: StoredPunishment = serde_json::from_str(json).unwrap();
        assert_eq!(record.reason, "");
    }

    #[test]
    fn test_section_selects_by_kind() {
        let mut doc = LedgerDocument::default();
        doc.section_mut(PunishmentKind::Mute).insert(
            "id".into(),
            StoredPunishment {
                player_name: "A".into(),
                reason: String::new(),
                expire_time: None,
                created_time: 0,
            },
        );
        assert_eq!(doc.section(PunishmentKind::Mute).len(), 1);
        assert!(doc.section(PunishmentKind::Ban).is_empty());
        assert_eq!(doc.len(), 1);
    }
}
