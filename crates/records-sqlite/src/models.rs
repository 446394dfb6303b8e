use authconv_core::Result;
use serde::{Deserialize, Serialize};

pub type RecordId = i64;

/// Legacy tokens carry no expiry; zero marks them expired so the daemon refreshes on first use.
pub const MIGRATED_EXPIRES: i64 = 0;

/// Row of the legacy `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyUser {
    pub ss14_userid: String,
    pub discord_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Row of the legacy `given` table, already filtered to flags 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyGiven {
    pub discord_id: String,
    pub is_given: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthorizedRecord {
    pub uid: String,
    pub discord_uid: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires: i64,
    pub updated_at: String,
}

impl NewAuthorizedRecord {
    pub fn from_legacy(user: LegacyUser, migrated_at: &str) -> Self {
        NewAuthorizedRecord {
            uid: user.ss14_userid,
            discord_uid: user.discord_id,
            access_token: user.access_token,
            refresh_token: user.refresh_token,
            expires: MIGRATED_EXPIRES,
            updated_at: migrated_at.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedRecord {
    pub id: RecordId,
    pub uid: String,
    pub discord_uid: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires: i64,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExtra {
    pub id: RecordId,
    pub record_id: RecordId,
    pub json: String,
}

/// Contents of `records_extra.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPayload {
    pub loadout_given: i64,
}

impl ExtraPayload {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_user_maps_to_expired_record() {
        let user = LegacyUser {
            ss14_userid: "ss14-A".into(),
            discord_id: "discordA".into(),
            access_token: "acc1".into(),
            refresh_token: "ref1".into(),
        };
        let rec = NewAuthorizedRecord::from_legacy(user, "2024-01-02 03:04:05");
        assert_eq!(rec.uid, "ss14-A");
        assert_eq!(rec.discord_uid, "discordA");
        assert_eq!(rec.expires, 0);
        assert_eq!(rec.updated_at, "2024-01-02 03:04:05");
    }

    #[test]
    fn payload_encodes_as_object() {
        let json = ExtraPayload { loadout_given: 1 }.encode().unwrap();
        assert_eq!(json, r#"{"loadout_given":1}"#);
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["loadout_given"], 1);
    }
}
