//! Share and export links.
//!
//! A payload travels as `base64(percent_encode(json))` in the `shared` or
//! `import` query parameter of the application's own URL. Links carry no
//! signature or version; anything that parses is accepted.

use crate::models::{AppData, DhikrRecord, Settings, ShareKind, lenient_opt_bool};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const SHARE_PARAM: &str = "shared";
pub const IMPORT_PARAM: &str = "import";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("query parameter '{0}' is missing")]
    MissingParam(&'static str),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid percent-encoding: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
    #[serde(rename = "type", default)]
    pub kind: ShareKind,
    pub dhikrs: Vec<DhikrRecord>,
    #[serde(default)]
    pub timestamp: i64,
}

/// Settings as exported: `None` leaves the receiving side untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub sound: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub vibration: Option<bool>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub has_seen_intro: Option<bool>,
}

impl SettingsSnapshot {
    pub fn of(settings: &Settings) -> Self {
        Self {
            sound: Some(settings.sound),
            vibration: Some(settings.vibration),
            theme: settings.theme.clone(),
            has_seen_intro: Some(settings.has_seen_intro),
        }
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(sound) = self.sound {
            settings.sound = sound;
        }
        if let Some(vibration) = self.vibration {
            settings.vibration = vibration;
        }
        if let Some(theme) = &self.theme {
            settings.theme = Some(theme.clone());
        }
        if let Some(seen) = self.has_seen_intro {
            settings.has_seen_intro = seen;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    #[serde(default, deserialize_with = "records_or_json_text")]
    pub dhikrs: Option<Vec<DhikrRecord>>,
    #[serde(default)]
    pub settings: Option<SettingsSnapshot>,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsField {
    List(Vec<DhikrRecord>),
    Text(String),
}

/// Older exports carry the record array as a JSON string.
fn records_or_json_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<DhikrRecord>>, D::Error> {
    match Option::<RecordsField>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RecordsField::List(records)) => Ok(Some(records)),
        Some(RecordsField::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RecordsField::Text(text)) => serde_json::from_str(&text).map(Some).map_err(D::Error::custom),
    }
}

pub fn encode_payload<T: Serialize>(payload: &T) -> Result<String, CodecError> {
    let json = serde_json::to_string(payload)?;
    let escaped = urlencoding::encode(&json);
    Ok(STANDARD.encode(escaped.as_bytes()))
}

pub fn decode_payload<T: DeserializeOwned>(encoded: &str) -> Result<T, CodecError> {
    // A raw '+' reaches us as a space when the link went through form decoding.
    let encoded = encoded.trim().replace(' ', "+");
    let escaped = String::from_utf8(STANDARD.decode(encoded.as_bytes())?)?;
    let json = urlencoding::decode(&escaped)?;
    Ok(serde_json::from_str(&json)?)
}

fn link(origin: &str, param: &str, encoded: &str) -> String {
    format!(
        "{}/?{}={}",
        origin.trim_end_matches('/'),
        param,
        urlencoding::encode(encoded)
    )
}

/// Value of `name` in the query string of `url`, percent-decoded.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

fn decode_param<T: DeserializeOwned>(url: &str, param: &'static str) -> Result<T, CodecError> {
    let value = query_param(url, param).ok_or(CodecError::MissingParam(param))?;
    decode_payload(&value)
}

pub fn share_link(
    origin: &str,
    dhikrs: &[DhikrRecord],
    kind: ShareKind,
    timestamp: i64,
) -> Result<String, CodecError> {
    let payload = SharePayload {
        kind,
        dhikrs: dhikrs.to_vec(),
        timestamp,
    };
    Ok(link(origin, SHARE_PARAM, &encode_payload(&payload)?))
}

pub fn export_link(origin: &str, data: &AppData, timestamp: i64) -> Result<String, CodecError> {
    let payload = ExportPayload {
        dhikrs: Some(data.dhikrs.clone()),
        settings: Some(SettingsSnapshot::of(&data.settings)),
        timestamp,
    };
    Ok(link(origin, IMPORT_PARAM, &encode_payload(&payload)?))
}

pub fn decode_shared(url: &str) -> Option<SharePayload> {
    decode_param(url, SHARE_PARAM)
        .map_err(|err| debug!("rejected share link: {err}"))
        .ok()
}

pub fn decode_import(url: &str) -> Option<ExportPayload> {
    decode_param(url, IMPORT_PARAM)
        .map_err(|err| debug!("rejected import link: {err}"))
        .ok()
}

/// Replaces the record set and any settings the payload names.
pub fn apply_import(data: &mut AppData, payload: ExportPayload) {
    if let Some(dhikrs) = payload.dhikrs {
        data.dhikrs = dhikrs;
    }
    if let Some(settings) = payload.settings {
        settings.apply_to(&mut data.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recurrence, ReminderTime, Schedule, Status, Weekday};
    use chrono::{TimeZone, Utc};

    const ORIGIN: &str = "http://localhost:8080";

    fn bare(id: &str) -> DhikrRecord {
        DhikrRecord {
            id: id.to_string(),
            name: "Subhanallah".to_string(),
            target_count: 33,
            current_count: 0,
            date_created: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            date_completed: None,
            status: Status::Planned,
            category: None,
            schedule: None,
            arabic_text: None,
            transliteration: None,
            translation: None,
        }
    }

    fn full(id: &str) -> DhikrRecord {
        let done = Utc.with_ymd_and_hms(2026, 1, 3, 7, 0, 0).unwrap();
        DhikrRecord {
            current_count: 33,
            date_completed: Some(done),
            status: Status::Completed,
            category: Some("Tesbih".to_string()),
            schedule: Some(Schedule {
                time: ReminderTime::parse("05:45").unwrap(),
                recurrence: Recurrence::Weekdays(vec![Weekday::Friday]),
                kind: None,
                repeat: None,
            }),
            arabic_text: Some("سُبْحَانَ اللّهِ".to_string()),
            transliteration: Some("Sübhanallah".to_string()),
            translation: Some("Glory be to Allah & praise?".to_string()),
            ..bare(id)
        }
    }

    #[test]
    fn share_link_round_trips() {
        for dhikrs in [vec![], vec![bare("1")], vec![bare("1"), full("2")]] {
            let url = share_link(ORIGIN, &dhikrs, ShareKind::List, 42).unwrap();
            assert!(url.starts_with("http://localhost:8080/?shared="));
            let shared = decode_shared(&url).expect("decodes");
            assert_eq!(shared.kind, ShareKind::List);
            assert_eq!(shared.dhikrs, dhikrs);
            assert_eq!(shared.timestamp, 42);
        }
    }

    #[test]
    fn export_link_round_trips() {
        let mut data = AppData::default();
        data.dhikrs.push(full("7"));
        data.settings.sound = false;
        data.settings.theme = Some("dark".to_string());

        let url = export_link(ORIGIN, &data, 1).unwrap();
        let payload = decode_import(&url).expect("decodes");

        let mut restored = AppData::default();
        apply_import(&mut restored, payload);
        assert_eq!(restored, data);
    }

    #[test]
    fn share_and_import_params_are_distinct() {
        let url = share_link(ORIGIN, &[bare("1")], ShareKind::Single, 0).unwrap();
        assert!(decode_import(&url).is_none());
    }

    #[test]
    fn malformed_links_decode_to_none() {
        assert!(decode_shared("http://localhost:8080/").is_none());
        assert!(decode_shared("http://localhost:8080/?shared=%%%").is_none());
        assert!(decode_shared("http://localhost:8080/?shared=bm90IGpzb24=").is_none());
        assert!(decode_import("http://localhost:8080/?import=").is_none());
    }

    #[test]
    fn accepts_links_built_by_the_browser_app() {
        // btoa(encodeURIComponent(JSON.stringify(data))) with the record
        // array stored as a string and settings as boolean strings.
        let json = serde_json::json!({
            "dhikrs": serde_json::to_string(&vec![bare("5")]).unwrap(),
            "settings": { "sound": "false", "vibration": null, "theme": "light", "hasSeenIntro": "true" },
            "timestamp": 1717000000000_i64
        })
        .to_string();
        let encoded = STANDARD.encode(urlencoding::encode(&json).as_bytes());
        let url = format!("{ORIGIN}?import={encoded}");

        let payload = decode_import(&url).expect("decodes");
        let mut data = AppData::default();
        apply_import(&mut data, payload);
        assert_eq!(data.dhikrs, vec![bare("5")]);
        assert!(!data.settings.sound);
        assert!(data.settings.vibration);
        assert_eq!(data.settings.theme.as_deref(), Some("light"));
        assert!(data.settings.has_seen_intro);
    }

    #[test]
    fn query_param_ignores_fragment_and_other_keys() {
        let url = "http://x/?a=1&shared=abc%2B%3D#top";
        assert_eq!(query_param(url, "shared").as_deref(), Some("abc+="));
        assert_eq!(query_param(url, "a").as_deref(), Some("1"));
        assert!(query_param(url, "import").is_none());
    }
}
