//! Field-level wire remapping shared by the payload records.
//!
//! Use the modules with `#[serde(default, with = "...")]` on `Option` fields, and
//! [`null_as_default`] with `deserialize_with` on everything else.

use crate::Timestamp;
use chrono::DateTime;
use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` as `T::default()`.
///
/// `#[serde(default)]` only covers a missing key; the service also sends `null` for
/// fields it has no value for.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Converts integer milliseconds since the Unix epoch to a timestamp.
pub fn from_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}

/// Converts a timestamp to integer milliseconds since the Unix epoch.
pub fn to_millis(timestamp: &Timestamp) -> i64 {
    timestamp.timestamp_millis()
}

/// `Option<Timestamp>` as epoch milliseconds. `null`, missing and `0` all read as `None`.
pub mod optional_millis {
    use super::{from_millis, to_millis};
    use crate::Timestamp;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => serializer.serialize_i64(to_millis(timestamp)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            None | Some(0) => Ok(None),
            Some(millis) => from_millis(millis)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp {millis}ms is out of range"))),
        }
    }
}

/// `Option<Urn>` as its string form. `null`, missing and `""` all read as `None`.
pub mod optional_urn {
    use crate::Urn;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Urn>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(urn) => serializer.collect_str(urn),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Urn>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => Urn::parse(&raw).map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Urn;
    use chrono::{TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct Counted {
        #[serde(deserialize_with = "null_as_default")]
        label: String,
        #[serde(deserialize_with = "null_as_default")]
        total: i64,
        #[serde(deserialize_with = "null_as_default")]
        flags: Vec<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct Stamped {
        #[serde(with = "optional_millis")]
        created_at: Option<Timestamp>,
        #[serde(with = "optional_urn")]
        entity_urn: Option<Urn>,
    }

    #[test]
    fn millis_decode_to_the_correct_instant_and_back() {
        let decoded = from_millis(1_700_000_000_000).unwrap();

        assert_eq!(decoded, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
        assert_eq!(to_millis(&decoded), 1_700_000_000_000);
    }

    #[test]
    fn sub_second_precision_survives() {
        let decoded = from_millis(1_616_000_123_456).unwrap();
        assert_eq!(to_millis(&decoded), 1_616_000_123_456);
    }

    #[test]
    fn record_fields_round_trip_through_wire_form() {
        let stamped: Stamped = serde_json::from_value(json!({
            "createdAt": 1_700_000_000_000_i64,
            "entityUrn": "urn:li:fs_event:(2-abc,5-def)"
        }))
        .unwrap();

        assert_eq!(stamped.created_at, from_millis(1_700_000_000_000));
        assert_eq!(
            stamped.entity_urn.as_ref().map(Urn::to_string).as_deref(),
            Some("urn:li:fs_event:(2-abc,5-def)")
        );

        let encoded = serde_json::to_value(&stamped).unwrap();
        assert_eq!(encoded["createdAt"], json!(1_700_000_000_000_i64));
        assert_eq!(encoded["entityUrn"], json!("urn:li:fs_event:(2-abc,5-def)"));
    }

    #[test]
    fn falsy_wire_values_read_as_missing() {
        let stamped: Stamped = serde_json::from_value(json!({
            "createdAt": 0,
            "entityUrn": ""
        }))
        .unwrap();
        assert_eq!(stamped.created_at, None);
        assert!(stamped.entity_urn.is_none());

        let stamped: Stamped = serde_json::from_value(json!({
            "createdAt": null,
            "entityUrn": null
        }))
        .unwrap();
        assert_eq!(stamped.created_at, None);
        assert!(stamped.entity_urn.is_none());

        let stamped: Stamped = serde_json::from_value(json!({})).unwrap();
        assert_eq!(stamped.created_at, None);
        assert!(stamped.entity_urn.is_none());
    }

    #[test]
    fn explicit_null_reads_as_default_value() {
        let counted: Counted = serde_json::from_value(json!({
            "label": null,
            "total": null,
            "flags": null
        }))
        .unwrap();
        assert_eq!(counted.label, "");
        assert_eq!(counted.total, 0);
        assert!(counted.flags.is_empty());

        let counted: Counted = serde_json::from_value(json!({
            "label": "x",
            "total": 3,
            "flags": [true]
        }))
        .unwrap();
        assert_eq!(counted.label, "x");
        assert_eq!(counted.total, 3);
        assert_eq!(counted.flags, [true]);
    }

    #[test]
    fn null_does_not_mask_a_wrong_type() {
        let result = serde_json::from_value::<Counted>(json!({ "total": "three" }));
        assert!(result.is_err());
    }
}
