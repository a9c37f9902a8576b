use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notifications::NotificationHandle;
use crate::plant::Plant;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed plant record: {0}")]
    Record(#[source] serde_json::Error),
    #[error("malformed plant collection: {0}")]
    Collection(#[source] serde_json::Error),
}

/// One persisted entry: the record plus the bookkeeping the store needs to
/// disarm and re-order it later. `added_at` is assigned on first insert and
/// survives upserts, giving `load` a durable tie-break for equal reminder
/// instants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPlant {
    pub data: Plant,
    pub notification_id: NotificationHandle,
    pub added_at: DateTime<Utc>,
}

/// The full persisted mapping, plant id to stored entry. A `BTreeMap` keeps
/// the encoded form deterministic.
pub type PlantCollection = BTreeMap<String, StoredPlant>;

pub fn encode_record(plant: &Plant) -> Result<String, CodecError> {
    serde_json::to_string(plant).map_err(CodecError::Record)
}

pub fn decode_record(text: &str) -> Result<Plant, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Record)
}

pub fn encode_collection(entries: &PlantCollection) -> Result<String, CodecError> {
    serde_json::to_string(entries).map_err(CodecError::Collection)
}

pub fn decode_collection(text: &str) -> Result<PlantCollection, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::{RepeatEvery, WaterFrequency};

    fn sample_plant() -> Plant {
        Plant {
            id: "plant-1".to_string(),
            name: "Samambaia".to_string(),
            about: "Likes shade and humid corners.".to_string(),
            water_tip: "Keep the soil moist, never soaked.".to_string(),
            photo: "samambaia.png".to_string(),
            environments: vec!["living_room".to_string(), "bedroom".to_string()],
            frequency: WaterFrequency {
                times: 2,
                repeat_every: RepeatEvery::Week,
            },
            date_time_notification: "2026-04-02T09:15:00Z".parse().unwrap(),
            hour: "09:15".to_string(),
        }
    }

    #[test]
    fn record_round_trips_field_for_field() {
        let plant = sample_plant();
        let encoded = encode_record(&plant).unwrap();
        let decoded = decode_record(&encoded).unwrap();
        assert_eq!(decoded, plant);
    }

    #[test]
    fn decode_rejects_missing_required_fields() {
        let err = decode_record(r#"{"id":"x","name":"Aloe"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Record(_)));
    }

    #[test]
    fn decode_rejects_unparsable_timestamps() {
        let text = r#"{
            "id": "x",
            "name": "Aloe",
            "frequency": {"times": 1, "repeat_every": "day"},
            "date_time_notification": "next tuesday"
        }"#;
        assert!(decode_record(text).is_err());
    }

    #[test]
    fn decode_defaults_missing_display_fields_and_ignores_unknown_ones() {
        let text = r#"{
            "id": "x",
            "name": "Aloe",
            "frequency": {"times": 1, "repeat_every": "day"},
            "date_time_notification": "2026-04-02T09:15:00Z",
            "some_future_field": 42
        }"#;
        let plant = decode_record(text).unwrap();
        assert_eq!(plant.about, "");
        assert!(plant.environments.is_empty());
        assert_eq!(plant.hour, "");
    }

    #[test]
    fn collection_round_trips() {
        let mut entries = PlantCollection::new();
        entries.insert(
            "plant-1".to_string(),
            StoredPlant {
                data: sample_plant(),
                notification_id: NotificationHandle::new("reminder-0"),
                added_at: "2026-04-01T10:00:00Z".parse().unwrap(),
            },
        );
        let encoded = encode_collection(&entries).unwrap();
        assert_eq!(decode_collection(&encoded).unwrap(), entries);
    }

    #[test]
    fn collection_decode_fails_on_any_bad_record() {
        let text = r#"{"plant-1": {"data": {"id": "plant-1"}, "notification_id": "r-0"}}"#;
        assert!(matches!(
            decode_collection(text),
            Err(CodecError::Collection(_))
        ));
    }
}
