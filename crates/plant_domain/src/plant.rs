use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often a plant wants water, e.g. three times a week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaterFrequency {
    pub times: u32,
    pub repeat_every: RepeatEvery,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepeatEvery {
    Day,
    Week,
}

/// A saved plant together with its reminder state. Display fields are opaque
/// to the store and default when missing, so records written before a field
/// existed still decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub water_tip: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub environments: Vec<String>,
    pub frequency: WaterFrequency,
    pub date_time_notification: DateTime<Utc>,
    #[serde(default)]
    pub hour: String,
}

impl Plant {
    /// Time of day of the armed reminder, `"HH:MM"`.
    pub fn reminder_hour(&self) -> String {
        self.date_time_notification.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_every_uses_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&RepeatEvery::Week).unwrap(),
            "\"week\""
        );
        assert_eq!(
            serde_json::from_str::<RepeatEvery>("\"day\"").unwrap(),
            RepeatEvery::Day
        );
    }

    #[test]
    fn reminder_hour_formats_the_armed_instant() {
        let plant = Plant {
            id: "1".to_string(),
            name: "Aloe".to_string(),
            about: String::new(),
            water_tip: String::new(),
            photo: String::new(),
            environments: Vec::new(),
            frequency: WaterFrequency {
                times: 1,
                repeat_every: RepeatEvery::Day,
            },
            date_time_notification: "2026-03-01T08:30:00Z".parse().unwrap(),
            hour: String::new(),
        };
        assert_eq!(plant.reminder_hour(), "08:30");
    }
}
