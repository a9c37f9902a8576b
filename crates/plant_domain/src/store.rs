use anyhow::anyhow;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError, PlantCollection, StoredPlant};
use crate::medium::PersistenceMedium;
use crate::notifications::{Clock, NotificationScheduler, SystemClock};
use crate::plant::Plant;

/// Collection key the plant map persists under. Bump the suffix if the
/// stored layout ever changes incompatibly.
pub const PLANTS_KEY: &str = "@regador:plants";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unable to read the plant collection: {0}")]
    Read(anyhow::Error),
    #[error("stored plant collection is corrupted: {0}")]
    Corrupted(#[from] CodecError),
    #[error("unable to persist the plant collection: {0}")]
    Write(anyhow::Error),
    #[error("no saved plant with id `{0}`")]
    PlantNotFound(String),
    #[error("unable to arm the watering reminder: {0}")]
    Schedule(anyhow::Error),
}

/// Result of a successful `remove`. The record is gone from storage either
/// way; `cancel_warning` is set when its armed reminder could not be
/// disarmed.
#[derive(Debug, Default)]
pub struct RemoveOutcome {
    pub cancel_warning: Option<String>,
}

/// Owns the saved-plant collection: one persisted map of records, each
/// carrying its next reminder instant, read back soonest-first.
pub struct PlantStore {
    medium: Box<dyn PersistenceMedium>,
    scheduler: Box<dyn NotificationScheduler>,
    clock: Box<dyn Clock>,
    collection_key: String,
    mutation: Mutex<()>,
}

pub struct PlantStoreBuilder {
    medium: Option<Box<dyn PersistenceMedium>>,
    scheduler: Option<Box<dyn NotificationScheduler>>,
    clock: Box<dyn Clock>,
    collection_key: String,
}

impl PlantStoreBuilder {
    pub fn new() -> Self {
        Self {
            medium: None,
            scheduler: None,
            clock: Box::new(SystemClock),
            collection_key: PLANTS_KEY.to_string(),
        }
    }

    pub fn with_medium(mut self, medium: Box<dyn PersistenceMedium>) -> Self {
        self.medium = Some(medium);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Box<dyn NotificationScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_collection_key(mut self, key: impl Into<String>) -> Self {
        self.collection_key = key.into();
        self
    }

    pub fn build(self) -> anyhow::Result<PlantStore> {
        let medium = self
            .medium
            .ok_or_else(|| anyhow!("a persistence medium is required"))?;
        let scheduler = self
            .scheduler
            .ok_or_else(|| anyhow!("a notification scheduler is required"))?;
        Ok(PlantStore {
            medium,
            scheduler,
            clock: self.clock,
            collection_key: self.collection_key,
            mutation: Mutex::new(()),
        })
    }
}

impl Default for PlantStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlantStore {
    pub fn builder() -> PlantStoreBuilder {
        PlantStoreBuilder::new()
    }

    /// Every saved plant, soonest reminder first. Equal instants keep their
    /// insertion order. An absent collection is an empty one; a collection
    /// with any undecodable record is an error, never a shorter list.
    pub fn load(&self) -> Result<Vec<Plant>, StoreError> {
        let mut entries: Vec<StoredPlant> = self.read_collection()?.into_values().collect();
        entries.sort_by(|a, b| {
            a.data
                .date_time_notification
                .cmp(&b.data.date_time_notification)
                .then_with(|| a.added_at.cmp(&b.added_at))
                .then_with(|| a.data.id.cmp(&b.data.id))
        });
        Ok(entries
            .into_iter()
            .map(|entry| {
                let mut plant = entry.data;
                plant.hour = plant.reminder_hour();
                plant
            })
            .collect())
    }

    /// Insert or replace a plant and arm its watering reminder.
    ///
    /// A caller-supplied instant still ahead of the clock is authoritative
    /// and armed verbatim; anything else is recomputed from the watering
    /// frequency. When an existing entry is replaced, its old reminder is
    /// disarmed best-effort.
    pub fn save(&self, mut plant: Plant) -> Result<(), StoreError> {
        let _guard = self.mutation.lock();
        let mut entries = self.read_collection()?;

        let (fire_at, handle) = if plant.date_time_notification > self.clock.now() {
            let handle = self
                .scheduler
                .schedule_at(plant.date_time_notification)
                .map_err(StoreError::Schedule)?;
            (plant.date_time_notification, handle)
        } else {
            let armed = self
                .scheduler
                .schedule_next(&plant.frequency)
                .map_err(StoreError::Schedule)?;
            (armed.fire_at, armed.handle)
        };
        plant.date_time_notification = fire_at;
        plant.hour = plant.reminder_hour();

        let added_at = match entries.remove(&plant.id) {
            Some(previous) => {
                if let Err(err) = self.scheduler.cancel(&previous.notification_id) {
                    warn!(id = %plant.id, %err, "could not disarm replaced reminder");
                }
                previous.added_at
            }
            None => self.clock.now(),
        };

        debug!(id = %plant.id, %fire_at, "saving plant");
        entries.insert(
            plant.id.clone(),
            StoredPlant {
                data: plant,
                notification_id: handle,
                added_at,
            },
        );
        self.write_collection(&entries)
    }

    /// Drop a plant and disarm its reminder. Removing an unknown id fails
    /// without touching the collection; a failed disarm is downgraded to a
    /// warning and the record is removed regardless.
    pub fn remove(&self, id: &str) -> Result<RemoveOutcome, StoreError> {
        let _guard = self.mutation.lock();
        let mut entries = self.read_collection()?;
        let Some(entry) = entries.remove(id) else {
            return Err(StoreError::PlantNotFound(id.to_string()));
        };

        let mut outcome = RemoveOutcome::default();
        if let Err(err) = self.scheduler.cancel(&entry.notification_id) {
            warn!(id, %err, "could not disarm reminder, removing the plant anyway");
            outcome.cancel_warning = Some(err.to_string());
        }

        self.write_collection(&entries)?;
        info!(id, "removed plant");
        Ok(outcome)
    }

    fn read_collection(&self) -> Result<PlantCollection, StoreError> {
        let raw = self
            .medium
            .get(&self.collection_key)
            .map_err(StoreError::Read)?;
        match raw {
            Some(text) => Ok(codec::decode_collection(&text)?),
            None => Ok(PlantCollection::new()),
        }
    }

    fn write_collection(&self, entries: &PlantCollection) -> Result<(), StoreError> {
        let encoded =
            codec::encode_collection(entries).map_err(|err| StoreError::Write(err.into()))?;
        self.medium
            .set(&self.collection_key, &encoded)
            .map_err(StoreError::Write)
    }
}
