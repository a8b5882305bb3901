use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::preferences::SchedulerPreferences;
use crate::models::schedule::TimeWindow;

/// Handle to an event created on an external calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub event_id: String,
    pub calendar_id: String,
}

/// External calendar contract. The engine itself never calls this; the caller
/// fetches busy intervals before `generate` and applies assignments afterwards.
#[async_trait::async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn get_busy_intervals(
        &self,
        calendar_ids: &[String],
        start_at: &str,
        end_at: &str,
    ) -> AppResult<Vec<TimeWindow>>;

    async fn create_event(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
        title: &str,
    ) -> AppResult<EventRef>;
}

/// Provider over a fixed set of intervals, for tests and offline callers.
#[derive(Debug, Default)]
pub struct StaticCalendarProvider {
    busy: Vec<TimeWindow>,
    created: RwLock<Vec<EventRef>>,
}

impl StaticCalendarProvider {
    pub fn new(busy: Vec<TimeWindow>) -> Self {
        Self {
            busy,
            created: RwLock::new(Vec::new()),
        }
    }

    pub fn created_events(&self) -> Vec<EventRef> {
        self.created
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl CalendarProvider for StaticCalendarProvider {
    async fn get_busy_intervals(
        &self,
        _calendar_ids: &[String],
        _start_at: &str,
        _end_at: &str,
    ) -> AppResult<Vec<TimeWindow>> {
        Ok(self.busy.clone())
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
        _title: &str,
    ) -> AppResult<EventRef> {
        let event_ref = EventRef {
            event_id: format!("{}/{}", calendar_id, window.start_at),
            calendar_id: calendar_id.to_string(),
        };
        let mut created = self
            .created
            .write()
            .map_err(|_| AppError::collaborator("calendar", "event log poisoned"))?;
        created.push(event_ref.clone());
        Ok(event_ref)
    }
}

/// Key-value persistence for preferences, owned by the caller. The engine
/// stays storage-free.
pub trait SettingsStore: Send + Sync {
    fn load_preferences(&self, key: &str) -> AppResult<Option<SchedulerPreferences>>;
    fn save_preferences(&self, key: &str, preferences: &SchedulerPreferences) -> AppResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: RwLock<HashMap<String, String>>,
}

impl SettingsStore for MemorySettingsStore {
    fn load_preferences(&self, key: &str) -> AppResult<Option<SchedulerPreferences>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::collaborator("settings", "store poisoned"))?;
        match entries.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save_preferences(&self, key: &str, preferences: &SchedulerPreferences) -> AppResult<()> {
        let raw = serde_json::to_string(preferences)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::collaborator("settings", "store poisoned"))?;
        entries.insert(key.to_string(), raw);
        Ok(())
    }
}
