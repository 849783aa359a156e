//! crates/rttc_core/src/history.rs
//!
//! The History Store Adapter. One generic store serves translations, conversation
//! turns and OCR captures.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::{DayGroup, HistoryEntry};
use crate::error::StoreError;
use crate::ports::{HistoryRepository, SessionContext};

/// What the store last listed, and the last error it hit.
struct HistoryView<E> {
    records: Vec<E>,
    last_error: Option<String>,
}

/// Writes and reads one kind of history for the current user.
///
/// Without a signed-in user every operation is a silent no-op.
pub struct HistoryStore<E: HistoryEntry> {
    label: &'static str,
    session: Arc<dyn SessionContext>,
    repository: Arc<dyn HistoryRepository<E>>,
    view: RwLock<HistoryView<E>>,
}

impl<E: HistoryEntry> HistoryStore<E> {
    pub fn new(
        label: &'static str,
        session: Arc<dyn SessionContext>,
        repository: Arc<dyn HistoryRepository<E>>,
    ) -> Self {
        Self {
            label,
            session,
            repository,
            view: RwLock::new(HistoryView {
                records: Vec::new(),
                last_error: None,
            }),
        }
    }

    /// Inserts a new record for the current user, then re-lists.
    pub async fn save(&self, payload: E::Payload) -> Result<(), StoreError> {
        let Some(user) = self.session.current_user() else {
            debug!("No signed-in user, not saving {} record", self.label);
            return Ok(());
        };

        let inserted = self
            .repository
            .insert(user.id, &payload, Utc::now())
            .await
            .map_err(|e| self.fail("saving", e.into()))?;
        debug!("Saved {} record {}", self.label, inserted.id());

        self.list().await.map(|_| ())
    }

    /// Lists the user's records: favorites first, then most recent first.
    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        let Some(user) = self.session.current_user() else {
            let mut view = self.view.write();
            view.records.clear();
            view.last_error = None;
            return Ok(Vec::new());
        };

        let mut records = self
            .repository
            .list_for_user(user.id)
            .await
            .map_err(|e| self.fail("listing", e.into()))?;
        sort_history(&mut records);

        let mut view = self.view.write();
        view.records = records.clone();
        view.last_error = None;
        Ok(records)
    }

    /// Deletes one record. Confirming intent is the caller's job.
    pub async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let Some(user) = self.session.current_user() else {
            return Ok(());
        };

        self.repository
            .delete(user.id, id)
            .await
            .map_err(|e| self.fail("deleting", e.into()))?;
        self.list().await.map(|_| ())
    }

    /// Sets the favorite flag to `value`; repeating the call changes nothing.
    pub async fn set_favorite(&self, id: Uuid, value: bool) -> Result<(), StoreError> {
        let Some(user) = self.session.current_user() else {
            return Ok(());
        };

        self.repository
            .set_favorite(user.id, id, value)
            .await
            .map_err(|e| self.fail("updating", e.into()))?;
        self.list().await.map(|_| ())
    }

    /// The records as of the last successful listing.
    pub fn records(&self) -> Vec<E> {
        self.view.read().records.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.view.read().last_error.clone()
    }

    fn fail(&self, action: &str, e: StoreError) -> StoreError {
        error!("Error {} {} history: {}", action, self.label, e);
        self.view.write().last_error = Some(e.to_string());
        e
    }
}

/// Favorites before the rest, newest first within each group. Stable.
pub fn sort_history<E: HistoryEntry>(records: &mut [E]) {
    records.sort_by(|a, b| {
        b.is_favorite()
            .cmp(&a.is_favorite())
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

/// Buckets records by UTC calendar day: most recent day first, records oldest first
/// inside each day.
pub fn group_by_day<E: HistoryEntry>(records: &[E]) -> Vec<DayGroup<E>> {
    let mut days: BTreeMap<NaiveDate, Vec<E>> = BTreeMap::new();
    for record in records {
        days.entry(record.created_at().date_naive())
            .or_default()
            .push(record.clone());
    }

    days.into_iter()
        .rev()
        .map(|(date, mut records)| {
            records.sort_by_key(|record| record.created_at());
            DayGroup { date, records }
        })
        .collect()
}
