//! Edit session over one record kind: `Viewing ⇄ Editing(Create | Update)`.
//!
//! The editor holds a draft and the snapshot it was opened from. Saving writes
//! through the row store and returns to `Viewing`; a failed save keeps the
//! draft and the error message so the form can be shown again as it was.

use tracing::{debug, warn};
use uuid::Uuid;

use super::diff::{diff_fields, FieldChange};
use super::entity::PortalEntity;
use super::error::PortalError;
use super::records::{create_record, update_record};
use super::search::filter_records;
use super::session::Session;
use super::store::{fetch_record, list_records, RowStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Creating,
    Updating(Uuid),
}

/// Result of a successful save. Either way the caller should reload its list.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<E> {
    Created(E),
    Updated(E),
}

impl<E> SaveOutcome<E> {
    pub fn record(&self) -> &E {
        match self {
            SaveOutcome::Created(r) | SaveOutcome::Updated(r) => r,
        }
    }

    pub fn into_record(self) -> E {
        match self {
            SaveOutcome::Created(r) | SaveOutcome::Updated(r) => r,
        }
    }
}

pub struct RecordEditor<E: PortalEntity> {
    mode: EditMode,
    draft: E::Draft,
    initial: E::Draft,
    last_error: Option<String>,
}

impl<E: PortalEntity> Default for RecordEditor<E> {
    fn default() -> Self {
        Self {
            mode: EditMode::Viewing,
            draft: E::Draft::default(),
            initial: E::Draft::default(),
            last_error: None,
        }
    }
}

impl<E: PortalEntity> RecordEditor<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record for editing by id, or an empty draft when `id` is `None`.
    pub async fn open(&mut self, store: &dyn RowStore, id: Option<Uuid>) -> Result<(), PortalError> {
        let Some(id) = id else {
            self.open_new();
            return Ok(());
        };

        match fetch_record::<E>(store, id).await {
            Ok(record) => {
                self.open_record(&record);
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn open_new(&mut self) {
        self.draft = E::Draft::default();
        self.initial = E::Draft::default();
        self.mode = EditMode::Creating;
        self.last_error = None;
    }

    pub fn open_record(&mut self, record: &E) {
        self.draft = record.to_draft();
        self.initial = self.draft.clone();
        self.mode = EditMode::Updating(record.id());
        self.last_error = None;
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode != EditMode::Viewing
    }

    pub fn draft(&self) -> &E::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut E::Draft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: E::Draft) {
        self.draft = draft;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn changes(&self) -> Vec<FieldChange> {
        diff_fields(&self.initial, &self.draft)
    }

    pub fn has_changes(&self) -> bool {
        self.is_editing() && !self.changes().is_empty()
    }

    pub async fn save(&mut self, store: &dyn RowStore, session: &Session) -> Result<SaveOutcome<E>, PortalError> {
        let result = match self.mode {
            EditMode::Viewing => return Err(PortalError::NotEditing),
            EditMode::Creating => create_record::<E>(store, session, &self.draft)
                .await
                .map(SaveOutcome::Created),
            EditMode::Updating(id) => {
                debug!("Saving {} {} ({} changed fields)", E::KIND, id, self.changes().len());
                update_record::<E>(store, id, &self.draft).await.map(SaveOutcome::Updated)
            }
        };

        match result {
            Ok(outcome) => {
                self.initial = outcome.record().to_draft();
                self.draft = self.initial.clone();
                self.mode = EditMode::Viewing;
                self.last_error = None;
                Ok(outcome)
            }
            Err(e) => {
                warn!("Saving {} failed: {}", E::KIND, e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop the draft, restore the snapshot and return to `Viewing`.
    pub fn cancel(&mut self) {
        self.draft = self.initial.clone();
        self.mode = EditMode::Viewing;
        self.last_error = None;
    }
}

/// A loaded list of one record kind plus the current search text.
pub struct RecordList<E: PortalEntity> {
    records: Vec<E>,
    query: String,
}

impl<E: PortalEntity> Default for RecordList<E> {
    fn default() -> Self {
        Self { records: Vec::new(), query: String::new() }
    }
}

impl<E: PortalEntity> RecordList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reload(&mut self, store: &dyn RowStore) -> Result<(), PortalError> {
        self.records = list_records::<E>(store).await?;
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn visible(&self) -> Vec<&E> {
        filter_records(&self.records, &self.query)
    }
}
