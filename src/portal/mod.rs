//! Broker portal: typed records over the row store, list search, the edit
//! session state machine, broker account state and document attachments.

pub mod attachments;
pub mod brokers;
pub mod diff;
pub mod editor;
pub mod entity;
pub mod error;
pub mod models;
pub mod records;
pub mod search;
pub mod session;
pub mod store;

pub use attachments::{BlobError, BlobStore, FsBlobStore, MemoryBlobStore};
pub use editor::{EditMode, RecordEditor, RecordList, SaveOutcome};
pub use entity::{EntityKind, PortalEntity};
pub use error::PortalError;
pub use session::Session;
pub use store::{MemoryRowStore, PgRowStore, RowStore, StoreError};
