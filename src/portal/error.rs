use thiserror::Error;

use super::attachments::BlobError;
use super::store::StoreError;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("You cannot deactivate your own account")]
    SelfDeactivation,

    #[error("Administrator role required")]
    AdminRequired,

    #[error("No record is open for editing")]
    NotEditing,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}
