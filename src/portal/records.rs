use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::entity::PortalEntity;
use super::error::PortalError;
use super::models::{Application, ApplicationDetail, Client, Lender};
use super::session::Session;
use super::store::{fetch_record, find_record, from_row, to_row, RowStore};

/// Form checks plus existence of every referenced record. The in-memory store
/// has no foreign keys, so this is where dangling ids are refused.
async fn check_draft<E: PortalEntity>(store: &dyn RowStore, draft: &E::Draft) -> Result<(), PortalError> {
    E::validate(draft).map_err(PortalError::Validation)?;

    for (kind, id, message) in E::references(draft) {
        if store.get_by_id(kind, id).await?.is_none() {
            return Err(PortalError::Validation(message.to_string()));
        }
    }
    Ok(())
}

/// Insert a new record from a draft, stamping the owner column from the
/// session where the kind has one.
pub async fn create_record<E: PortalEntity>(
    store: &dyn RowStore,
    session: &Session,
    draft: &E::Draft,
) -> Result<E, PortalError> {
    check_draft::<E>(store, draft).await?;

    let mut fields = to_row(E::KIND, draft)?;
    if let Some(owner) = E::KIND.owner_column() {
        fields.insert(owner.to_string(), Value::String(session.user_id.to_string()));
    }

    let row = store.insert(E::KIND, fields).await?;
    let record: E = from_row(row)?;
    debug!("Created {} {} for {}", E::KIND, record.id(), session.user_id);
    Ok(record)
}

/// Replace the editable fields of an existing record. Identity and owner are
/// never sent.
pub async fn update_record<E: PortalEntity>(
    store: &dyn RowStore,
    id: Uuid,
    draft: &E::Draft,
) -> Result<E, PortalError> {
    check_draft::<E>(store, draft).await?;

    let fields = to_row(E::KIND, draft)?;
    let row = store.update(E::KIND, id, fields).await?;
    Ok(from_row(row)?)
}

/// An application with its client and lender, fetched concurrently.
pub async fn application_detail(store: &dyn RowStore, id: Uuid) -> Result<ApplicationDetail, PortalError> {
    let application = fetch_record::<Application>(store, id).await?;

    let lender = async {
        match application.lender_id {
            Some(lender_id) => find_record::<Lender>(store, lender_id).await,
            None => Ok(None),
        }
    };
    let (client, lender) = futures::try_join!(find_record::<Client>(store, application.client_id), lender)?;

    Ok(ApplicationDetail { application, client, lender })
}
