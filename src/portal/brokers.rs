use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::entity::{EntityKind, PortalEntity};
use super::error::PortalError;
use super::models::{Broker, BrokerDraft, BrokerRole};
use super::session::Session;
use super::store::{fetch_record, find_record, from_row, to_row, RowStore};

/// Create a broker profile. `id` links the profile to an existing identity
/// provider account; a fresh id is generated when it is absent.
pub async fn create_broker(
    store: &dyn RowStore,
    session: &Session,
    id: Option<Uuid>,
    draft: &BrokerDraft,
) -> Result<Broker, PortalError> {
    if !session.is_admin() {
        return Err(PortalError::AdminRequired);
    }
    Broker::validate(draft).map_err(PortalError::Validation)?;
    if let Some(id) = id {
        if find_record::<Broker>(store, id).await?.is_some() {
            return Err(PortalError::Validation(format!("Broker {} already exists", id)));
        }
    }

    let mut fields = to_row(EntityKind::Broker, draft)?;
    if let Some(id) = id {
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }
    let broker: Broker = from_row(store.insert(EntityKind::Broker, fields).await?)?;
    info!("Broker {} created by {}", broker.id, session.user_id);
    Ok(broker)
}

/// Seed an admin profile into an empty broker table so a fresh deployment
/// has someone who can sign in. Returns the seeded profile, if any.
pub async fn bootstrap_admin(
    store: &dyn RowStore,
    id: Uuid,
    email: &str,
) -> Result<Option<Broker>, PortalError> {
    if !store.list(EntityKind::Broker).await?.is_empty() {
        return Ok(None);
    }

    let draft = BrokerDraft {
        full_name: "Administrator".to_string(),
        email: email.to_string(),
        role: BrokerRole::Admin,
        ..Default::default()
    };
    let seed = Session { user_id: id, email: email.to_string(), role: BrokerRole::Admin };
    let broker = create_broker(store, &seed, Some(id), &draft).await?;
    warn!("Seeded bootstrap admin {} <{}>", broker.id, broker.email);
    Ok(Some(broker))
}

/// Enable or disable a broker account and return the refreshed profile.
///
/// Both rejections happen before the store is touched: the caller must be an
/// admin, and nobody may deactivate their own account.
pub async fn set_broker_active(
    store: &dyn RowStore,
    session: &Session,
    target: Uuid,
    active: bool,
) -> Result<Broker, PortalError> {
    if !session.is_admin() {
        warn!("Non-admin {} attempted to change account state of {}", session.user_id, target);
        return Err(PortalError::AdminRequired);
    }
    if !active && target == session.user_id {
        warn!("Broker {} attempted to deactivate their own account", session.user_id);
        return Err(PortalError::SelfDeactivation);
    }

    store.set_account_active(target, active).await?;
    info!(
        "Broker {} {} by {}",
        target,
        if active { "reactivated" } else { "deactivated" },
        session.user_id
    );
    Ok(fetch_record::<Broker>(store, target).await?)
}
