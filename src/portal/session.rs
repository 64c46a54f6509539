use serde::Serialize;
use uuid::Uuid;

use super::models::{Broker, BrokerRole};

/// The authenticated broker behind a portal request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: BrokerRole,
}

impl Session {
    pub fn for_broker(broker: &Broker) -> Self {
        Self {
            user_id: broker.id,
            email: broker.email.clone(),
            role: broker.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == BrokerRole::Admin
    }
}
