use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

use super::models::{
    Application, ApplicationDraft, Broker, BrokerDraft, Client, ClientDraft, Lender, LenderDraft,
};

/// The four record kinds the portal manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Application,
    Lender,
    Broker,
}

impl EntityKind {
    pub const fn table(self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Application => "applications",
            EntityKind::Lender => "lenders",
            EntityKind::Broker => "brokers",
        }
    }

    /// Fixed list ordering, in `column direction` form.
    pub const fn list_order(self) -> &'static str {
        match self {
            EntityKind::Client | EntityKind::Application => "created_at desc",
            EntityKind::Lender => "name asc",
            EntityKind::Broker => "full_name asc",
        }
    }

    /// Column stamped with the creating broker on insert.
    pub const fn owner_column(self) -> Option<&'static str> {
        match self {
            EntityKind::Client | EntityKind::Application => Some("broker_id"),
            EntityKind::Lender | EntityKind::Broker => None,
        }
    }

    /// Columns a write must never touch.
    pub fn protected_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Client | EntityKind::Application => &["id", "broker_id", "created_at", "updated_at"],
            EntityKind::Lender => &["id", "created_at", "updated_at"],
            EntityKind::Broker => &["id", "is_active", "created_at", "updated_at"],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Application => "application",
            EntityKind::Lender => "lender",
            EntityKind::Broker => "broker",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed portal record and its editable draft.
pub trait PortalEntity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    type Draft: Serialize + DeserializeOwned + Clone + Default + PartialEq + Debug + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    fn to_draft(&self) -> Self::Draft;

    /// String fields searched by the list filter.
    fn search_fields(&self) -> Vec<&str>;

    /// Form-level checks run before any write.
    fn validate(_draft: &Self::Draft) -> Result<(), String> {
        Ok(())
    }

    /// Records the draft points at, with the message used when one is missing.
    fn references(_draft: &Self::Draft) -> Vec<(EntityKind, Uuid, &'static str)> {
        Vec::new()
    }
}

impl PortalEntity for Client {
    type Draft = ClientDraft;
    const KIND: EntityKind = EntityKind::Client;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_draft(&self) -> ClientDraft {
        ClientDraft {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            annual_income: self.annual_income,
            credit_score: self.credit_score,
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.full_name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.phone.as_deref());
        fields
    }

    fn validate(draft: &ClientDraft) -> Result<(), String> {
        if draft.full_name.trim().is_empty() {
            return Err("Full name is required".to_string());
        }
        if let Some(score) = draft.credit_score {
            if !(300..=900).contains(&score) {
                return Err("Credit score must be between 300 and 900".to_string());
            }
        }
        Ok(())
    }
}

impl PortalEntity for Application {
    type Draft = ApplicationDraft;
    const KIND: EntityKind = EntityKind::Application;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_draft(&self) -> ApplicationDraft {
        ApplicationDraft {
            client_id: Some(self.client_id),
            lender_id: self.lender_id,
            loan_amount: self.loan_amount,
            property_value: self.property_value,
            loan_type: self.loan_type,
            term_months: self.term_months,
            interest_rate: self.interest_rate,
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.status.as_str(), self.loan_type.as_str()];
        fields.extend(self.notes.as_deref());
        fields
    }

    fn validate(draft: &ApplicationDraft) -> Result<(), String> {
        if draft.client_id.is_none() {
            return Err("An application must reference a client".to_string());
        }
        if draft.loan_amount <= rust_decimal::Decimal::ZERO {
            return Err("Loan amount must be greater than zero".to_string());
        }
        if let Some(term) = draft.term_months {
            if term <= 0 {
                return Err("Term must be a positive number of months".to_string());
            }
        }
        Ok(())
    }

    fn references(draft: &ApplicationDraft) -> Vec<(EntityKind, Uuid, &'static str)> {
        let mut refs: Vec<_> = draft
            .client_id
            .map(|id| (EntityKind::Client, id, "Referenced client does not exist"))
            .into_iter()
            .collect();
        refs.extend(draft.lender_id.map(|id| (EntityKind::Lender, id, "Referenced lender does not exist")));
        refs
    }
}

impl PortalEntity for Lender {
    type Draft = LenderDraft;
    const KIND: EntityKind = EntityKind::Lender;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_draft(&self) -> LenderDraft {
        LenderDraft {
            name: self.name.clone(),
            contact_name: self.contact_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            region: self.region,
            is_active: self.is_active,
            notes: self.notes.clone(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.contact_name.as_deref());
        fields.extend(self.email.as_deref());
        fields
    }

    fn validate(draft: &LenderDraft) -> Result<(), String> {
        if draft.name.trim().is_empty() {
            return Err("Lender name is required".to_string());
        }
        Ok(())
    }
}

impl PortalEntity for Broker {
    type Draft = BrokerDraft;
    const KIND: EntityKind = EntityKind::Broker;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_draft(&self) -> BrokerDraft {
        BrokerDraft {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            license_number: self.license_number.clone(),
            region: self.region,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.full_name.as_str(), self.email.as_str()];
        fields.extend(self.license_number.as_deref());
        fields
    }

    fn validate(draft: &BrokerDraft) -> Result<(), String> {
        if draft.full_name.trim().is_empty() {
            return Err("Full name is required".to_string());
        }
        if !draft.email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        Ok(())
    }
}
