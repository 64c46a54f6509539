use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::locale::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Lead,
    Active,
    Inactive,
}

impl ClientStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Lead => "lead",
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }
}

/// Application lifecycle: new → in_progress → submitted → approved | rejected → funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    New,
    InProgress,
    Submitted,
    Approved,
    Rejected,
    Funded,
}

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Funded => "funded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Purchase,
    Refinance,
    Renewal,
    EquityTakeout,
    Construction,
}

impl LoanType {
    pub const fn as_str(self) -> &'static str {
        match self {
            LoanType::Purchase => "purchase",
            LoanType::Refinance => "refinance",
            LoanType::Renewal => "renewal",
            LoanType::EquityTakeout => "equity_takeout",
            LoanType::Construction => "construction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerRole {
    Admin,
    #[default]
    Broker,
}

impl BrokerRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            BrokerRole::Admin => "admin",
            BrokerRole::Broker => "broker",
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub annual_income: Option<Decimal>,
    pub credit_score: Option<i32>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub client_id: Uuid,
    pub lender_id: Option<Uuid>,
    pub broker_id: Uuid,
    pub loan_amount: Decimal,
    pub property_value: Option<Decimal>,
    pub loan_type: LoanType,
    pub term_months: Option<i32>,
    pub interest_rate: Option<Decimal>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lender {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub region: Region,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Broker profile. `id` is the identity provider's user id, which is also the
/// JWT subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: BrokerRole,
    pub license_number: Option<String>,
    pub region: Region,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDocument {
    pub id: Uuid,
    pub application_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub checksum: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Editable drafts: the fields a form may change. Identity, ownership and
// timestamps are never part of a draft.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub annual_income: Option<Decimal>,
    pub credit_score: Option<i32>,
    pub status: ClientStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDraft {
    pub client_id: Option<Uuid>,
    pub lender_id: Option<Uuid>,
    pub loan_amount: Decimal,
    pub property_value: Option<Decimal>,
    pub loan_type: LoanType,
    pub term_months: Option<i32>,
    pub interest_rate: Option<Decimal>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LenderDraft {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub region: Region,
    pub is_active: bool,
    pub notes: Option<String>,
}

impl Default for LenderDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            contact_name: None,
            email: None,
            phone: None,
            website: None,
            region: Region::Global,
            is_active: true,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerDraft {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: BrokerRole,
    pub license_number: Option<String>,
    pub region: Region,
}

/// Application with the parties it references, for the detail panel.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: Application,
    pub client: Option<Client>,
    pub lender: Option<Lender>,
}
