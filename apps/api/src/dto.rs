//! Wire types for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vantage_application::{
    ActivityRecord, AssignmentRecord, ClientRecord, CompanyRecord, DashboardStats, ProposalRecord,
    SaleRecord, SiteRecord,
};
use vantage_core::UserIdentity;
use vantage_domain::{ScopeResolution, VisibilityBoundary};

// ---- Requests ----

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub company_id: Uuid,
    pub site_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub name: String,
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub client_id: Uuid,
    pub title: String,
    pub amount_cents: i64,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeProposalStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CloseSaleRequest {
    pub proposal_id: Uuid,
    pub amount_cents: i64,
    pub commission_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: Uuid,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_activity_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_activity_limit() -> u32 {
    50
}

// ---- Responses ----

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GenericMessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Dashboard aggregates, or a restricted marker for callers without an
/// active role.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub restricted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DashboardStats>,
}

/// The session user with their resolved role and boundary. A user without
/// an active assignment gets `role: null` and a restricted view, not an
/// error.
#[derive(Debug, Serialize)]
pub struct SessionUserResponse {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: Option<String>,
    pub boundary: Option<VisibilityBoundary>,
}

impl SessionUserResponse {
    pub fn from_parts(identity: &UserIdentity, resolution: &ScopeResolution) -> Self {
        Self {
            user_id: identity.user_id(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().to_owned(),
            role: resolution
                .primary()
                .map(|assignment| assignment.role.as_str().to_owned()),
            boundary: resolution.boundary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CompanyRecord> for CompanyResponse {
    fn from(record: CompanyRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            name: record.name,
            is_active: record.is_active,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SiteResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SiteRecord> for SiteResponse {
    fn from(record: SiteRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            company_id: record.company_id.as_uuid(),
            name: record.name,
            is_active: record.is_active,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub site_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ClientRecord> for ClientResponse {
    fn from(record: ClientRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            company_id: record.company_id.as_uuid(),
            site_id: record.site_id.map(|id| id.as_uuid()),
            assigned_to: record.assigned_to.map(|id| id.as_uuid()),
            name: record.name,
            contact_email: record.contact_email,
            created_by: record.created_by.as_uuid(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub company_id: Uuid,
    pub site_id: Option<Uuid>,
    pub created_by: Uuid,
    pub title: String,
    pub amount_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ProposalRecord> for ProposalResponse {
    fn from(record: ProposalRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            client_id: record.client_id.as_uuid(),
            company_id: record.company_id.as_uuid(),
            site_id: record.site_id.map(|id| id.as_uuid()),
            created_by: record.created_by.as_uuid(),
            title: record.title,
            amount_cents: record.amount_cents,
            status: record.status.into(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub company_id: Uuid,
    pub site_id: Option<Uuid>,
    pub closed_by: Uuid,
    pub amount_cents: i64,
    pub commission_cents: Option<i64>,
    pub closed_at: DateTime<Utc>,
}

impl From<SaleRecord> for SaleResponse {
    fn from(record: SaleRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            proposal_id: record.proposal_id.as_uuid(),
            company_id: record.company_id.as_uuid(),
            site_id: record.site_id.map(|id| id.as_uuid()),
            closed_by: record.closed_by.as_uuid(),
            amount_cents: record.amount_cents,
            commission_cents: record.commission_cents,
            closed_at: record.closed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub site_id: Option<Uuid>,
    pub site_name: Option<String>,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<AssignmentRecord> for AssignmentResponse {
    fn from(record: AssignmentRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            user_id: record.user_id.as_uuid(),
            user_email: record.user_email,
            role: record.role.as_str().to_owned(),
            company_id: record.company_id.map(|id| id.as_uuid()),
            company_name: record.company_name,
            site_id: record.site_id.map(|id| id.as_uuid()),
            site_name: record.site_name,
            assigned_by: record.assigned_by.as_uuid(),
            assigned_at: record.assigned_at,
            is_active: record.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityRecord> for ActivityResponse {
    fn from(record: ActivityRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.as_uuid(),
            action: record.action,
            resource_type: record.resource_type,
            resource_id: record.resource_id,
            details: record.details,
            created_at: record.created_at,
        }
    }
}
