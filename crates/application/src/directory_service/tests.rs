use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use vantage_core::{AppError, AppResult, UserIdentity};
use vantage_domain::{
    AssignmentId, CompanyId, RoleAssignment, RoleKind, ScopeResolution, SiteId, UserId,
    VisibilityBoundary,
};

use crate::activity_service::{ActivityEntry, ActivityRecord, ActivityRepository, ActivityService};

use super::{CompanyRecord, DirectoryRepository, DirectoryService, SiteRecord};

#[derive(Default)]
struct FakeDirectoryRepository {
    companies: Mutex<Vec<CompanyRecord>>,
    sites: Mutex<Vec<SiteRecord>>,
}

#[async_trait]
impl DirectoryRepository for FakeDirectoryRepository {
    async fn list_companies(&self, boundary: VisibilityBoundary) -> AppResult<Vec<CompanyRecord>> {
        let companies = self.companies.lock().await;
        Ok(companies
            .iter()
            .filter(|record| match boundary {
                VisibilityBoundary::Global => true,
                VisibilityBoundary::Company(company_id) => record.id == company_id,
                VisibilityBoundary::Site(_) | VisibilityBoundary::SelfOnly(_) => false,
            })
            .cloned()
            .collect())
    }

    async fn create_company(&self, name: &str) -> AppResult<CompanyId> {
        let record = CompanyRecord {
            id: CompanyId::new(),
            name: name.to_owned(),
            is_active: true,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.companies.lock().await.push(record);
        Ok(id)
    }

    async fn company_exists(&self, company_id: CompanyId) -> AppResult<bool> {
        Ok(self
            .companies
            .lock()
            .await
            .iter()
            .any(|record| record.id == company_id && record.is_active))
    }

    async fn deactivate_company(&self, company_id: CompanyId) -> AppResult<()> {
        let mut companies = self.companies.lock().await;
        let record = companies
            .iter_mut()
            .find(|record| record.id == company_id)
            .ok_or_else(|| AppError::NotFound("company not found".to_owned()))?;
        record.is_active = false;
        Ok(())
    }

    async fn list_sites(
        &self,
        boundary: VisibilityBoundary,
        company_id: CompanyId,
    ) -> AppResult<Vec<SiteRecord>> {
        let sites = self.sites.lock().await;
        Ok(sites
            .iter()
            .filter(|record| record.company_id == company_id)
            .filter(|record| match boundary {
                VisibilityBoundary::Global => true,
                VisibilityBoundary::Company(id) => record.company_id == id,
                VisibilityBoundary::Site(site_id) => record.id == site_id,
                VisibilityBoundary::SelfOnly(_) => false,
            })
            .cloned()
            .collect())
    }

    async fn create_site(&self, company_id: CompanyId, name: &str) -> AppResult<SiteId> {
        let record = SiteRecord {
            id: SiteId::new(),
            company_id,
            name: name.to_owned(),
            is_active: true,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.sites.lock().await.push(record);
        Ok(id)
    }

    async fn deactivate_site(&self, site_id: SiteId) -> AppResult<()> {
        let mut sites = self.sites.lock().await;
        let record = sites
            .iter_mut()
            .find(|record| record.id == site_id)
            .ok_or_else(|| AppError::NotFound("site not found".to_owned()))?;
        record.is_active = false;
        Ok(())
    }

    async fn site_belongs_to_company(
        &self,
        site_id: SiteId,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        Ok(self
            .sites
            .lock()
            .await
            .iter()
            .any(|record| record.id == site_id && record.company_id == company_id && record.is_active))
    }
}

#[derive(Default)]
struct FakeActivityRepository {
    entries: Mutex<Vec<ActivityEntry>>,
}

#[async_trait]
impl ActivityRepository for FakeActivityRepository {
    async fn append(&self, entry: ActivityEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn list_visible(
        &self,
        _boundary: VisibilityBoundary,
        _limit: u32,
        _offset: u32,
    ) -> AppResult<Vec<ActivityRecord>> {
        Ok(Vec::new())
    }
}

struct Fixture {
    service: DirectoryService,
    activity_repository: Arc<FakeActivityRepository>,
}

fn fixture() -> Fixture {
    let activity_repository = Arc::new(FakeActivityRepository::default());
    let activity_service = ActivityService::new(activity_repository.clone());

    Fixture {
        service: DirectoryService::new(
            Arc::new(FakeDirectoryRepository::default()),
            activity_service,
        ),
        activity_repository,
    }
}

fn actor() -> UserIdentity {
    UserIdentity::new(Uuid::new_v4(), "Admin", "admin@example.com")
}

fn resolution_for(
    user_id: UserId,
    role: RoleKind,
    company_id: Option<CompanyId>,
    site_id: Option<SiteId>,
    boundary: VisibilityBoundary,
) -> ScopeResolution {
    ScopeResolution::Resolved {
        primary: RoleAssignment {
            id: AssignmentId::new(),
            user_id,
            role,
            company_id,
            site_id,
            assigned_by: UserId::new(),
            assigned_at: Utc::now(),
            is_active: true,
        },
        boundary,
    }
}

fn global_resolution(actor: &UserIdentity) -> ScopeResolution {
    resolution_for(
        UserId::from_uuid(actor.user_id()),
        RoleKind::GlobalAdmin,
        None,
        None,
        VisibilityBoundary::Global,
    )
}

#[tokio::test]
async fn only_a_global_admin_creates_companies() {
    let fixture = fixture();
    let actor = actor();
    let company_id = CompanyId::new();
    let company_admin = resolution_for(
        UserId::from_uuid(actor.user_id()),
        RoleKind::CompanyAdmin,
        Some(company_id),
        None,
        VisibilityBoundary::Company(company_id),
    );

    let denied = fixture
        .service
        .create_company(&actor, &company_admin, "Northwind")
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let created = fixture
        .service
        .create_company(&actor, &global_resolution(&actor), "Northwind")
        .await;
    assert!(created.is_ok());
    assert_eq!(fixture.activity_repository.entries.lock().await.len(), 1);
}

#[tokio::test]
async fn company_admin_creates_sites_only_in_own_company() {
    let fixture = fixture();
    let actor = actor();
    let company_id = fixture
        .service
        .create_company(&actor, &global_resolution(&actor), "Northwind")
        .await
        .unwrap_or_else(|_| panic!("create company failed"));

    let admin = resolution_for(
        UserId::from_uuid(actor.user_id()),
        RoleKind::CompanyAdmin,
        Some(company_id),
        None,
        VisibilityBoundary::Company(company_id),
    );

    let created = fixture
        .service
        .create_site(&actor, &admin, company_id, "Harbor Branch")
        .await;
    assert!(created.is_ok());

    let denied = fixture
        .service
        .create_site(&actor, &admin, CompanyId::new(), "Elsewhere")
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn deactivated_company_no_longer_accepts_sites() {
    let fixture = fixture();
    let actor = actor();
    let global = global_resolution(&actor);
    let company_id = fixture
        .service
        .create_company(&actor, &global, "Northwind")
        .await
        .unwrap_or_else(|_| panic!("create company failed"));

    fixture
        .service
        .deactivate_company(&actor, &global, company_id)
        .await
        .unwrap_or_else(|_| panic!("deactivate failed"));

    let result = fixture
        .service
        .create_site(&actor, &global, company_id, "Branch")
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn site_deactivation_requires_the_owning_company() {
    let fixture = fixture();
    let actor = actor();
    let global = global_resolution(&actor);
    let company_id = fixture
        .service
        .create_company(&actor, &global, "Northwind")
        .await
        .unwrap_or_else(|_| panic!("create company failed"));
    let site_id = fixture
        .service
        .create_site(&actor, &global, company_id, "Harbor Branch")
        .await
        .unwrap_or_else(|_| panic!("create site failed"));

    let wrong_company = fixture
        .service
        .create_company(&actor, &global, "Contoso")
        .await
        .unwrap_or_else(|_| panic!("create company failed"));

    let mismatched = fixture
        .service
        .deactivate_site(&actor, &global, wrong_company, site_id)
        .await;
    assert!(matches!(mismatched, Err(AppError::NotFound(_))));

    let removed = fixture
        .service
        .deactivate_site(&actor, &global, company_id, site_id)
        .await;
    assert!(removed.is_ok());
}

#[tokio::test]
async fn site_under_a_missing_company_is_rejected() {
    let fixture = fixture();
    let actor = actor();

    let result = fixture
        .service
        .create_site(&actor, &global_resolution(&actor), CompanyId::new(), "Branch")
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn unassigned_callers_see_an_empty_directory() {
    let fixture = fixture();
    let actor = actor();
    fixture
        .service
        .create_company(&actor, &global_resolution(&actor), "Northwind")
        .await
        .unwrap_or_else(|_| panic!("create company failed"));

    let companies = fixture
        .service
        .list_companies(&ScopeResolution::Unassigned)
        .await;
    assert!(companies.is_ok_and(|list| list.is_empty()));
}

#[tokio::test]
async fn blank_directory_names_are_rejected() {
    let fixture = fixture();
    let actor = actor();

    let result = fixture
        .service
        .create_company(&actor, &global_resolution(&actor), "  ")
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}
