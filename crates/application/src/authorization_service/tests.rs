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
use crate::directory_service::{CompanyRecord, DirectoryRepository, SiteRecord};

use super::{AssignRoleInput, AssignmentRecord, AssignmentRepository, AuthorizationService};

#[derive(Default)]
struct FakeAssignmentRepository {
    assignments: Mutex<Vec<RoleAssignment>>,
}

#[async_trait]
impl AssignmentRepository for FakeAssignmentRepository {
    async fn list_active_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| assignment.user_id == user_id && assignment.is_active)
            .cloned()
            .collect())
    }

    async fn list_visible(
        &self,
        _boundary: VisibilityBoundary,
    ) -> AppResult<Vec<AssignmentRecord>> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, assignment_id: AssignmentId) -> AppResult<Option<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .find(|assignment| assignment.id == assignment_id)
            .cloned())
    }

    async fn insert(&self, assignment: &RoleAssignment) -> AppResult<()> {
        self.assignments.lock().await.push(assignment.clone());
        Ok(())
    }

    async fn revoke(&self, assignment_id: AssignmentId) -> AppResult<()> {
        let mut assignments = self.assignments.lock().await;
        let assignment = assignments
            .iter_mut()
            .find(|assignment| assignment.id == assignment_id)
            .ok_or_else(|| AppError::NotFound("assignment not found".to_owned()))?;
        assignment.is_active = false;
        Ok(())
    }
}

/// Directory fake with one company owning one site.
struct FakeDirectoryRepository {
    company_id: CompanyId,
    site_id: SiteId,
}

#[async_trait]
impl DirectoryRepository for FakeDirectoryRepository {
    async fn list_companies(&self, _boundary: VisibilityBoundary) -> AppResult<Vec<CompanyRecord>> {
        Ok(Vec::new())
    }

    async fn create_company(&self, _name: &str) -> AppResult<CompanyId> {
        Ok(self.company_id)
    }

    async fn company_exists(&self, company_id: CompanyId) -> AppResult<bool> {
        Ok(company_id == self.company_id)
    }

    async fn deactivate_company(&self, _company_id: CompanyId) -> AppResult<()> {
        Ok(())
    }

    async fn list_sites(
        &self,
        _boundary: VisibilityBoundary,
        _company_id: CompanyId,
    ) -> AppResult<Vec<SiteRecord>> {
        Ok(Vec::new())
    }

    async fn create_site(&self, _company_id: CompanyId, _name: &str) -> AppResult<SiteId> {
        Ok(self.site_id)
    }

    async fn deactivate_site(&self, _site_id: SiteId) -> AppResult<()> {
        Ok(())
    }

    async fn site_belongs_to_company(
        &self,
        site_id: SiteId,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        Ok(site_id == self.site_id && company_id == self.company_id)
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
    service: AuthorizationService,
    assignment_repository: Arc<FakeAssignmentRepository>,
    activity_repository: Arc<FakeActivityRepository>,
    company_id: CompanyId,
    site_id: SiteId,
}

fn fixture() -> Fixture {
    let company_id = CompanyId::new();
    let site_id = SiteId::new();
    let assignment_repository = Arc::new(FakeAssignmentRepository::default());
    let activity_repository = Arc::new(FakeActivityRepository::default());
    let service = AuthorizationService::new(
        assignment_repository.clone(),
        Arc::new(FakeDirectoryRepository {
            company_id,
            site_id,
        }),
        ActivityService::new(activity_repository.clone()),
    );

    Fixture {
        service,
        assignment_repository,
        activity_repository,
        company_id,
        site_id,
    }
}

fn actor() -> UserIdentity {
    UserIdentity::new(Uuid::new_v4(), "Admin", "admin@example.com")
}

fn global_resolution(user_id: UserId) -> ScopeResolution {
    ScopeResolution::Resolved {
        primary: RoleAssignment {
            id: AssignmentId::new(),
            user_id,
            role: RoleKind::GlobalAdmin,
            company_id: None,
            site_id: None,
            assigned_by: UserId::new(),
            assigned_at: Utc::now(),
            is_active: true,
        },
        boundary: VisibilityBoundary::Global,
    }
}

fn company_resolution(user_id: UserId, company_id: CompanyId) -> ScopeResolution {
    ScopeResolution::Resolved {
        primary: RoleAssignment {
            id: AssignmentId::new(),
            user_id,
            role: RoleKind::CompanyAdmin,
            company_id: Some(company_id),
            site_id: None,
            assigned_by: UserId::new(),
            assigned_at: Utc::now(),
            is_active: true,
        },
        boundary: VisibilityBoundary::Company(company_id),
    }
}

#[tokio::test]
async fn resolve_for_user_picks_minimum_level() {
    let fixture = fixture();
    let user_id = UserId::new();

    for role in [RoleKind::Contributor, RoleKind::SiteManager] {
        fixture
            .assignment_repository
            .insert(&RoleAssignment {
                id: AssignmentId::new(),
                user_id,
                role,
                company_id: Some(fixture.company_id),
                site_id: Some(fixture.site_id),
                assigned_by: UserId::new(),
                assigned_at: Utc::now(),
                is_active: true,
            })
            .await
            .unwrap_or_else(|_| panic!("insert failed"));
    }

    let resolution = fixture.service.resolve_for_user(user_id).await;

    assert!(resolution.is_ok_and(|resolution| {
        resolution.boundary() == Some(VisibilityBoundary::Site(fixture.site_id))
    }));
}

#[tokio::test]
async fn resolve_for_user_without_assignments_is_unassigned() {
    let fixture = fixture();

    let resolution = fixture.service.resolve_for_user(UserId::new()).await;

    assert!(resolution.is_ok_and(|resolution| resolution.is_unassigned()));
}

#[tokio::test]
async fn global_admin_can_assign_any_role() {
    let fixture = fixture();
    let actor = actor();

    let result = fixture
        .service
        .assign_role(
            &actor,
            &global_resolution(UserId::from_uuid(actor.user_id())),
            AssignRoleInput {
                user_id: UserId::new(),
                role: RoleKind::CompanyAdmin,
                company_id: Some(fixture.company_id),
                site_id: None,
            },
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(fixture.activity_repository.entries.lock().await.len(), 1);
}

#[tokio::test]
async fn company_admin_cannot_mint_global_admins() {
    let fixture = fixture();
    let actor = actor();
    let resolution = company_resolution(UserId::from_uuid(actor.user_id()), fixture.company_id);

    let result = fixture
        .service
        .assign_role(
            &actor,
            &resolution,
            AssignRoleInput {
                user_id: UserId::new(),
                role: RoleKind::GlobalAdmin,
                company_id: None,
                site_id: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn company_admin_cannot_assign_outside_own_company() {
    let fixture = fixture();
    let actor = actor();
    let resolution = company_resolution(UserId::from_uuid(actor.user_id()), CompanyId::new());

    let result = fixture
        .service
        .assign_role(
            &actor,
            &resolution,
            AssignRoleInput {
                user_id: UserId::new(),
                role: RoleKind::Contributor,
                company_id: Some(fixture.company_id),
                site_id: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn site_must_belong_to_referenced_company() {
    let fixture = fixture();
    let actor = actor();

    let result = fixture
        .service
        .assign_role(
            &actor,
            &global_resolution(UserId::from_uuid(actor.user_id())),
            AssignRoleInput {
                user_id: UserId::new(),
                role: RoleKind::SiteManager,
                company_id: Some(fixture.company_id),
                site_id: Some(SiteId::new()),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn contributor_cannot_manage_assignments() {
    let fixture = fixture();
    let actor = actor();
    let user_id = UserId::from_uuid(actor.user_id());
    let resolution = ScopeResolution::Resolved {
        primary: RoleAssignment {
            id: AssignmentId::new(),
            user_id,
            role: RoleKind::Contributor,
            company_id: None,
            site_id: None,
            assigned_by: UserId::new(),
            assigned_at: Utc::now(),
            is_active: true,
        },
        boundary: VisibilityBoundary::SelfOnly(user_id),
    };

    let result = fixture
        .service
        .assign_role(
            &actor,
            &resolution,
            AssignRoleInput {
                user_id: UserId::new(),
                role: RoleKind::Contributor,
                company_id: None,
                site_id: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn revoked_assignment_no_longer_resolves() {
    let fixture = fixture();
    let actor = actor();
    let resolution = global_resolution(UserId::from_uuid(actor.user_id()));
    let target = UserId::new();

    let assignment_id = fixture
        .service
        .assign_role(
            &actor,
            &resolution,
            AssignRoleInput {
                user_id: target,
                role: RoleKind::CompanyAdmin,
                company_id: Some(fixture.company_id),
                site_id: None,
            },
        )
        .await
        .unwrap_or_else(|_| panic!("assign failed"));

    let revoked = fixture
        .service
        .revoke_assignment(&actor, &resolution, assignment_id)
        .await;
    assert!(revoked.is_ok());

    let resolved = fixture.service.resolve_for_user(target).await;
    assert!(resolved.is_ok_and(|resolution| resolution.is_unassigned()));
}

#[tokio::test]
async fn ensure_can_write_denies_unassigned_callers() {
    let fixture = fixture();

    let result = fixture.service.ensure_can_write(
        &ScopeResolution::Unassigned,
        Some(fixture.company_id),
        None,
    );

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
