//! Startup registry of business modules and the permission seeding run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use kosmos_auth::PermissionRepository;
use kosmos_core::{ModuleId, UserId};
use kosmos_module::SeedPermissions;

/// Outcome of seeding one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    Seeded {
        created_role: bool,
        created_permissions: usize,
        created_links: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub module_id: ModuleId,
    pub module_name: String,
    #[serde(flatten)]
    pub outcome: SeedOutcome,
}

impl SeedSummary {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SeedOutcome::Failed { .. })
    }
}

/// Every module the process hosts, in registration order.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn SeedPermissions>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Arc<dyn SeedPermissions>) -> &mut Self {
        self.modules.push(module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn SeedPermissions>> {
        self.modules.iter()
    }

    /// Seed every module in order. A module that fails is reported and
    /// logged; the remaining modules still run.
    pub fn seed_all(
        &self,
        repo: &dyn PermissionRepository,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Vec<SeedSummary> {
        let summaries: Vec<SeedSummary> = self
            .modules
            .iter()
            .map(|module| {
                let outcome = match module.seed_permissions(repo, actor, now) {
                    Ok(report) => SeedOutcome::Seeded {
                        created_role: report.created_role,
                        created_permissions: report.created_permissions,
                        created_links: report.created_links,
                    },
                    Err(error) => {
                        warn!(
                            module_id = %module.module_id(),
                            module = module.module_name(),
                            %error,
                            "permission seeding failed"
                        );
                        SeedOutcome::Failed {
                            error: error.to_string(),
                        }
                    }
                };
                SeedSummary {
                    module_id: module.module_id(),
                    module_name: module.module_name().to_string(),
                    outcome,
                }
            })
            .collect();

        let failed = summaries.iter().filter(|s| s.is_failure()).count();
        info!(modules = summaries.len(), failed, "permission seeding finished");
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kosmos_auth::{
        InMemoryPermissionRepository, ModulePermissionSet, RepositoryError, Role, RoleName,
        SeedError, SeedReport,
    };

    const LEADS: ModuleId = ModuleId::from_u128(0x9d624ee2_6433_49f0_bc6c_3e6978e2ac9c);
    const OPPORTUNITIES: ModuleId = ModuleId::from_u128(0x0c3959c3_15dc_44ab_8e2c_9b9e2773e65f);
    const BROKEN: ModuleId = ModuleId::from_u128(42);

    struct Fixed(ModulePermissionSet);

    impl SeedPermissions for Fixed {
        fn module_id(&self) -> ModuleId {
            self.0.module_id
        }

        fn module_name(&self) -> &str {
            &self.0.module_name
        }

        fn permission_set(&self) -> ModulePermissionSet {
            self.0.clone()
        }
    }

    /// Seeding always hits a storage outage.
    struct Offline;

    impl SeedPermissions for Offline {
        fn module_id(&self) -> ModuleId {
            BROKEN
        }

        fn module_name(&self) -> &str {
            "Offline"
        }

        fn permission_set(&self) -> ModulePermissionSet {
            ModulePermissionSet::new(BROKEN, "Offline", RoleName::from_static("Offline Users"))
        }

        fn seed_permissions(
            &self,
            _repo: &dyn PermissionRepository,
            _actor: UserId,
            _now: DateTime<Utc>,
        ) -> Result<SeedReport, SeedError> {
            Err(RepositoryError::Unavailable("connection refused".into()).into())
        }
    }

    fn crm(id: ModuleId, name: &'static str, prefix: &str) -> Arc<dyn SeedPermissions> {
        Arc::new(Fixed(ModulePermissionSet::crud(
            id,
            name,
            RoleName::from_static("CRM Users"),
            prefix,
            name,
        )))
    }

    fn registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry
            .register(crm(LEADS, "Leads", "lead"))
            .register(Arc::new(Offline))
            .register(crm(OPPORTUNITIES, "Opportunities", "opportunity"));
        registry
    }

    fn roles(repo: &InMemoryPermissionRepository) -> Vec<Role> {
        repo.list_roles().unwrap()
    }

    #[test]
    fn a_failing_module_does_not_stop_the_others() {
        let repo = InMemoryPermissionRepository::new();
        let summaries = registry().seed_all(&repo, UserId::new(1), Utc::now());

        assert_eq!(summaries.len(), 3);
        assert_eq!(
            summaries[0].outcome,
            SeedOutcome::Seeded {
                created_role: true,
                created_permissions: 4,
                created_links: 4
            }
        );
        assert!(summaries[1].is_failure());
        assert_eq!(
            summaries[2].outcome,
            SeedOutcome::Seeded {
                created_role: false,
                created_permissions: 4,
                created_links: 4
            }
        );
        assert_eq!(roles(&repo).len(), 1);
        assert_eq!(repo.list_module_permissions().unwrap().len(), 8);
    }

    #[test]
    fn second_run_creates_nothing() {
        let repo = InMemoryPermissionRepository::new();
        let registry = registry();
        registry.seed_all(&repo, UserId::new(1), Utc::now());
        let again = registry.seed_all(&repo, UserId::new(1), Utc::now());

        for summary in again.iter().filter(|s| !s.is_failure()) {
            assert_eq!(
                summary.outcome,
                SeedOutcome::Seeded {
                    created_role: false,
                    created_permissions: 0,
                    created_links: 0
                }
            );
        }
        assert_eq!(repo.list_module_permissions().unwrap().len(), 8);
    }

    #[test]
    fn summaries_serialize_flat() {
        let repo = InMemoryPermissionRepository::new();
        let summaries = registry().seed_all(&repo, UserId::new(1), Utc::now());
        let json = serde_json::to_value(&summaries[1]).unwrap();
        assert_eq!(json["module_name"], "Offline");
        assert_eq!(json["outcome"], "failed");
        assert!(json["error"].as_str().unwrap().contains("connection refused"));
    }
}
