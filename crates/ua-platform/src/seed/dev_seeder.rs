//! Development Data Seeder
//!
//! Seeds a small role hierarchy and one user when the service starts in
//! development mode. Records that already exist are left alone, so the
//! seeder can run on every start.
//!
//! Default login:
//!   dev-admin / DevPassword123!

use std::sync::Arc;
use tracing::info;

use crate::idp::IdentityProvider;
use crate::role::entity::{Module, Role};
use crate::role::repository::RoleRepository;
use crate::shared::error::Result;
use crate::store::{DocumentStore, Tables};
use crate::usecase::ExecutionContext;
use crate::user::operations::{CreateUserCommand, CreateUserUseCase};
use crate::user::repository::UserRepository;

const DEV_USERNAME: &str = "dev-admin";
const DEV_PASSWORD: &str = "DevPassword123!";

pub struct DevDataSeeder {
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl DevDataSeeder {
    pub fn new(store: Arc<dyn DocumentStore>, tables: &Tables, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            role_repo: Arc::new(RoleRepository::new(store.clone(), tables.roles.clone())),
            user_repo: Arc::new(UserRepository::new(store, tables.users.clone())),
            identity_provider,
        }
    }

    pub async fn seed(&self) -> Result<()> {
        info!("Seeding development data...");

        self.seed_roles().await?;
        self.seed_user().await?;

        info!("Development data seeded; login {} / {}", DEV_USERNAME, DEV_PASSWORD);
        Ok(())
    }

    async fn seed_roles(&self) -> Result<()> {
        let mut viewer = Role::new("Viewer");
        viewer.add_module(Module::new("Users").with_permissions(["view"]));
        viewer.add_module(Module::new("Roles").with_permissions(["view"]));

        let mut admin = Role::new("Admin");
        admin.add_module(Module::new("Users").with_permissions(["view", "create", "suspend"]));
        admin.add_module(Module::new("Roles").with_permissions(["view", "create", "update", "delete"]));
        admin.add_child_roles(["Viewer"]);

        for role in [viewer, admin] {
            if self.role_repo.insert(&role).await? {
                info!("Created role: {}", role.name);
            }
        }
        Ok(())
    }

    async fn seed_user(&self) -> Result<()> {
        if self.user_repo.find_by_username(DEV_USERNAME).await?.is_some() {
            return Ok(());
        }

        let create = CreateUserUseCase::new(
            self.role_repo.clone(),
            self.user_repo.clone(),
            self.identity_provider.clone(),
        );
        create
            .execute(
                CreateUserCommand {
                    username: DEV_USERNAME.to_string(),
                    password: DEV_PASSWORD.to_string(),
                    email: "dev-admin@users-api.local".to_string(),
                    roles: vec!["Admin".to_string()],
                },
                ExecutionContext::create(),
            )
            .await?;

        info!("Created user: {}", DEV_USERNAME);
        Ok(())
    }
}
