use std::sync::Arc;

use crate::auth::{GoogleProvider, IdentityProvider};
use crate::config::AppConfig;
use crate::database::models::{ActiveToken, Project, ProjectFile, User};
use crate::database::{DatabaseManager, HealthCheck, Repository};

/// Everything a handler needs, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Repository<User>,
    pub tokens: Repository<ActiveToken>,
    pub projects: Repository<Project>,
    pub files: Repository<ProjectFile>,
    pub identity: Arc<dyn IdentityProvider>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Production wiring: every repository shares one pool.
    pub fn new(config: AppConfig, db: DatabaseManager) -> Self {
        let db = Arc::new(db);
        let identity = Arc::new(GoogleProvider::new(&config.oauth));
        Self {
            config: Arc::new(config),
            users: Repository::<User>::new(db.clone()),
            tokens: Repository::<ActiveToken>::new(db.clone()),
            projects: Repository::<Project>::new(db.clone()),
            files: Repository::<ProjectFile>::new(db.clone()),
            identity,
            health: db,
        }
    }
}
