use hireflow_config::Settings;
use hireflow_db::models::{Candidate, Deal, Job, Ticket};
use hireflow_services::{AuthService, Repository};
use mongodb::Database;
use std::sync::Arc;

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub jobs: Arc<Repository<Job>>,
    pub candidates: Arc<Repository<Candidate>>,
    pub deals: Arc<Repository<Deal>>,
    pub tickets: Arc<Repository<Ticket>>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let jobs = Arc::new(Repository::new(&db));
        let candidates = Arc::new(Repository::new(&db));
        let deals = Arc::new(Repository::new(&db));
        let tickets = Arc::new(Repository::new(&db));
        let ws_storage = Arc::new(WsStorage::new());

        Self {
            db,
            settings,
            auth,
            jobs,
            candidates,
            deals,
            tickets,
            ws_storage,
        }
    }
}
