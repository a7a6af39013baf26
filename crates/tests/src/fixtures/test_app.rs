use hireflow_api::{build_router, state::AppState};
use hireflow_config::Settings;
use hireflow_db::indexes::ensure_indexes;
use hireflow_services::AuthService;
use mongodb::{Client, Database, options::ClientOptions};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A running test application with its own MongoDB database and export dir.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub db: Database,
    pub settings: Settings,
    pub auth: AuthService,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test server connected to the test MongoDB.
    ///
    /// Requires a running MongoDB at localhost:27017.
    /// Set HIREFLOW__DATABASE__URL env var to override the connection string.
    /// Each test gets a unique database name and export dir for isolation.
    pub async fn spawn() -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let db_name = format!("hireflow_test_{}", suffix);

        let mut settings = Settings::load().expect("Failed to load settings");
        if let Ok(url) = std::env::var("HIREFLOW__DATABASE__URL") {
            settings.database.url = url;
        }
        settings.database.name = db_name.clone();
        settings.export.dir = std::env::temp_dir()
            .join(format!("hireflow-exports-test-{}", suffix))
            .to_string_lossy()
            .into_owned();

        let client_options = ClientOptions::parse(&settings.database.url)
            .await
            .expect("Failed to parse MongoDB URL");
        let mongo_client =
            Client::with_options(client_options).expect("Failed to create MongoDB client");
        let db = mongo_client.database(&db_name);

        ensure_indexes(&db).await.expect("Failed to create indexes");

        tokio::fs::create_dir_all(&settings.export.dir)
            .await
            .expect("Failed to create export dir");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);
        // Artifact links must point at this server, not the configured default.
        settings.app.base_url = base_url.clone();

        let app_state = AppState::new(db.clone(), settings.clone());
        let app = build_router(app_state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let auth = AuthService::new(settings.jwt.clone());
        let client = reqwest::Client::new();

        Self {
            addr,
            base_url,
            db,
            settings,
            auth,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let db = self.db.clone();
        let export_dir = self.settings.export.dir.clone();
        // Best effort cleanup: drop the test database and export artifacts
        tokio::spawn(async move {
            let _ = db.drop().await;
            let _ = tokio::fs::remove_dir_all(export_dir).await;
        });
    }
}
