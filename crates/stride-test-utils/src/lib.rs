//! PostgreSQL fixtures for stride's integration tests.
//!
//! One PostgreSQL server is shared per test binary; each test gets its own
//! freshly migrated database inside it, so tests never see each other's
//! rows. Set `STRIDE_TEST_PG_URL` to point at an already-running server
//! (CI setup scripts do this); otherwise a container is started on first
//! use via testcontainers.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// The shared server: a base URL, plus the container handle when we started
/// one ourselves. Dropping the handle stops the container, so it lives for
/// the whole test binary.
struct PgServer {
    url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

static SERVER: OnceCell<PgServer> = OnceCell::const_new();

async fn server() -> &'static PgServer {
    SERVER
        .get_or_init(|| async {
            if let Ok(url) = std::env::var("STRIDE_TEST_PG_URL") {
                return PgServer {
                    url,
                    _container: None,
                };
            }

            let container = Postgres::default()
                .with_tag("18")
                .start()
                .await
                .expect("failed to start PostgreSQL container");
            let host = container
                .get_host()
                .await
                .expect("failed to get container host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("failed to get mapped port");

            PgServer {
                url: format!("postgresql://postgres:postgres@{host}:{port}"),
                _container: Some(container),
            }
        })
        .await
}

async fn maintenance_conn(server_url: &str) -> PgConnection {
    PgConnection::connect(&format!("{server_url}/postgres"))
        .await
        .expect("failed to connect to maintenance database")
}

/// An isolated, migrated database for a single test.
pub struct TestDb {
    pub pool: PgPool,
    name: String,
}

impl TestDb {
    /// Create a uniquely named database on the shared server and run the
    /// embedded migrations against it.
    pub async fn new() -> Self {
        let server = server().await;
        let name = format!("stride_test_{}", Uuid::new_v4().simple());

        let mut conn = maintenance_conn(&server.url).await;
        conn.execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create database {name}: {e}"));
        let _ = conn.close().await;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&format!("{}/{name}", server.url))
            .await
            .unwrap_or_else(|e| panic!("failed to connect to database {name}: {e}"));

        stride_db::pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name }
    }

    /// Drop the database. Call at the end of the test; terminates any
    /// straggling connections first, so it is safe after a partial failure.
    pub async fn cleanup(self) {
        self.pool.close().await;

        let server = server().await;
        let mut conn = maintenance_conn(&server.url).await;
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.name
        );
        let _ = conn.execute(terminate.as_str()).await;
        let _ = conn
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        let _ = conn.close().await;
    }
}
