use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;

use jobly_api_rust::auth::{generate_jwt, Claims};

static SERVER: OnceCell<TestServer> = OnceCell::const_new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobly-api-rust"));
        cmd.env("JOBLY_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and SECRET_KEY
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Spawn (once per test binary) a server against a freshly seeded database.
/// Returns None when DATABASE_URL is not set, so suites skip cleanly on
/// machines without Postgres.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }

    let server = SERVER
        .get_or_try_init(|| async {
            reset_db().await?;
            let server = TestServer::spawn()?;
            server.wait_ready(Duration::from_secs(10)).await?;
            Ok::<_, anyhow::Error>(server)
        })
        .await?;

    Ok(Some(server))
}

/// Drop and recreate the schema, then load the standard fixture:
/// companies c1..c3 and one job per company with known salary/equity spread.
async fn reset_db() -> Result<()> {
    let url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("failed to connect for schema reset")?;

    sqlx::raw_sql("DROP TABLE IF EXISTS jobs; DROP TABLE IF EXISTS companies;")
        .execute(&pool)
        .await?;
    sqlx::raw_sql(include_str!("../../schema.sql"))
        .execute(&pool)
        .await?;
    sqlx::raw_sql(
        r#"
        INSERT INTO companies (handle, name, description, num_employees, logo_url)
        VALUES ('c1', 'C1', 'Desc1', 1, 'http://c1.img'),
               ('c2', 'C2', 'Desc2', 2, 'http://c2.img'),
               ('c3', 'C3', 'Desc3', 3, NULL);
        INSERT INTO jobs (title, salary, equity, company_handle)
        VALUES ('Job A', 100000, '0.0', 'c1'),
               ('Job B', 200000, '0.2', 'c2'),
               ('Job C', 300000, NULL, 'c3');
        "#,
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}

pub fn admin_token() -> String {
    generate_jwt(&Claims::new("admin", true)).expect("dev secret should sign")
}

pub fn user_token() -> String {
    generate_jwt(&Claims::new("u1", false)).expect("dev secret should sign")
}
