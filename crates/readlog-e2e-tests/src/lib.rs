use std::{path::Path, time::Duration};

use anyhow::{Result, anyhow};
use rand::Rng as _;
use readlog_auth::token::TokenManager;
use readlog_dal::user::{CreateUser, UserRepository};
use readlog_server::config::{Parser, ServerConfig};
use readlog_types::claim::ApiClaim;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tempfile::TempDir;
use tracing::{debug, error};

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let args = &[
        "readlog-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--token-validity",
        "10m",
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    test_config(test_name, &base_dir)
}

/// Starts server in background and waits until health check answers
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let base_url = args.base_url();
    let state = readlog_server::run::build_state(&args).await?;
    tokio::spawn(async move {
        let never = std::future::pending::<()>();
        if let Err(e) = readlog_server::run::run_graceful_with_state(args, state, never).await {
            error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{base_url}/health")).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Err(anyhow!("Server did not start"))
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

/// Registers user directly in the database and issues a token, same as the CLI does
pub async fn create_user(args: &ServerConfig, email: &str) -> Result<TestUser> {
    let pool = readlog_dal::new_pool(&args.backend.database_url()).await?;
    let user = UserRepository::new(pool)
        .create(CreateUser {
            name: "Test Reader".to_string(),
            email: email.to_string(),
        })
        .await?;
    let secret = readlog_auth::secret::read_or_create_secret(&args.backend.data_dir()).await?;
    let token =
        TokenManager::new(&secret, args.token_validity).issue(ApiClaim::new_expired(user.id))?;
    debug!("Created test user {}", user.id);
    Ok(TestUser { id: user.id, token })
}

pub fn client_for(user: &TestUser) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", user.token))?,
    );
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Running server, one registered user and client authenticated as this user
pub async fn launch_env(args: ServerConfig, email: &str) -> Result<(reqwest::Client, TestUser)> {
    spawn_server(args.clone()).await?;
    let user = create_user(&args, email).await?;
    let client = client_for(&user)?;
    Ok((client, user))
}
