use std::time::Duration;

use clap::Parser;
use readlog_auth::token::TokenManager;
use readlog_types::{claim::ApiClaim, config::BackendConfig};

use crate::commands::{open_pool, Executor};

/// Default validity of the server, when not given
const DEFAULT_VALIDITY: Duration = Duration::from_secs(24 * 3600);

#[derive(Parser, Debug)]
pub struct IssueTokenCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Id of existing user")]
    pub user_id: i64,
    #[arg(
        short,
        long,
        help = "Token validity in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined), default is 1 day",
        value_parser = humantime::parse_duration
    )]
    pub validity: Option<Duration>,
}

impl Executor for IssueTokenCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let user = readlog_dal::user::UserRepository::new(pool)
            .get(self.user_id)
            .await?;
        let secret = readlog_auth::secret::read_or_create_secret(&self.backend.data_dir()).await?;
        let tokens = TokenManager::new(&secret, self.validity.unwrap_or(DEFAULT_VALIDITY));
        let token = tokens.issue(ApiClaim::new_expired(user.id))?;
        println!("{token}");

        Ok(())
    }
}
