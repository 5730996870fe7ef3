use clap::Parser;
use garde::Validate as _;
use readlog_types::config::BackendConfig;

use crate::commands::{open_pool, Executor};

#[derive(Parser, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name")]
    name: String,
    #[arg(short, long, help = "User email, must be unique")]
    pub email: String,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let new_user = readlog_dal::user::CreateUser {
            name: self.name,
            email: self.email,
        };
        new_user.validate()?;
        let pool = open_pool(&self.backend).await?;
        let repository = readlog_dal::user::UserRepository::new(pool);
        let user = repository.create(new_user).await?;
        println!("{}", user.id);

        Ok(())
    }
}
