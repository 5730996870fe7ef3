use clap::{Parser, Subcommand};

use crate::commands::{
    create_user::CreateUserCmd, issue_token::IssueTokenCmd, list_records::ListRecordsCmd,
};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for readlog - administration of users and their reading records, works directly with server data directory."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    CreateUser(CreateUserCmd),
    IssueToken(IssueTokenCmd),
    ListRecords(ListRecordsCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::IssueToken(cmd) => cmd.run().await,
            Command::ListRecords(cmd) => cmd.run().await,
        }
    }
}
