use clap::Parser;
use readlog_types::config::BackendConfig;

use crate::commands::{open_pool, Executor};

#[derive(Parser, Debug)]
pub struct ListRecordsCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Id of user whose records are listed")]
    pub user_id: i64,
}

impl Executor for ListRecordsCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let records = readlog_dal::reading_record::ReadingRecordRepository::new(pool)
            .list_by_user(self.user_id)
            .await?;
        println!("{}", serde_json::to_string_pretty(&records)?);

        Ok(())
    }
}
