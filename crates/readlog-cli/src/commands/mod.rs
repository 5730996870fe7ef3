pub mod create_user;
pub mod issue_token;
pub mod list_records;

use readlog_dal::Pool;
use readlog_types::config::BackendConfig;
use tracing::info;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Pool with migrated schema, data directory is created if missing
pub(crate) async fn open_pool(backend: &BackendConfig) -> anyhow::Result<Pool> {
    let data_dir = backend.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {:?}", data_dir);
    }
    let pool = readlog_dal::new_pool(&backend.database_url()).await?;
    readlog_dal::migrate(&pool).await?;
    Ok(pool)
}
