use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "READLOG_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db or similar, default is sqlite://[data-dir]/readlog.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "READLOG_DATA_DIR",
        help = "Data directory (database, token secret), default is system default like ~/.local/share/readlog",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("readlog"))
        .unwrap_or_else(|| PathBuf::from("readlog"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/readlog.db?mode=rwc", self.data_dir))
    }
}
