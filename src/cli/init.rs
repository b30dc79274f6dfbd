use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> Result<()> {
    let config_path = path.join("snip.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path.join("data"))?;

    let config = r#"[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/snip.db"
pool_size = 10

[auth]
session_days = 7

[links]
title_lookup = true
title_timeout_ms = 2000
# Optional prefix the encoded target URL is appended to when looking up titles,
# e.g. "https://api.allorigins.win/raw?url="
title_proxy = ""
"#;

    std::fs::write(&config_path, config)?;

    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'snip migrate' to set up the database");
    tracing::info!("Run 'snip user add' to create your first user");
    tracing::info!("Run 'snip serve' to start the server");

    Ok(())
}
