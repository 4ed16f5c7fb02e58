//! onchat command-line client.
//!
//! - Loads `onchat.yaml` (or the path given as first argument)
//! - Logs in when an `account` section is present
//! - Logs every decoded chat push until Ctrl-C

use tracing_subscriber::{fmt, EnvFilter};

use onchat_client::{config, Session};
use onchat_core::error::Result;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.kind().as_str(), error = %e, "onchat exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "onchat.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    tracing::info!(url = %cfg.connection.url, config = %path, "onchat starting");

    let session = Session::start(cfg);

    if let Some(account) = session.config().account.clone() {
        let grant = session.login(&account.user, &account.pass).await?;
        tracing::info!(user = %account.user, has_relogin_code = grant.relogin_code.is_some(), "login ok");

        match session.api().user_list().await {
            Ok(dir) => {
                let rooms: Vec<&str> = dir.rooms.iter().map(|p| p.name.as_str()).collect();
                let users: Vec<&str> = dir
                    .users_except(&account.user)
                    .into_iter()
                    .map(|p| p.name.as_str())
                    .collect();
                tracing::info!(?rooms, ?users, "directory");
            }
            Err(e) => tracing::warn!(error = %e, "user list unavailable"),
        }
    }

    let mut feed = session.feed(None);
    loop {
        tokio::select! {
            msg = feed.recv() => {
                let Some(msg) = msg else { break };
                tracing::info!(
                    author = msg.author.as_deref().unwrap_or("Unknown"),
                    kind = msg.kind().as_str(),
                    side = msg.side.as_str(),
                    time = %msg.time,
                    content = ?msg.content,
                    "chat"
                );
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Err(e) = session.logout().await {
        tracing::warn!(error = %e, "logout failed");
    }
    session.shutdown();
    Ok(())
}
