//! CLI command implementations.

use anyhow::{Context, Result};
use lazuli::services::firehose::CommitEvent;
use lazuli::{ClientConfig, CreateRecordParams, Error, PdsClient, RepoCommitEvent};

/// Reasons a firehose run stops early.
#[derive(Debug, thiserror::Error)]
pub enum FirehoseStop {
    #[error("event limit of {0} reached")]
    Limit(u64),

    #[error(transparent)]
    Client(#[from] Error),
}

/// Build the client configuration, letting flags override the defaults.
pub fn config(xrpc_url: Option<String>, ws_url: Option<String>) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(xrpc_url) = xrpc_url {
        config.xrpc_url = xrpc_url;
    }
    if let Some(ws_url) = ws_url {
        config.firehose_url = ws_url;
    }
    config
}

async fn authenticated(
    config: ClientConfig,
    identifier: &str,
    password: &str,
) -> Result<PdsClient> {
    let mut client = PdsClient::new(config)?;
    client
        .create_session(identifier, password)
        .await
        .context("login failed")?;
    Ok(client)
}

/// Consume the firehose until the peer closes it or `limit` events were seen.
pub async fn firehose(config: ClientConfig, limit: Option<u64>) -> Result<()> {
    let client = PdsClient::new(config)?;
    let mut seen = 0u64;

    let outcome = client
        .consume_firehose(|event: RepoCommitEvent| {
            seen += 1;
            let count = seen;
            async move {
                tracing::info!(
                    event_type = %event.event_type(),
                    repo = %event.repo,
                    seq = event.seq,
                    ops = event.ops.len(),
                    "reading firehose event"
                );
                for op in event.ops() {
                    println!("{} {} {} {}", event.seq, event.repo, op.action, op.path);
                }
                match limit {
                    Some(limit) if count >= limit => Err(FirehoseStop::Limit(limit)),
                    _ => Ok(()),
                }
            }
        })
        .await;

    match outcome {
        Ok(()) => {
            tracing::info!(events = seen, "firehose closed by peer");
            Ok(())
        }
        Err(FirehoseStop::Limit(limit)) => {
            tracing::info!(limit, "stopping after event limit");
            Ok(())
        }
        Err(FirehoseStop::Client(err)) => Err(err).context("error consuming firehose"),
    }
}

/// Create a session and print the account it belongs to.
pub async fn login(config: ClientConfig, identifier: &str, password: &str) -> Result<()> {
    let client = authenticated(config, identifier, password).await?;
    if let Some(session) = client.session() {
        println!("Session created");
        println!("  DID:    {}", session.did);
        println!("  Handle: {}", session.handle);
    }
    Ok(())
}

/// Repost the record `uri` / `cid`.
pub async fn repost(
    config: ClientConfig,
    identifier: &str,
    password: &str,
    uri: &str,
    cid: &str,
) -> Result<()> {
    let client = authenticated(config, identifier, password).await?;
    let created = client
        .create_repost_record(CreateRecordParams::subject(uri, cid))
        .await
        .context("repost failed")?;
    println!("Reposted: {}", created.uri);
    Ok(())
}

/// Like the record `uri` / `cid`.
pub async fn like(
    config: ClientConfig,
    identifier: &str,
    password: &str,
    uri: &str,
    cid: &str,
) -> Result<()> {
    let client = authenticated(config, identifier, password).await?;
    let created = client
        .create_like_record(CreateRecordParams::subject(uri, cid))
        .await
        .context("like failed")?;
    println!("Liked: {}", created.uri);
    Ok(())
}

/// Print the posts behind `uris`.
pub async fn posts(
    config: ClientConfig,
    identifier: &str,
    password: &str,
    uris: &[String],
) -> Result<()> {
    let client = authenticated(config, identifier, password).await?;
    let posts = client.get_posts(uris).await.context("get posts failed")?;

    for post in posts {
        println!("{}", post.uri);
        println!(
            "  @{} ({} likes, {} reposts)",
            post.author.handle, post.like_count, post.repost_count
        );
        if !post.record.text.is_empty() {
            println!("  {}", post.record.text);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_overrides() {
        let config = config(Some("http://localhost:2583/xrpc".to_string()), None);
        assert_eq!(config.xrpc_url, "http://localhost:2583/xrpc");
        assert_eq!(config.firehose_url, ClientConfig::default().firehose_url);
    }

    #[test]
    fn test_stop_reason_wraps_client_error() {
        let stop = FirehoseStop::from(Error::internal("fail to connect to websocket", "refused"));
        assert!(matches!(stop, FirehoseStop::Client(_)));
        assert_eq!(
            stop.to_string(),
            "status: 500, error: fail to connect to websocket, details: refused"
        );
    }
}
