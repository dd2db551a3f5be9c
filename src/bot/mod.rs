//! Signal group bot answering `/pic <prompt>` with a generated picture.
//!
//! Drives `signal-cli -a <account> jsonRpc` over its stdin/stdout, one
//! JSON document per line.

mod protocol;

pub use protocol::{pic_prompt, Envelope, Incoming, JsonRpcRequest};

use crate::error::Result;
use crate::image::ImageService;
use crate::runner::Runner;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Reply sent when a picture could not be produced.
pub const FAILURE_REPLY: &str = "Could not generate picture";

/// Settings for the Signal bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Signal account the bot runs as.
    pub account: String,
    /// Groups allowed to request pictures.
    pub group_ids: Vec<String>,
    /// Path to the `signal-cli` executable.
    pub signal_cli: PathBuf,
}

impl BotConfig {
    /// Config using `signal-cli` from `PATH`.
    pub fn new(account: impl Into<String>, group_ids: Vec<String>) -> Self {
        Self {
            account: account.into(),
            group_ids,
            signal_cli: PathBuf::from("signal-cli"),
        }
    }
}

/// The bot: filters incoming messages and answers picture requests.
pub struct SignalBot<S> {
    runner: Runner<S>,
    config: BotConfig,
}

impl<S: ImageService> SignalBot<S> {
    /// Creates a bot generating pictures through `runner`.
    pub fn new(runner: Runner<S>, config: BotConfig) -> Self {
        Self { runner, config }
    }

    /// Spawns signal-cli and serves until it exits or we are told to stop.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(account = %self.config.account, "starting signal-cli");

        let mut child = Command::new(&self.config.signal_cli)
            .arg("-a")
            .arg(&self.config.account)
            .arg("jsonRpc")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("signal-cli stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("signal-cli stdout not captured"))?;
        let mut lines = BufReader::new(stdout).lines();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, closing signal-cli");
                    break;
                }
                line = lines.next_line() => match line? {
                    Some(line) => self.handle_line(&line, &mut stdin).await?,
                    None => break,
                },
            }
        }

        // Closing stdin makes signal-cli exit on its own.
        drop(stdin);
        let status = child.wait().await?;
        tracing::info!(%status, "signal-cli exited");
        Ok(())
    }

    /// Handles one line from signal-cli, writing any requests to `out`.
    pub async fn handle_line<W: AsyncWrite + Unpin>(&self, line: &str, out: &mut W) -> Result<()> {
        tracing::debug!(line, "received");

        let incoming: Incoming = match serde_json::from_str(line) {
            Ok(incoming) => incoming,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unparsable line from signal-cli");
                return Ok(());
            }
        };
        let Some(envelope) = incoming.into_envelope() else {
            return Ok(());
        };
        let Some(prompt) = envelope.message().and_then(pic_prompt) else {
            return Ok(());
        };
        let Some(group_id) = envelope.group_id() else {
            tracing::info!("picture request not posted to a group, ignoring");
            return Ok(());
        };
        if !self.config.group_ids.iter().any(|g| g == group_id) {
            tracing::info!(group_id, "group id did not match, ignoring");
            return Ok(());
        }

        tracing::info!(group_id, prompt, "generating picture");
        send(out, JsonRpcRequest::new("sendTyping", json!({ "groupId": group_id }))).await?;
        let outcome = self.runner.fetch(prompt).await;
        send(
            out,
            JsonRpcRequest::new("sendTyping", json!({ "groupId": group_id, "stop": true })),
        )
        .await?;

        let mut params = json!({
            "quoteTimestamp": envelope.timestamp,
            "quoteMessage": envelope.message(),
            "quoteAuthor": envelope.source,
            "groupId": group_id,
        });
        let body = match outcome {
            Ok((Some(image), _)) => json!({ "attachments": [image.to_data_url()] }),
            Ok((None, _)) => {
                tracing::warn!(group_id, "no picture generated");
                json!({ "message": FAILURE_REPLY })
            }
            Err(e) => {
                tracing::warn!(group_id, kind = %e.kind(), error = %e, "picture generation failed");
                json!({ "message": FAILURE_REPLY })
            }
        };
        merge(&mut params, body);

        send(out, JsonRpcRequest::new("send", params)).await
    }
}

fn merge(target: &mut Value, extra: Value) {
    if let (Some(target), Value::Object(extra)) = (target.as_object_mut(), extra) {
        target.extend(extra);
    }
}

async fn send<W: AsyncWrite + Unpin>(out: &mut W, request: JsonRpcRequest) -> Result<()> {
    let mut line = serde_json::to_string(&request)?;
    tracing::debug!(method = request.method, id = %request.id, "sending");
    line.push('\n');
    out.write_all(line.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = term.recv() => {}
                    _ = ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM, only Ctrl-C will stop the bot");
                ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    ctrl_c().await;
}

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
