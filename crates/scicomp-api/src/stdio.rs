//! # Stdio Transport
//!
//! Newline-delimited JSON-RPC: one request per input line, one reply per
//! output line, in order. Each line goes through
//! [`handle_message`](crate::routes::rpc::handle_message), the same path
//! `POST /mcp` uses. Blank lines are skipped and notifications write nothing.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::routes::rpc::handle_message;
use crate::state::AppState;

/// Answer requests from `reader` until it reaches end of input.
pub async fn serve_lines<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(reply) = handle_message(state, line.as_bytes()).await else {
            continue;
        };
        let mut encoded = serde_json::to_vec(&reply).map_err(std::io::Error::other)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Serve JSON-RPC on the process's stdin and stdout until stdin closes.
pub async fn serve_stdio(state: AppState) -> std::io::Result<()> {
    tracing::info!("scicomp serving JSON-RPC on stdio");
    serve_lines(&state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    tracing::info!("stdin closed");
    Ok(())
}
