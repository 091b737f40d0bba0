//! NDJSON invocation transport.
//!
//! One JSON invocation per input line, exactly one JSON [`Response`] line per
//! invocation, flushed immediately so the caller can wait on each reply.
//! Blank lines and `#` comments are skipped.
//!
//! [`Response`]: crate::protocol::Response

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::handler::{parse_invocation, CallHandler};
use crate::protocol::Response;

/// Counters for one serve session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeReport {
    /// Invocation lines answered.
    pub processed_lines: usize,
    /// Lines that were not a valid invocation (answered with the empty reply).
    pub parse_errors: usize,
}

/// Serve invocations from `reader` until EOF, writing replies to `writer`.
pub async fn serve_ndjson<R, W>(
    handler: &CallHandler,
    reader: R,
    writer: &mut W,
) -> Result<ServeReport>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut report = ServeReport::default();

    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read invocation line")?
    {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        report.processed_lines = report.processed_lines.saturating_add(1);

        let response = match parse_invocation(trimmed) {
            Ok(invocation) => handler.handle(&invocation).await,
            Err(e) => {
                log::warn!("line {}: unparseable invocation: {e}", report.processed_lines);
                report.parse_errors = report.parse_errors.saturating_add(1);
                Response::empty()
            }
        };

        let mut encoded =
            serde_json::to_vec(&response).context("failed to serialize response")?;
        encoded.push(b'\n');
        writer
            .write_all(&encoded)
            .await
            .context("failed to write response line")?;
        writer.flush().await.context("failed to flush response line")?;
    }

    log::info!(
        "input closed after {} invocation(s), {} unparseable",
        report.processed_lines,
        report.parse_errors
    );
    Ok(report)
}
