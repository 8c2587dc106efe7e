use eyre::{Context, Result};
use libaudioplayers_dispatch::dispatch::{
    Arguments, CommandDispatcher, ErrorOutcome, MethodCall, Outcome, PlayerEvent, Value,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<u64>,
    method: String,
    #[serde(default, alias = "arguments")]
    args: Arguments,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Line<'a> {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        result: Value,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        error: ErrorOutcome,
    },
    NotImplemented {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        #[serde(rename = "notImplemented")]
        not_implemented: bool,
    },
    Event {
        event: &'a str,
        args: Arguments,
    },
}

fn parse_request(line: &str) -> Result<(Option<u64>, MethodCall)> {
    let request: Request = serde_json::from_str(line).wrap_err("Invalid request")?;
    let call = MethodCall {
        method: request.method,
        arguments: request.args,
    };
    Ok((request.id, call))
}

fn encode_outcome(id: Option<u64>, outcome: Outcome) -> Result<String> {
    let line = match outcome {
        Outcome::Success(result) => Line::Success { id, result },
        Outcome::Error(error) => Line::Error { id, error },
        Outcome::NotImplemented => Line::NotImplemented {
            id,
            not_implemented: true,
        },
    };
    serde_json::to_string(&line).wrap_err("Error encoding response")
}

fn encode_event(event: &PlayerEvent) -> Result<String> {
    let line = Line::Event {
        event: event.method(),
        args: event.arguments(),
    };
    serde_json::to_string(&line).wrap_err("Error encoding event")
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await.wrap_err("Error writing output")
}

/// Feeds request lines to the dispatcher and writes responses and events as they happen.
///
/// Returns once the input is exhausted.
pub(crate) async fn serve<R, W>(dispatcher: &CommandDispatcher, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut events = dispatcher.subscribe();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("Error reading input")? else {
                    info!("Input closed");
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_request(&line) {
                    Ok((id, call)) => {
                        if let Some(outcome) = dispatcher.handle(&call) {
                            write_line(output, &encode_outcome(id, outcome)?).await?;
                        }
                    }
                    Err(e) => warn!("Skipping malformed line: {e:?}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => write_line(output, &encode_event(&event)?).await?,
                Err(RecvError::Lagged(skipped)) => warn!("Output fell behind, dropped {skipped} events"),
                Err(RecvError::Closed) => return Ok(()),
            }
        }
    }
}
