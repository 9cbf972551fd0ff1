//! JSON-lines transport.
//!
//! One command per line in, one reply per line out. When an event receiver
//! is given, render effects are interleaved on the same writer as
//! `{"event": ...}` lines, so a single consumer sees both.

use log::{info, warn};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::Receiver;

use crate::bridge::Navigator;
use crate::bridge::wire::{Call, ErrorPayload, EventLine, Reply};
use crate::core::action::Effect;

/// Serves commands from `reader` until it reaches EOF.
///
/// Malformed lines get an error reply and the loop carries on. Only I/O
/// failures end it early. At EOF the navigator is closed and, when events
/// are echoed, every event still in flight is written before returning.
pub async fn serve<R, W>(
    reader: R,
    mut writer: W,
    navigator: &Navigator,
    mut events: Option<Receiver<Effect>>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut served = 0usize;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = handle_line(navigator, &line);
                write_line(&mut writer, &reply).await?;
                served += 1;
            }
            Some(effect) = next_event(&mut events) => {
                write_line(&mut writer, &EventLine { event: &effect }).await?;
            }
        }
    }

    navigator.close();
    let mut flushed = 0usize;
    if let Some(receiver) = events.as_mut() {
        // Ends once the render worker has dropped its sender.
        while let Some(effect) = receiver.recv().await {
            write_line(&mut writer, &EventLine { event: &effect }).await?;
            flushed += 1;
        }
    }

    writer.flush().await?;
    info!("Input closed after {served} command(s), {flushed} trailing event(s)");
    Ok(())
}

/// Runs one line through the navigator and builds the reply.
pub fn handle_line(navigator: &Navigator, line: &str) -> Reply {
    match Call::parse(line) {
        Ok(call) => {
            let outcome = navigator.handle(&call.command, &call.payload);
            Reply::new(call.call, outcome)
        }
        Err((call, e)) => {
            warn!("Unusable input line: {e}");
            Reply::new(call, Err(ErrorPayload::from(&e)))
        }
    }
}

async fn next_event(events: &mut Option<Receiver<Effect>>) -> Option<Effect> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

async fn write_line<W, T>(writer: &mut W, value: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value).map_err(std::io::Error::other)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}
