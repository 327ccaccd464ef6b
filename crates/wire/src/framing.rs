// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing: a 4-byte big-endian length prefix followed by a JSON
//! payload, read and written over the control socket's async stream.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Maximum accepted frame size. The daemon's status/request payloads are a
/// few hundred bytes at most; this bound exists to reject a corrupted or
/// malicious length prefix rather than attempting to allocate gigabytes.
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame of {found} bytes exceeds the {max} byte limit")]
    FrameTooLarge { found: u32, max: u32 },
}

/// Encode `value` as a length-prefixed JSON frame.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(value)?;
    let len = u32::try_from(body.len()).unwrap_or(u32::MAX);
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a length-prefixed JSON frame already read into memory.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(body)?)
}

/// Write `value` to `writer` as one length-prefixed JSON frame.
pub async fn write_message<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: tokio::io::AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode(value)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed JSON frame from `reader`.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge { found: len, max: MAX_FRAME_BYTES });
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    decode(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    #[tokio::test]
    async fn round_trips_a_request_over_an_in_memory_pipe() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        write_message(&mut client, &Request::Ping).await.unwrap();
        let got: Request = read_message(&mut server).await.unwrap();
        assert_eq!(got, Request::Ping);
    }

    #[tokio::test]
    async fn round_trips_a_response() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let resp = Response::Pong;

        write_message(&mut server, &resp).await.unwrap();
        let got: Response = read_message(&mut client).await.unwrap();
        assert_eq!(got, resp);
    }

    #[tokio::test]
    async fn rejects_a_frame_over_the_size_limit() {
        let (mut client, mut server) = tokio::io::duplex(16);
        client.write_all(&(MAX_FRAME_BYTES + 1).to_be_bytes()).await.unwrap();
        drop(client);

        let err = read_message::<_, Request>(&mut server).await.unwrap_err();
        assert!(matches!(err, ProtocolError::FrameTooLarge { .. }));
    }
}
