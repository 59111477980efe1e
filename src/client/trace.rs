//! Trace-endpoint prober
//!
//! One probe is one TCP dial followed by a single HTTP/1.1 `GET` of the trace
//! endpoint written on that same connection. The handshake latency covers the
//! dial only. Each later phase runs under its own deadline, and dropping a
//! timed-out future also drops the connection, so no read outlives its budget.

use super::{tls, Prober};
use crate::{
    defaults::USER_AGENT,
    error::{AppError, Result},
    logging::Logger,
    models::{Config, ProbeResult},
    types::{CandidateAddress, Endpoint},
};
use async_trait::async_trait;
use regex::Regex;
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time::{timeout, timeout_at, Instant},
};
use tokio_rustls::{rustls::pki_types::ServerName, TlsConnector};

/// Response heads larger than this are rejected
const MAX_HEAD_BYTES: usize = 16 * 1024;
/// Trace bodies are a few hundred bytes; anything past this is ignored
const MAX_BODY_BYTES: usize = 64 * 1024;
const READ_CHUNK: usize = 4096;

/// Probes candidates against the trace endpoint
pub struct TraceProber {
    endpoint: Endpoint,
    connect_timeout: Duration,
    request_timeout: Duration,
    read_timeout: Duration,
    tls: Option<(TlsConnector, ServerName<'static>)>,
    colo_pattern: Regex,
    logger: Arc<Logger>,
}

impl TraceProber {
    pub fn new(config: &Config, logger: Arc<Logger>) -> Result<Self> {
        let endpoint = config.trace_endpoint()?;

        let tls = if endpoint.tls {
            Some((tls::build_connector()?, tls::server_name(&endpoint.host)?))
        } else {
            None
        };

        let colo_pattern = Regex::new(r"colo=([A-Z]+)")
            .map_err(|e| AppError::internal(format!("Invalid colo pattern: {}", e)))?;

        Ok(Self {
            endpoint,
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            read_timeout: config.read_timeout(),
            tls,
            colo_pattern,
            logger,
        })
    }

    /// Worst-case wall time a single probe can take
    pub fn max_probe_duration(&self) -> Duration {
        self.connect_timeout + self.request_timeout + self.read_timeout
    }

    async fn try_probe(&self, candidate: &CandidateAddress) -> Result<ProbeResult> {
        let start = Instant::now();
        let stream = timeout(self.connect_timeout, TcpStream::connect(candidate.socket_target()))
            .await
            .map_err(|_| AppError::network("connect timed out"))??;
        let handshake_latency = start.elapsed();

        // TLS handshake, request write and response head share one deadline
        let deadline = Instant::now() + self.request_timeout;

        let body = match &self.tls {
            Some((connector, server_name)) => {
                let stream = timeout_at(deadline, connector.connect(server_name.clone(), stream))
                    .await
                    .map_err(|_| AppError::tls("TLS handshake timed out"))?
                    .map_err(|e| AppError::tls(format!("TLS handshake failed: {}", e)))?;
                self.exchange(stream, deadline).await?
            }
            None => self.exchange(stream, deadline).await?,
        };

        let colo = validate_trace_body(&body, USER_AGENT, &self.colo_pattern)
            .ok_or_else(|| AppError::validation("trace response failed validation"))?;

        Ok(ProbeResult::new(candidate.host.clone(), candidate.port, handshake_latency, colo))
    }

    async fn exchange<S>(&self, mut stream: S, deadline: Instant) -> Result<String>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
            self.endpoint.path_and_query, self.endpoint.host, USER_AGENT
        );

        let (mut buf, head_end) = timeout_at(deadline, async {
            stream.write_all(request.as_bytes()).await?;
            stream.flush().await?;
            read_head(&mut stream).await
        })
        .await
        .map_err(|_| AppError::network("request timed out"))??;

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        if !head.starts_with("HTTP/") {
            return Err(AppError::network("response is not HTTP"));
        }

        let mut body = buf.split_off(head_end + 4);
        let body = if is_chunked(&head) {
            timeout(self.read_timeout, read_chunked_body(&mut stream, body))
                .await
                .map_err(|_| AppError::network("body read timed out"))??
        } else {
            let limit = content_length(&head).unwrap_or(MAX_BODY_BYTES).min(MAX_BODY_BYTES);
            timeout(self.read_timeout, read_body(&mut stream, &mut body, limit))
                .await
                .map_err(|_| AppError::network("body read timed out"))??;
            body
        };

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl Prober for TraceProber {
    async fn probe(&self, candidate: &CandidateAddress) -> Option<ProbeResult> {
        match self.try_probe(candidate).await {
            Ok(result) => {
                self.logger.info("Found reachable address")
                    .probe(&result)
                    .log()
                    .await;
                Some(result)
            }
            Err(e) => {
                self.logger.debug("Candidate dropped")
                    .candidate(candidate)
                    .field("reason", e.to_string())
                    .log()
                    .await;
                None
            }
        }
    }
}

/// Read until the blank line ending the response head.
///
/// Returns the buffer and the offset of the terminating `\r\n\r\n`; bytes
/// after it are the start of the body.
async fn read_head<S: AsyncRead + Unpin>(stream: &mut S) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(AppError::network("connection closed before response head"));
        }
        // Re-scan the overlap in case the terminator straddles two reads
        let scan_from = buf.len().saturating_sub(3);
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find_head_end(&buf[scan_from..]) {
            return Ok((buf, scan_from + pos));
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(AppError::network("response head too large"));
        }
    }
}

async fn read_body<S: AsyncRead + Unpin>(stream: &mut S, body: &mut Vec<u8>, limit: usize) -> Result<()> {
    let mut chunk = [0u8; READ_CHUNK];

    while body.len() < limit {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    body.truncate(limit);
    Ok(())
}

/// Read a `Transfer-Encoding: chunked` body up to its zero-size chunk.
///
/// `raw` holds whatever followed the head in the first read. The peer may
/// keep the connection open after the last chunk, so EOF is not awaited.
async fn read_chunked_body<S: AsyncRead + Unpin>(stream: &mut S, mut raw: Vec<u8>) -> Result<Vec<u8>> {
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        if let Some(body) = decode_chunked(&raw)? {
            return Ok(body);
        }
        if raw.len() > MAX_BODY_BYTES {
            return Err(AppError::network("chunked body too large"));
        }

        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(AppError::network("connection closed inside chunked body"));
        }
        raw.extend_from_slice(&chunk[..n]);
    }
}

/// Strip chunk framing from `raw`.
///
/// Returns `Ok(None)` until the terminating zero-size chunk has arrived.
/// Chunk extensions and trailers are ignored.
fn decode_chunked(raw: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let Some(line_len) = raw[pos..].windows(2).position(|w| w == b"\r\n") else {
            return Ok(None);
        };
        let line = String::from_utf8_lossy(&raw[pos..pos + line_len]);
        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| AppError::network(format!("invalid chunk size '{}'", size_field)))?;
        pos += line_len + 2;

        if size == 0 {
            return Ok(Some(body));
        }
        if size > MAX_BODY_BYTES {
            return Err(AppError::network("chunk too large"));
        }
        if raw.len() < pos + size + 2 {
            return Ok(None);
        }
        body.extend_from_slice(&raw[pos..pos + size]);
        pos += size + 2;
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn header_value<'a>(head: &'a str, header: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim().eq_ignore_ascii_case(header).then(|| value.trim())
    })
}

fn content_length(head: &str) -> Option<usize> {
    header_value(head, "content-length")?.parse().ok()
}

fn is_chunked(head: &str) -> bool {
    header_value(head, "transfer-encoding")
        .is_some_and(|value| value.to_ascii_lowercase().contains("chunked"))
}

/// Check a trace body and extract its edge-location code.
///
/// The body must echo the client's user agent as `uag=<agent>` and carry a
/// `colo=<UPPERCASE>` entry.
pub fn validate_trace_body(body: &str, user_agent: &str, colo_pattern: &Regex) -> Option<String> {
    if !body.contains(&format!("uag={}", user_agent)) {
        return None;
    }

    colo_pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
