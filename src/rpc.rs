use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, BufReader, Write};
use std::thread;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

const JSONRPC_VERSION: &str = "2.0";

impl Response {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

impl Request {
    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }
}

/// Newline-delimited JSON-RPC over any line reader and writer.
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

pub type StdioTransport = Transport<BufReader<io::Stdin>, io::Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        Transport::new(BufReader::new(io::stdin()), io::stdout())
    }
}

fn parse_request_line(line: &str) -> Result<Option<Request>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let request: Request =
        serde_json::from_str(trimmed).context("failed to parse JSON-RPC request")?;
    Ok(Some(request))
}

impl<R: BufRead, W: Write> Transport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next request, skipping blank lines. `Ok(None)` means the peer is gone.
    pub fn read_request(&mut self) -> Result<Option<Request>> {
        loop {
            let mut line = String::new();
            let bytes_read = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(err) => match err.kind() {
                    io::ErrorKind::Interrupted => continue,
                    io::ErrorKind::BrokenPipe => return Ok(None),
                    io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(1));
                        continue;
                    }
                    _ => return Err(err).context("failed to read request"),
                },
            };

            if bytes_read == 0 {
                return Ok(None);
            }

            if let Some(request) = parse_request_line(&line)? {
                trace!(method = %request.method, "received request");
                return Ok(Some(request));
            }
        }
    }

    pub fn send_response(&mut self, response: &Response) -> Result<()> {
        let json = serde_json::to_string(response)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
