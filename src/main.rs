use anyhow::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use slang_ref_core::config::{MatcherConfig, ServerSettings};
use slang_ref_core::rpc::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, Response,
    StdioTransport, Transport,
};
use slang_ref_core::scan::Matcher;
use slang_ref_core::{extract, scan, workspace};
use std::io::{BufRead, Write};
use std::process;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    matcher: Option<MatcherConfig>,
    #[serde(default)]
    settings: Option<ServerSettings>,
}

/// What the main loop should do after a request has been answered.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

struct Server<R, W> {
    transport: Transport<R, W>,
    matcher: Matcher,
    settings: ServerSettings,
}

/// Run a handler on deserialized params and map both failure kinds onto
/// JSON-RPC errors.
fn handle<P, F>(id: Option<Value>, params: Value, f: F) -> Response
where
    P: serde::de::DeserializeOwned,
    F: FnOnce(P) -> Result<Value>,
{
    match serde_json::from_value(params) {
        Ok(p) => match f(p) {
            Ok(result) => Response::success(id, result),
            Err(e) => Response::error(id, INTERNAL_ERROR, e.to_string()),
        },
        Err(e) => Response::error(id, INVALID_PARAMS, e.to_string()),
    }
}

impl<R: BufRead, W: Write> Server<R, W> {
    fn new(transport: Transport<R, W>) -> Self {
        Self {
            transport,
            matcher: Matcher::default(),
            settings: ServerSettings::default(),
        }
    }

    fn run(&mut self) -> Result<()> {
        info!("server starting");

        loop {
            let request = match self.transport.read_request() {
                Ok(Some(req)) => req,
                Ok(None) => {
                    info!("EOF, shutting down");
                    break;
                }
                Err(e) => {
                    warn!("read error: {:#}", e);
                    let response = Response::error(None, PARSE_ERROR, e.to_string());
                    self.transport.send_response(&response)?;
                    continue;
                }
            };

            if !request.has_valid_version() {
                if request.id.is_some() {
                    let response =
                        Response::error(request.id, INVALID_REQUEST, "invalid jsonrpc version");
                    self.transport.send_response(&response)?;
                }
                continue;
            }

            // Notifications have no id
            let Some(id) = request.id else {
                debug!(method = %request.method, "ignoring notification");
                continue;
            };

            let (response, flow) = self.dispatch(&request.method, request.params, Some(id));
            if let Err(e) = self.transport.send_response(&response) {
                error!("send error: {:#}", e);
            }
            if flow == Flow::Exit {
                info!("shutdown requested");
                break;
            }
        }

        Ok(())
    }

    fn initialize(&mut self, params: Value) -> Result<Value> {
        let params: InitializeParams = if params.is_null() {
            InitializeParams::default()
        } else {
            serde_json::from_value(params)?
        };
        if let Some(config) = params.matcher {
            self.matcher = Matcher::new(config)?;
        }
        if let Some(settings) = params.settings {
            self.settings = settings;
        }
        info!(anchor = %self.matcher.config().anchor, "initialized");
        Ok(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "documentSelectors": self.settings.document_selectors,
        }))
    }

    fn dispatch(&mut self, method: &str, params: Value, id: Option<Value>) -> (Response, Flow) {
        let response = match method {
            "initialize" => match self.initialize(params) {
                Ok(result) => Response::success(id, result),
                Err(e) => Response::error(id, INVALID_PARAMS, format!("{:#}", e)),
            },

            "shutdown" => return (Response::success(id, Value::Null), Flow::Exit),

            "references/locate" => {
                handle(id, params, |p| scan::locate(p, &self.matcher))
            }

            "references/locateBatch" => {
                handle(id, params, |p| scan::locate_batch(p, &self.matcher))
            }

            "references/scanWorkspace" => handle(id, params, |p| {
                workspace::scan(p, &self.settings.extensions, &self.matcher)
            }),

            "extract/messageOptions" => {
                handle(id, params, |p| extract::options(p, &self.matcher))
            }

            _ => Response::error(id, METHOD_NOT_FOUND, format!("method not found: {}", method)),
        };
        (response, Flow::Continue)
    }
}

fn main() {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut server = Server::new(StdioTransport::stdio());
    if let Err(e) = server.run() {
        error!("fatal error: {:#}", e);
        process::exit(1);
    }
}
