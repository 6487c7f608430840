use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scan::Matcher;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptionsParams {
    pub message_id: String,
}

/// Text an editor can put in place of a hard-coded string once it has been
/// moved into the catalog under `message_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOption {
    pub message_id: String,
    pub message_replacement: String,
}

/// Normalize a user-supplied message id before it is stored.
pub fn transform_message_id(message_id: &str) -> String {
    message_id.trim().to_string()
}

/// Replacement snippets for `message_id`: one for use inside a string
/// interpolation (`{context.t.id}`) and one for plain code (`context.t.id`).
/// A namespace written as `ns:key` becomes the path `ns.key`.
pub fn message_options(message_id: &str, anchor: &str) -> Vec<ExtractOption> {
    let message_id = transform_message_id(message_id);
    let path = message_id.replacen(':', ".", 1);
    vec![
        ExtractOption {
            message_id: message_id.clone(),
            message_replacement: format!("{{{anchor}.{path}}}"),
        },
        ExtractOption {
            message_id,
            message_replacement: format!("{anchor}.{path}"),
        },
    ]
}

pub fn options(params: MessageOptionsParams, matcher: &Matcher) -> Result<Value> {
    let message_id = transform_message_id(&params.message_id);
    if message_id.is_empty() {
        return Err(anyhow::anyhow!("messageId must not be empty"));
    }
    let options = message_options(&message_id, &matcher.config().anchor);
    Ok(serde_json::json!({ "options": options }))
}
