//! JSON method-call surface used by host UI bridges.
//!
//! A bridge forwards `{ "method": "changeIcon", "arguments": { "iconName": "red" } }` and relays
//! the [`CommandResponse`] back to the UI unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    coordinator::{SwitchCoordinator, SwitchOutcome},
    error::{ErrorCode, SwitchError},
};

/// Method that requests an icon change.
pub const CHANGE_ICON_METHOD: &str = "changeIcon";
/// Alternate name for [`CHANGE_ICON_METHOD`] used by older bridges.
pub const UPDATE_ICON_METHOD: &str = "updateIcon";
/// Method that reads the active icon.
pub const GET_CURRENT_ICON_METHOD: &str = "getCurrentIcon";
/// Argument carrying the requested icon name.
pub const ICON_NAME_ARG: &str = "iconName";

/// Inbound method call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name.
    pub method: String,
    /// Method arguments, usually a JSON object.
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// Creates a method call.
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    fn string_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }
}

/// Result relayed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Result payload for successful calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Stable error code for failed calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable error message for failed calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResponse {
    /// Successful response carrying `value`.
    pub fn success(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            code: None,
            message: None,
        }
    }

    /// Failed response.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            code: Some(code.as_str().to_string()),
            message: Some(message.into()),
        }
    }

    /// Failed response for a coordinator error.
    pub fn from_error(err: &SwitchError) -> Self {
        Self::failure(err.code(), err.to_string())
    }
}

/// Runs `call` against `coordinator`. Never fails; errors are encoded in the response.
pub async fn dispatch(coordinator: &SwitchCoordinator, call: &MethodCall) -> CommandResponse {
    debug!(method = %call.method, "icon command");
    match call.method.as_str() {
        CHANGE_ICON_METHOD | UPDATE_ICON_METHOD => {
            let Some(name) = call.string_arg(ICON_NAME_ARG) else {
                return CommandResponse::from_error(&SwitchError::InvalidArgument);
            };
            match coordinator.request_change(name).await {
                Ok(SwitchOutcome::Applied(icon)) => {
                    CommandResponse::success(json!({ "icon": icon.as_str(), "deferred": false }))
                }
                Ok(SwitchOutcome::Deferred(icon)) => {
                    CommandResponse::success(json!({ "icon": icon.as_str(), "deferred": true }))
                }
                Err(err) => CommandResponse::from_error(&err),
            }
        }
        GET_CURRENT_ICON_METHOD => match coordinator.get_current_icon().await {
            Ok(icon) => CommandResponse::success(Value::String(icon.to_string())),
            Err(err) => CommandResponse::from_error(&err),
        },
        other => CommandResponse::failure(
            ErrorCode::NotImplemented,
            format!("method `{other}` is not implemented"),
        ),
    }
}
