//! Control-plane action surface.
//!
//! A generic command dispatcher hands the router JSON action documents;
//! every action selects on the `/action` field and answers with a
//! [`Response`] carrying a message and optional data.

use serde::Serialize;
use serde_json::Value;

use rtriage_event::Document;

use crate::router::Router;

/// A control-plane reply: a human-readable message plus optional payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    fn message(message: impl Into<String>) -> Self {
        Response {
            message: message.into(),
            data: None,
        }
    }

    fn with_data(message: impl Into<String>, data: Value) -> Self {
        Response {
            message: message.into(),
            data: Some(data),
        }
    }

    fn error(err: impl std::fmt::Display) -> Self {
        Response::message(format!("Error: {err}"))
    }
}

/// Dispatch one action document against the router.
pub fn dispatch(router: &Router, params: &Value) -> Response {
    let Some(action) = params.pointer("/action").and_then(Value::as_str) else {
        return Response::message(r#"Missing "action" parameter"#);
    };
    match action {
        "set" => set_route(router, params),
        "get" => get_routes(router),
        "delete" => delete_route(router, params),
        "change_priority" => change_priority(router, params),
        "enqueue_event" => enqueue_event(router, params),
        other => Response::message(format!("Invalid action '{other}'")),
    }
}

fn get_str<'a>(params: &'a Value, field: &str) -> Option<&'a str> {
    params.pointer(&format!("/{field}")).and_then(Value::as_str)
}

fn get_priority(params: &Value) -> Option<u32> {
    params
        .pointer("/priority")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
}

fn missing(field: &str) -> Response {
    Response::message(format!(r#"Missing "{field}" parameter"#))
}

fn set_route(router: &Router, params: &Value) -> Response {
    let Some(name) = get_str(params, "name") else {
        return missing("name");
    };
    let Some(priority) = get_priority(params) else {
        return missing("priority");
    };
    let Some(target) = get_str(params, "target") else {
        return missing("target");
    };
    match router.add_route(name, target, priority) {
        Ok(()) => Response::message(format!("Route '{name}' added")),
        Err(err) => Response::error(err),
    }
}

fn get_routes(router: &Router) -> Response {
    match serde_json::to_value(router.route_table()) {
        Ok(data) => Response::with_data("Ok", data),
        Err(err) => Response::error(err),
    }
}

fn delete_route(router: &Router, params: &Value) -> Response {
    let Some(name) = get_str(params, "name") else {
        return missing("name");
    };
    match router.remove_route(name) {
        Ok(()) => Response::message(format!("Route '{name}' deleted")),
        Err(err) => Response::error(err),
    }
}

fn change_priority(router: &Router, params: &Value) -> Response {
    let Some(name) = get_str(params, "name") else {
        return missing("name");
    };
    let Some(priority) = get_priority(params) else {
        return missing("priority");
    };
    match router.change_route_priority(name, priority) {
        Ok(()) => Response::message(format!("Route '{name}' priority changed to '{priority}'")),
        Err(err) => Response::error(err),
    }
}

fn enqueue_event(router: &Router, params: &Value) -> Response {
    let Some(payload) = get_str(params, "event") else {
        return missing("event");
    };
    let event = match Document::from_json_str(payload) {
        Ok(event) => event,
        Err(err) => return Response::error(err),
    };
    match router.enqueue_event(event) {
        Ok(()) => Response::message("Ok"),
        Err(err) => Response::error(err),
    }
}
