//! JSON output formatting

use appspec_core::{Application, RunContext};
use serde_json::{json, Map, Value};

/// Serialize compactly or with indentation
pub fn to_string(value: &Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Compiled tables plus app fields
pub fn format_spec(app: &Application) -> Value {
    json!({
        "app": app.info(),
        "options": app.spec().options,
        "arguments": app.spec().arguments,
    })
}

/// Bound options, arguments and opened handles of one run
pub fn format_context(ctx: &RunContext) -> Value {
    let mut arguments = Map::new();
    let mut handles = Map::new();
    for (name, value) in ctx.arguments.iter() {
        arguments.insert(name.clone(), json!(value));
        if let Some(handle) = ctx.arguments.handle(name) {
            let opened: Vec<Value> = handle
                .handles()
                .iter()
                .map(|h| {
                    json!({
                        "path": h.path(),
                        "direction": h.direction(),
                        "binary": h.is_binary(),
                        "stdin": h.is_stdin(),
                    })
                })
                .collect();
            handles.insert(appspec_core::handle_key(name), Value::Array(opened));
        }
    }

    json!({
        "app": ctx.app.name,
        "options": ctx.options,
        "arguments": arguments,
        "handles": handles,
    })
}
