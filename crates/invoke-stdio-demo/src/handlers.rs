//! Handlers served by the demo binary.

use serde_json::{Value, json};
use tracing::debug;

use invoke_stdio::{BoxError, HandlerRegistry, HandlerResult, Request, Response};

/// Builds the registry of demo handlers.
///
/// | name    | behaviour                                          |
/// |---------|----------------------------------------------------|
/// | `ping`  | sends `{"pong":true}`                              |
/// | `echo`  | sends the method, path, query and JSON body back   |
/// | `greet` | writes `hello, <name>` using the `name` query key  |
/// | `fail`  | returns an error without finishing the response    |
/// | `crash` | panics without finishing the response              |
pub fn registry() -> Result<HandlerRegistry, BoxError> {
    let mut registry = HandlerRegistry::new();
    registry.register_sync("ping", ping)?;
    registry.register_fn("echo", |request, response| Box::pin(echo(request, response)))?;
    registry.register_sync("greet", greet)?;
    registry.register_sync("fail", fail)?;
    registry.register_sync("crash", crash)?;
    Ok(registry)
}

fn ping(_request: &Request, response: &mut Response) -> HandlerResult {
    response.send(&json!({ "pong": true }))?;
    Ok(())
}

async fn echo(request: &Request, response: &mut Response) -> HandlerResult {
    let text = request.body().text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text)?
    };
    debug!(target: "invoke_demo", bytes = text.len(), "echoing request");
    response.send(&json!({
        "method": request.method(),
        "path": request.path(),
        "query": request.query(),
        "body": body,
    }))?;
    Ok(())
}

fn greet(request: &Request, response: &mut Response) -> HandlerResult {
    let name = request
        .query()
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("world");
    response.write(format!("hello, {name}"))?;
    Ok(())
}

fn fail(_request: &Request, _response: &mut Response) -> HandlerResult {
    Err(BoxError::from("demo failure"))
}

#[expect(
    clippy::panic_in_result_fn,
    reason = "demonstrates that a panicking handler still yields an output object"
)]
fn crash(_request: &Request, _response: &mut Response) -> HandlerResult {
    panic!("demo crash")
}
