//! Behaviour-driven tests for end-to-end invocation handling.

use std::io::Cursor;
use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use crate::error::BoxError;
use crate::registry::HandlerResult;
use crate::{HandlerRegistry, Output, invoke};

/// A quoted string value from a Gherkin feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuotedString(String);

impl FromStr for QuotedString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim_matches('"').to_owned()))
    }
}

impl QuotedString {
    fn into_inner(self) -> String {
        self.0
    }
}

struct World {
    registry: HandlerRegistry,
    name: String,
    query: String,
    method: String,
    body: Vec<u8>,
    output: Option<Output>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            name: String::new(),
            query: String::from("{}"),
            method: String::from("get"),
            body: Vec::new(),
            output: None,
        }
    }
}

impl World {
    fn output(&self) -> &Output {
        self.output.as_ref().expect("invocation should have run")
    }
}

#[fixture]
fn world() -> World {
    World::default()
}

fn register_test_handlers(registry: &mut HandlerRegistry) -> Result<(), BoxError> {
    registry.register_sync("ping", |_request, response| {
        response.send(&json!({"pong": true}))?;
        Ok(())
    })?;
    registry.register_sync("greet", |request, response| {
        let name = request
            .query()
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("stranger");
        response.write(format!("hello, {name}"))?;
        Ok(())
    })?;
    registry.register_fn("shout", |request, response| {
        Box::pin(async move {
            let text = request.body().text().await?;
            response.write(text.to_uppercase())?;
            Ok(())
        })
    })?;
    registry.register_sync("quiet", |_request, _response| Ok(()))?;
    registry.register_sync("early-failure", |_request, _response| -> HandlerResult {
        Err(BoxError::from("database unavailable"))
    })?;
    registry.register_sync("late-failure", |_request, response| -> HandlerResult {
        response.write("partial")?;
        Err(BoxError::from("cleanup failed"))
    })?;
    registry.register_sync("retagged", |_request, response| {
        response.set(("X-First", "One"))?;
        response.set(("X-Second", "Two"))?;
        response.set_code(202)?;
        Ok(())
    })?;
    Ok(())
}

#[given("a registry of test handlers")]
fn given_registry(world: &mut World) {
    register_test_handlers(&mut world.registry).expect("test handlers register");
}

#[given("an invocation of {name}")]
fn given_invocation(world: &mut World, name: QuotedString) {
    world.name = name.into_inner();
}

#[given("the query {query}")]
fn given_query(world: &mut World, query: QuotedString) {
    world.query = query.into_inner();
}

#[given("the method {method}")]
fn given_method(world: &mut World, method: QuotedString) {
    world.method = method.into_inner();
}

#[given("the request body {body}")]
fn given_body(world: &mut World, body: QuotedString) {
    world.body = body.into_inner().into_bytes();
}

#[when("the invocation runs")]
fn when_invocation_runs(world: &mut World) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime should build");
    let args = [
        String::from("invoke"),
        world.name.clone(),
        world.query.clone(),
        world.method.clone(),
        String::from("{}"),
    ];
    let input = Cursor::new(world.body.clone());
    world.output = Some(runtime.block_on(invoke(&world.registry, args, input)));
}

#[then("the output code is {code}")]
fn then_code(world: &mut World, code: u16) {
    assert_eq!(world.output().code(), code);
}

#[then("the output body is {body}")]
fn then_body(world: &mut World, body: QuotedString) {
    assert_eq!(world.output().body(), body.into_inner());
}

#[then("the output body mentions {text}")]
fn then_body_mentions(world: &mut World, text: QuotedString) {
    let expected = text.into_inner();
    let body = world.output().body();
    assert!(body.contains(&expected), "'{body}' lacks '{expected}'");
}

#[then("the output header {name} is {value}")]
fn then_header(world: &mut World, name: QuotedString, value: QuotedString) {
    let header = world
        .output()
        .headers()
        .and_then(|headers| headers.get(&name.into_inner()))
        .cloned()
        .expect("header should be present");
    let rendered = match header {
        Value::String(text) => text,
        other => other.to_string(),
    };
    assert_eq!(rendered, value.into_inner());
}

#[then("the output has only the header {name}")]
fn then_only_header(world: &mut World, name: QuotedString) {
    let headers = world.output().headers().expect("headers should be present");
    assert_eq!(headers.len(), 1);
    assert!(headers.contains_key(&name.into_inner()));
}

#[then("the output has no headers")]
fn then_no_headers(world: &mut World) {
    assert!(world.output().headers().is_none());
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "A JSON reply carries its length"
)]
fn json_reply(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "An unknown name is not found"
)]
fn unknown_name(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "Query values reach the handler"
)]
fn query_values(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "The request body is read from the input stream"
)]
fn body_from_input(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "A malformed query is rejected"
)]
fn malformed_query(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "A handler that never finishes still produces output"
)]
fn unfinished_response(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "Setting headers twice keeps only the last value"
)]
fn headers_replaced(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "A failure before finishing becomes a server error"
)]
fn early_failure(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/invocation.feature",
    name = "A failure after finishing keeps the finished reply"
)]
fn late_failure(world: World) {
    let _ = world;
}
