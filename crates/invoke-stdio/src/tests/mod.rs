//! Unit and behavioural tests for the invocation entry points.

mod behaviour;

use std::io::{self, Write};

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::{HandlerRegistry, InvokeError, invoke, run_with_input};

#[fixture]
fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register_sync("ping", |_request, response| {
            response.send(&json!({"pong": true}))?;
            Ok(())
        })
        .expect("register ping");
    registry
        .register_fn("echo", |request, response| {
            Box::pin(async move {
                let body: Value = request.body().json().await?;
                response.send(&json!({
                    "method": request.method(),
                    "path": request.path(),
                    "query": request.query(),
                    "body": body,
                }))?;
                Ok(())
            })
        })
        .expect("register echo");
    registry
}

fn run_to_string(registry: &HandlerRegistry, args: &[&str], input: &'static [u8]) -> String {
    let mut stdout = Vec::new();
    run_with_input(registry, args.iter().copied(), input, &mut stdout).expect("run succeeds");
    String::from_utf8(stdout).expect("output is UTF-8")
}

#[rstest]
fn run_writes_single_object_without_trailing_newline(registry: HandlerRegistry) {
    let output = run_to_string(&registry, &["invoke", "ping", "{}", "GET", "{}"], b"");
    assert_eq!(
        output,
        r#"{"code":200,"headers":{"content-type":"application/json","content-length":13},"body":"{\"pong\":true}"}"#
    );
}

#[rstest]
fn run_reads_body_from_input(registry: HandlerRegistry) {
    let output = run_to_string(
        &registry,
        &["invoke", "echo", r#"{"page":2}"#, "post", "{}"],
        br#"{"id":7}"#,
    );
    let decoded: Value = serde_json::from_str(&output).expect("output is JSON");
    let body: Value = decoded
        .get("body")
        .and_then(Value::as_str)
        .map(serde_json::from_str)
        .expect("body present")
        .expect("body is JSON");
    assert_eq!(
        body,
        json!({"method": "POST", "path": "/echo", "query": {"page": 2}, "body": {"id": 7}})
    );
}

#[rstest]
#[case::missing_argument(&["invoke", "ping", "{}", "GET"], "invalid invocation arguments")]
#[case::extra_argument(&["invoke", "ping", "{}", "GET", "{}", "extra"], "invalid invocation arguments")]
#[case::empty_name(&["invoke", "", "{}", "GET", "{}"], "handler name must not be empty")]
#[case::bad_query(&["invoke", "ping", "{", "GET", "{}"], "query parameter is not valid JSON")]
#[case::bad_headers(&["invoke", "ping", "{}", "GET", "nope"], "headers parameter is not valid JSON")]
#[case::array_headers(&["invoke", "ping", "{}", "GET", "[]"], "headers parameter must be a JSON object")]
#[tokio::test]
async fn invalid_invocations_produce_bad_request(
    registry: HandlerRegistry,
    #[case] args: &[&str],
    #[case] expected: &str,
) {
    let output = invoke(&registry, args.iter().copied(), &b""[..]).await;
    assert_eq!(output.code(), 400);
    assert!(
        output.body().starts_with(expected),
        "unexpected body: {}",
        output.body()
    );
    assert_eq!(
        output
            .headers()
            .and_then(|headers| headers.get("content-type")),
        Some(&json!("plain/text"))
    );
}

#[rstest]
#[tokio::test]
async fn unknown_handler_is_not_found(registry: HandlerRegistry) {
    let output = invoke(&registry, ["invoke", "missing", "{}", "GET", "{}"], &b""[..]).await;
    assert_eq!(
        serde_json::to_string(&output).expect("output serialises"),
        r#"{"code":404,"headers":{"content-type":"plain/text","content-length":18},"body":"Function not found"}"#
    );
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[rstest]
fn panicking_sync_handler_still_writes_server_error(mut registry: HandlerRegistry) {
    registry
        .register_sync("boom", |_request, _response| -> crate::HandlerResult {
            panic!("boom")
        })
        .expect("register boom");

    let output = run_to_string(&registry, &["invoke", "boom", "{}", "get", "{}"], b"");
    assert_eq!(
        output,
        r#"{"code":500,"headers":{"content-type":"plain/text","content-length":15},"body":"Function failed"}"#
    );
}

#[rstest]
fn failed_output_write_is_reported(registry: HandlerRegistry) {
    let error = run_with_input(
        &registry,
        ["invoke", "ping", "{}", "GET", "{}"],
        &b""[..],
        &mut BrokenPipe,
    )
    .expect_err("write should fail");
    assert!(matches!(error, InvokeError::Write { .. }));
}
