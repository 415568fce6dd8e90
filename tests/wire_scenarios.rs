//! Byte-level behaviour of the server engine and the core message model

mod test_helpers;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use test_helpers::{demo_server, init_tracing};
use turul_json_rpc_core::error_codes::*;
use turul_json_rpc_core::{
    ErrorCodeRangeError, JsonRpcErrorObject, JsonRpcMessage, ProtocolError, RequestId,
    ResponseWrapper,
};
use turul_json_rpc_server::{CallContext, Failure, FunctionHandler, JsonRpcServer};

async fn exchange(server: &JsonRpcServer, body: &str) -> Option<Value> {
    server
        .process_inbound(body.as_bytes())
        .await
        .map(|reply| serde_json::from_slice(&reply).expect("reply is JSON"))
}

#[tokio::test]
async fn single_request_round_trip() {
    init_tracing();
    let (server, _) = demo_server(false);

    let reply = exchange(
        &server,
        r#"{"jsonrpc":"2.0","id":"1","method":"ping","params":null}"#,
    )
    .await;
    assert_eq!(reply, Some(json!({"jsonrpc": "2.0", "id": "1", "result": "pong"})));
}

#[tokio::test]
async fn method_throws() {
    let (server, _) = demo_server(false);

    let reply = exchange(&server, r#"{"jsonrpc":"2.0","id":"2","method":"fail"}"#)
        .await
        .unwrap();
    assert_eq!(reply["id"], json!("2"));
    assert_eq!(reply["error"]["code"], json!(GENERIC_EXCEPTION));
    assert_eq!(reply["error"]["message"], json!("Server error"));
    assert_eq!(
        reply["error"]["data"],
        json!({"type": "DemoFailure", "message": "the demo method always fails"})
    );
}

#[tokio::test]
async fn detailed_errors_expose_details() {
    let (server, _) = demo_server(true);

    let reply = exchange(&server, r#"{"jsonrpc":"2.0","id":3,"method":"fail"}"#)
        .await
        .unwrap();
    assert_eq!(reply["error"]["data"]["details"], json!("DemoFailure"));
}

#[tokio::test]
async fn not_found_failure() {
    let (server, _) = demo_server(false);

    let reply = exchange(&server, r#"{"jsonrpc":"2.0","id":4,"method":"missing_user"}"#)
        .await
        .unwrap();
    assert_eq!(reply["error"]["code"], json!(NOT_FOUND));
    assert_eq!(reply["error"]["message"], json!("Not found"));
}

#[tokio::test]
async fn malformed_json_in() {
    let (server, _) = demo_server(false);

    let reply = exchange(&server, "{not json").await.unwrap();
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(reply["error"]["code"], json!(PARSE_ERROR));
}

#[tokio::test]
async fn wrong_version_and_missing_method() {
    let (server, _) = demo_server(false);

    let reply = exchange(&server, r#"{"jsonrpc":"1.0","id":5,"method":"ping"}"#)
        .await
        .unwrap();
    assert_eq!(reply["id"], json!(5));
    assert_eq!(reply["error"]["code"], json!(INVALID_REQUEST));

    let reply = exchange(&server, r#"{"jsonrpc":"2.0","id":6}"#).await.unwrap();
    assert_eq!(reply["id"], json!(6));
    assert_eq!(reply["error"]["code"], json!(INVALID_REQUEST));

    let reply = exchange(&server, r#"{"jsonrpc":"2.0","id":7,"method":"add","params":3}"#)
        .await
        .unwrap();
    assert_eq!(reply["error"]["code"], json!(INVALID_REQUEST));
}

#[tokio::test]
async fn typed_params_mismatch_is_invalid_params() {
    let (server, _) = demo_server(false);

    let reply = exchange(
        &server,
        r#"{"jsonrpc":"2.0","id":8,"method":"add","params":{"a":"one","b":2}}"#,
    )
    .await
    .unwrap();
    assert_eq!(reply["error"]["code"], json!(INVALID_PARAMS));
}

#[tokio::test]
async fn null_id_is_still_a_request() {
    let (server, log) = demo_server(false);

    let reply = exchange(
        &server,
        r#"{"jsonrpc":"2.0","id":null,"method":"record","params":["x"]}"#,
    )
    .await;
    assert_eq!(reply, Some(json!({"jsonrpc": "2.0", "id": null, "result": "x"})));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn notification_silence() {
    let (server, log) = demo_server(false);

    for body in [
        r#"{"jsonrpc":"2.0","method":"record","params":["a"]}"#,
        r#"{"jsonrpc":"2.0","method":"fail"}"#,
        r#"{"jsonrpc":"2.0","method":"no_such_method"}"#,
    ] {
        assert_eq!(exchange(&server, body).await, None, "reply to {}", body);
    }
    assert_eq!(*log.lock().unwrap(), vec![json!("a")]);
}

#[tokio::test]
async fn mixed_batch() {
    let (server, log) = demo_server(false);

    let reply = exchange(
        &server,
        r#"[
            {"jsonrpc":"2.0","id":1,"method":"fail"},
            {"jsonrpc":"2.0","method":"record","params":["note"]},
            {"jsonrpc":"2.0","id":2,"method":"add","params":{"a":1,"b":1}}
        ]"#,
    )
    .await
    .unwrap();

    assert_eq!(
        reply,
        json!([
            {
                "jsonrpc": "2.0",
                "id": 1,
                "error": {
                    "code": GENERIC_EXCEPTION,
                    "message": "Server error",
                    "data": {"type": "DemoFailure", "message": "the demo method always fails"}
                }
            },
            {"jsonrpc": "2.0", "id": 2, "result": 2}
        ])
    );
    assert_eq!(*log.lock().unwrap(), vec![json!("note")]);
}

#[tokio::test]
async fn batch_of_notifications_returns_nothing() {
    let (server, log) = demo_server(false);

    let reply = exchange(
        &server,
        r#"[
            {"jsonrpc":"2.0","method":"record","params":[1]},
            {"jsonrpc":"2.0","method":"record","params":[2]}
        ]"#,
    )
    .await;
    assert_eq!(reply, None);
    assert_eq!(*log.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn empty_batch_is_a_single_error() {
    let (server, _) = demo_server(false);

    let reply = exchange(&server, "[]").await.unwrap();
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(reply["error"]["code"], json!(INVALID_REQUEST));
}

#[tokio::test]
async fn invalid_items_do_not_abort_siblings() {
    let (server, _) = demo_server(false);

    let reply = exchange(&server, r#"[1, {}, {"jsonrpc":"2.0","id":9,"method":"ping"}]"#)
        .await
        .unwrap();
    let items = reply.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["error"]["code"], json!(INVALID_REQUEST));
    assert_eq!(items[1]["error"]["code"], json!(INVALID_REQUEST));
    assert_eq!(items[2]["result"], json!("pong"));
}

#[tokio::test]
async fn batch_order_preserved() {
    let (server, log) = demo_server(false);

    let calls: Vec<Value> = (1..=10)
        .map(|n| json!({"jsonrpc": "2.0", "id": n, "method": "record", "params": [n]}))
        .collect();
    let body = serde_json::to_string(&calls).unwrap();

    let reply = exchange(&server, &body).await.unwrap();
    let ids: Vec<Value> = reply
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].clone())
        .collect();
    let expected: Vec<Value> = (1..=10).map(|n| json!(n)).collect();
    assert_eq!(ids, expected);
    assert_eq!(*log.lock().unwrap(), expected);
}

#[tokio::test]
async fn cancelled_operation_reports_cancellation() {
    let server = JsonRpcServer::builder()
        .method(
            "stop",
            FunctionHandler::new(|_params, ctx: CallContext| async move {
                ctx.cancellation.cancel();
                Ok::<_, Failure>(Value::Null)
            }),
        )
        .build();

    let body = br#"[
        {"jsonrpc":"2.0","id":1,"method":"stop"},
        {"jsonrpc":"2.0","id":2,"method":"stop"}
    ]"#;
    let reply = server
        .process_inbound_with_cancellation(body, CancellationToken::new())
        .await
        .unwrap();
    let reply: Value = serde_json::from_slice(&reply).unwrap();

    assert_eq!(reply["id"], Value::Null);
    assert_eq!(reply["error"]["code"], json!(GENERIC_EXCEPTION));
    assert_eq!(reply["error"]["data"]["type"], json!("Cancelled"));
}

#[test]
fn id_round_trip() {
    for id in [
        RequestId::String("abc".into()),
        RequestId::Number(-7),
        RequestId::Null,
    ] {
        let wire = serde_json::to_string(&id).unwrap();
        let back: RequestId = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, id);
    }
}

#[test]
fn exactly_one_of_result_or_error() {
    assert!(matches!(
        JsonRpcMessage::from_parts(
            RequestId::Number(1),
            Some(json!(1)),
            Some(JsonRpcErrorObject::internal_error(None))
        ),
        Err(ProtocolError::AmbiguousResponse)
    ));
    assert!(matches!(
        JsonRpcMessage::from_parts(RequestId::Number(1), None, None),
        Err(ProtocolError::EmptyResponse)
    ));

    let error_only = br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
    assert!(ResponseWrapper::parse(error_only).is_ok());
}

#[test]
fn reserved_code_rejection() {
    assert_eq!(
        JsonRpcErrorObject::error(-32600, "x", None),
        Err(ErrorCodeRangeError::ReservedCode(-32600))
    );
    assert!(JsonRpcErrorObject::server_error(-32768, None).is_err());
    assert!(JsonRpcErrorObject::server_error(-32050, None).is_ok());
    assert!(JsonRpcErrorObject::error(42, "fine", None).is_ok());
}
