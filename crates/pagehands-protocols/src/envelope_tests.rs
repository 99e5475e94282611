use super::*;
use serde_json::json;

#[test]
fn test_request_wire_format() {
    let env = Envelope::request(
        "getSettings",
        json!({}),
        "c-1",
        ContextAddress::mediator(4),
    );
    let value = serde_json::to_value(Message::Request(env)).unwrap();

    assert_eq!(value["type"], "request");
    assert_eq!(value["action"], "getSettings");
    assert_eq!(value["correlationId"], "c-1");
    assert_eq!(value["originContext"]["kind"], "mediator");
    assert_eq!(value["originContext"]["tab"], 4);
}

#[test]
fn test_notification_has_no_correlation_id() {
    let env = Envelope::notification("contentScriptReady", json!(null), ContextAddress::mediator(1));
    assert!(!env.expects_response());

    let json = serde_json::to_string(&env).unwrap();
    assert!(!json.contains("correlationId"));
}

#[test]
fn test_response_ok_wire_format() {
    let resp = ResponseEnvelope::ok("c-9", json!({"count": 3}));
    let value = serde_json::to_value(Message::Response(resp)).unwrap();

    assert_eq!(value["type"], "response");
    assert_eq!(value["correlationId"], "c-9");
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["count"], 3);
    assert!(value.get("error").is_none());
}

#[test]
fn test_response_err_is_never_empty() {
    let resp = ResponseEnvelope::err("c-2", "");
    assert!(!resp.success);
    assert!(!resp.error.unwrap().is_empty());
}

#[test]
fn test_message_parse_from_host_json() {
    let raw = r#"{"type":"request","action":"capability:getPageStats","correlationId":"x",
                  "originContext":{"kind":"mediator","tab":2}}"#;
    let msg: Message = serde_json::from_str(raw).unwrap();
    match msg {
        Message::Request(env) => {
            assert_eq!(env.action, "capability:getPageStats");
            assert_eq!(env.payload, Value::Null);
            assert_eq!(env.origin_context, ContextAddress::mediator(2));
        }
        Message::Response(_) => panic!("expected request"),
    }
}

#[test]
fn test_message_correlation_id() {
    let req = Message::Request(Envelope::notification("a", json!(1), ContextAddress::popup()));
    assert_eq!(req.correlation_id(), None);

    let resp = Message::Response(ResponseEnvelope::ok("abc", json!(true)));
    assert_eq!(resp.correlation_id(), Some("abc"));
}
