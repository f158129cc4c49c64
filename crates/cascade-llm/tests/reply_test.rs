use cascade_llm::{ChatMessage, ModelReply, ToolCall};
use serde_json::json;

#[test]
fn reply_union_serializes_tagged() {
    let answer = ModelReply::answer("done");
    let v = serde_json::to_value(&answer).unwrap();
    assert_eq!(v["type"], "answer");
    assert_eq!(v["text"], "done");

    let tool_use = ModelReply::tool_use(
        "",
        vec![ToolCall::new("divide_numbers", json!({"a": 100, "b": 0}))],
    );
    let v = serde_json::to_value(&tool_use).unwrap();
    assert_eq!(v["type"], "tool_use");
    assert_eq!(v["requested_calls"][0]["name"], "divide_numbers");
}

#[test]
fn has_tool_calls_ignores_empty_list() {
    let reply = ModelReply::tool_use("text", vec![]);
    assert!(!reply.has_tool_calls());
    assert!(reply.requested_calls().is_empty());

    let reply = ModelReply::answer("text");
    assert!(!reply.has_tool_calls());
}

#[test]
fn tool_call_arguments_parse_into_struct() {
    #[derive(serde::Deserialize)]
    struct Args {
        a: i64,
        b: i64,
    }

    let call = ToolCall::new("add_numbers", json!({"a": 25, "b": 37}));
    let args: Args = call.parse_arguments().unwrap();
    assert_eq!(args.a, 25);
    assert_eq!(args.b, 37);
}

#[test]
fn chat_message_roles() {
    assert_eq!(ChatMessage::system("s").role(), "system");
    assert_eq!(ChatMessage::human("h").role(), "user");
    assert_eq!(ChatMessage::ai("a").role(), "assistant");
    assert_eq!(ChatMessage::tool_result("call_1", "62").role(), "tool");
}
