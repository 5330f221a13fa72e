use std::collections::HashSet;
use std::io::Cursor;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use murmur::node::run;
use murmur::settings::Settings;

/// Feed `input` lines to a node and collect every line it writes
async fn run_node(settings: Settings, input: Vec<Value>) -> Vec<Value> {
    let mut text = String::new();
    for line in input {
        text.push_str(&line.to_string());
        text.push('\n');
    }

    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let node = tokio::spawn(run(settings, Cursor::new(text.into_bytes()), server));

    let mut output = String::new();
    tokio::time::timeout(Duration::from_secs(5), client.read_to_string(&mut output))
        .await
        .expect("node finished in time")
        .expect("readable output");
    node.await.unwrap().expect("clean shutdown");

    output
        .lines()
        .map(|line| serde_json::from_str(line).expect("every output line is JSON"))
        .collect()
}

fn init(node: &str, nodes: &[&str]) -> Value {
    json!({"src": "c0", "dest": node, "body": {"type": "init", "msg_id": 1, "node_id": node, "node_ids": nodes}})
}

fn replies_to<'a>(output: &'a [Value], client: &str) -> Vec<&'a Value> {
    output.iter().filter(|m| m["dest"] == client).collect()
}

#[tokio::test]
async fn test_init_then_echo() {
    let output = run_node(
        Settings::default(),
        vec![
            init("n1", &["n1"]),
            json!({"src": "c1", "dest": "n1", "body": {"type": "echo", "msg_id": 2, "echo": "please echo 35"}}),
        ],
    )
    .await;

    assert_eq!(output.len(), 2);
    let init_ok = &replies_to(&output, "c0")[0];
    assert_eq!(init_ok["body"]["type"], "init_ok");
    assert_eq!(init_ok["body"]["in_reply_to"], 1);

    let echo_ok = &replies_to(&output, "c1")[0];
    assert_eq!(echo_ok["src"], "n1");
    assert_eq!(echo_ok["body"]["type"], "echo_ok");
    assert_eq!(echo_ok["body"]["echo"], "please echo 35");
    assert_eq!(echo_ok["body"]["in_reply_to"], 2);
    assert!(echo_ok["body"]["msg_id"].is_u64());
}

#[tokio::test]
async fn test_request_before_init_is_refused() {
    let output = run_node(
        Settings::default(),
        vec![json!({"src": "c1", "dest": "n1", "body": {"type": "read", "msg_id": 1}})],
    )
    .await;

    assert_eq!(output.len(), 1);
    assert_eq!(output[0]["body"]["type"], "error");
    assert_eq!(output[0]["body"]["code"], 11);
}

#[tokio::test]
async fn test_broadcast_fans_out_over_stdout() {
    let output = run_node(
        Settings::default(),
        vec![
            init("n1", &["n1", "n2", "n3"]),
            json!({"src": "c1", "dest": "n1", "body": {"type": "broadcast", "msg_id": 2, "message": 42}}),
            json!({"src": "n2", "dest": "n1", "body": {"type": "broadcast_ok", "in_reply_to": 1}}),
        ],
    )
    .await;

    let gossip: HashSet<String> = output
        .iter()
        .filter(|m| m["body"]["type"] == "broadcast")
        .map(|m| {
            assert_eq!(m["src"], "n1");
            assert_eq!(m["body"]["message"], 42);
            m["dest"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(gossip, HashSet::from(["n2".to_string(), "n3".to_string()]));

    let acks = replies_to(&output, "c1");
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0]["body"]["type"], "broadcast_ok");

    // the peer's ack is absorbed, never answered
    assert!(output
        .iter()
        .all(|m| !(m["dest"] == "n2" && m["body"]["type"] == "error")));
}

#[tokio::test]
async fn test_garbage_lines_are_skipped() {
    let (mut client, server) = tokio::io::duplex(16 * 1024);
    let input = format!(
        "this is not json\n{}\n",
        json!({"src": "c0", "dest": "n1", "body": {"type": "init", "msg_id": 1, "node_id": "n1", "node_ids": ["n1"]}})
    );
    let node = tokio::spawn(run(Settings::default(), Cursor::new(input.into_bytes()), server));

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    node.await.unwrap().unwrap();

    assert_eq!(output.lines().count(), 1);
    assert!(output.contains("init_ok"));
}

#[tokio::test]
async fn test_node_survives_non_utf8_input() {
    let (mut client, server) = tokio::io::duplex(16 * 1024);
    let mut input = format!("{}\n", init("n1", &["n1"])).into_bytes();
    input.extend_from_slice(b"\xff\xfe\n");
    input.extend_from_slice(
        format!(
            "{}\n",
            json!({"src": "c1", "dest": "n1", "body": {"type": "read", "msg_id": 2}})
        )
        .as_bytes(),
    );
    let node = tokio::spawn(run(Settings::default(), Cursor::new(input), server));

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    node.await.unwrap().expect("bad bytes do not stop the node");

    let output: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let read_ok = &replies_to(&output, "c1")[0];
    assert_eq!(read_ok["body"]["type"], "read_ok");
    assert_eq!(read_ok["body"]["in_reply_to"], 2);
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let settings = Settings {
        outbound_buffer: 0,
        ..Settings::default()
    };
    let (_client, server) = tokio::io::duplex(1024);
    let err = run(settings, Cursor::new(Vec::new()), server)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("outbound buffer"));
}
