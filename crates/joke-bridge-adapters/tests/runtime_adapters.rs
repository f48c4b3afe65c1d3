use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::{Address, Bytes, U256};
use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use joke_bridge_adapters::{
    CommandNotifier, Eip1193Adapter, JokeApiAdapter, JokeBridgeConfig, RuntimeProfile,
};
use joke_bridge_core::{
    CallRequest, JokeSourcePort, NotifierPort, PortError, ProviderPort, OP_SEPOLIA_CHAIN_ID,
};

fn account() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("account")
}

#[tokio::test]
async fn eip1193_proxy_runtime_maps_wallet_errors() {
    let calls = Arc::new(Mutex::new(Vec::<String>::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));

    let cfg = JokeBridgeConfig {
        eip1193_proxy_url: Some(format!("{base_url}/rpc")),
        ..JokeBridgeConfig::default()
    };
    let adapter = Eip1193Adapter::with_config(cfg);
    assert_eq!(adapter.mode_label(), "proxy");

    adapter.detect().await.expect("detect");
    assert_eq!(
        adapter.request_accounts().await.expect("accounts"),
        vec![account()]
    );
    assert_eq!(adapter.chain_id().await.expect("chain"), OP_SEPOLIA_CHAIN_ID);

    let tx = CallRequest {
        from: account(),
        to: Address::ZERO,
        value: U256::from(1u64),
        data: Bytes::new(),
    };
    assert_eq!(
        adapter.send_transaction(&tx).await.expect_err("rejected"),
        PortError::UserRejected
    );
    assert_eq!(
        adapter.switch_chain(10).await.expect_err("unknown chain"),
        PortError::UnrecognizedChain(10)
    );
    assert!(matches!(
        adapter.call(&tx).await.expect_err("reverted"),
        PortError::Rpc { code: -32000, .. }
    ));

    let calls = calls.lock().expect("calls lock");
    assert!(calls.iter().any(|c| c.contains("eth_sendTransaction")));
    assert!(calls.iter().any(|c| c.contains("wallet_switchEthereumChain")));
}

#[tokio::test]
async fn notifier_http_runtime_posts_shell_command() {
    let calls = Arc::new(Mutex::new(Vec::<String>::new()));
    let (base_url, _join) = spawn_mock_server(Arc::clone(&calls));

    let cfg = JokeBridgeConfig {
        notify_url: Some(format!("{base_url}/execute-command")),
        ..JokeBridgeConfig::default()
    };
    let notifier = CommandNotifier::with_config(&cfg);
    notifier.notify("setup___punch").await.expect("notify");

    let calls = calls.lock().expect("calls lock");
    let posted = calls
        .iter()
        .find(|c| c.starts_with("/execute-command"))
        .expect("notify call");
    let body: Value = serde_json::from_str(
        posted
            .split_once(' ')
            .map(|(_, body)| body)
            .expect("body"),
    )
    .expect("json body");
    assert_eq!(body["command"], "just send-nft-info \"setup___punch\"");
    assert_eq!(
        notifier.sent_commands().expect("sent"),
        vec!["just send-nft-info \"setup___punch\"".to_owned()]
    );
}

#[tokio::test]
async fn notifier_reports_non_success_status() {
    let calls = Arc::new(Mutex::new(Vec::<String>::new()));
    let (base_url, _join) = spawn_mock_server(calls);

    let cfg = JokeBridgeConfig {
        notify_url: Some(format!("{base_url}/missing")),
        ..JokeBridgeConfig::default()
    };
    let notifier = CommandNotifier::with_config(&cfg);
    let err = notifier.notify("a___b").await.expect_err("404");
    assert!(matches!(err, PortError::Transport(_)));
    assert!(notifier.sent_commands().expect("sent").is_empty());
}

#[tokio::test]
async fn joke_api_runtime_fetches_and_validates() {
    let calls = Arc::new(Mutex::new(Vec::<String>::new()));
    let (base_url, _join) = spawn_mock_server(calls);

    let ok = JokeApiAdapter::with_config(&JokeBridgeConfig {
        joke_api_url: Some(format!("{base_url}/random_joke")),
        ..JokeBridgeConfig::default()
    });
    let joke = ok.fetch_joke().await.expect("joke");
    assert_eq!(joke.setup, "Why did the function return early?");
    assert_eq!(joke.punchline, "It had a bad case of the exceptions.");

    let incomplete = JokeApiAdapter::with_config(&JokeBridgeConfig {
        joke_api_url: Some(format!("{base_url}/half_joke")),
        ..JokeBridgeConfig::default()
    });
    assert!(matches!(
        incomplete.fetch_joke().await.expect_err("incomplete"),
        PortError::Validation(_)
    ));

    let broken = JokeApiAdapter::with_config(&JokeBridgeConfig {
        joke_api_url: Some(format!("{base_url}/broken_joke")),
        ..JokeBridgeConfig::default()
    });
    assert!(matches!(
        broken.fetch_joke().await.expect_err("server error"),
        PortError::Transport(_)
    ));
}

#[tokio::test]
async fn production_profile_requires_every_runtime() {
    let cfg = JokeBridgeConfig {
        runtime_profile: RuntimeProfile::Production,
        eip1193_proxy_url: None,
        joke_api_url: None,
        notify_url: None,
        ..JokeBridgeConfig::default()
    };

    let provider = Eip1193Adapter::with_config(cfg.clone());
    assert!(matches!(
        provider.detect().await.expect_err("no provider"),
        PortError::NotFound(_)
    ));
    assert!(matches!(
        provider.request_accounts().await.expect_err("disabled"),
        PortError::Policy(_)
    ));

    let notifier = CommandNotifier::with_config(&cfg);
    assert!(matches!(
        notifier.notify("a___b").await.expect_err("disabled"),
        PortError::Policy(_)
    ));

    let jokes = JokeApiAdapter::with_config(&cfg);
    assert!(matches!(
        jokes.fetch_joke().await.expect_err("disabled"),
        PortError::Policy(_)
    ));
}

#[tokio::test]
async fn development_profile_falls_back_to_builtin_jokes() {
    let jokes = JokeApiAdapter::with_config(&JokeBridgeConfig {
        joke_api_url: None,
        ..JokeBridgeConfig::default()
    });
    let first = jokes.fetch_joke().await.expect("first");
    let second = jokes.fetch_joke().await.expect("second");
    assert!(first.is_complete());
    assert_ne!(first, second);
}

fn rpc_response(request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(json!(1));
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match method {
        "eth_requestAccounts" => json!({"jsonrpc": "2.0", "id": id, "result": [account().to_string()]}),
        "eth_chainId" => json!({"jsonrpc": "2.0", "id": id, "result": "0xaa37dc"}),
        "eth_sendTransaction" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": 4001, "message": "User rejected the request."}
        }),
        "wallet_switchEthereumChain" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": 4902, "message": "Unrecognized chain ID"}
        }),
        "eth_getTransactionReceipt" => json!({"jsonrpc": "2.0", "id": id, "result": null}),
        _ => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32000, "message": "execution reverted"}
        }),
    }
}

fn spawn_mock_server(
    calls: Arc<Mutex<Vec<String>>>,
) -> (String, thread::JoinHandle<Result<(), PortError>>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    let join = thread::spawn(move || {
        for _ in 0..16 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let method = req.method().clone();
            let path = req.url().to_owned();
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

            let (code, payload) = match (method, path.as_str()) {
                (Method::Post, "/rpc") => {
                    let method = parsed
                        .get("method")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if let Ok(mut g) = calls.lock() {
                        g.push(format!("/rpc {method}"));
                    }
                    (200, rpc_response(&parsed))
                }
                (Method::Post, "/execute-command") => {
                    if let Ok(mut g) = calls.lock() {
                        g.push(format!("/execute-command {body}"));
                    }
                    (200, json!({"ok": true}))
                }
                (Method::Get, "/random_joke") => (
                    200,
                    json!({
                        "type": "programming",
                        "setup": "Why did the function return early?",
                        "punchline": "It had a bad case of the exceptions.",
                        "id": 7
                    }),
                ),
                (Method::Get, "/half_joke") => (
                    200,
                    json!({"type": "general", "setup": "Knock knock.", "punchline": "", "id": 8}),
                ),
                (Method::Get, "/broken_joke") => (500, json!({"error": "upstream down"})),
                _ => (404, json!({"error": "not found"})),
            };

            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
        Ok(())
    });

    (addr, join)
}
