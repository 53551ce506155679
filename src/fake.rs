//! In-process HTTP stand-ins for the embedding and completion endpoints.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use serde_json::Value;
use warp::{
    http::{HeaderMap, StatusCode},
    hyper::body::Bytes,
    path::FullPath,
    Filter,
};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Value,
}

impl RecordedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    }
}

/// Answers every POST with `respond(body)` and records what it received.
pub(crate) struct FakeService {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeService {
    pub(crate) fn start<F>(respond: F) -> Self
    where
        F: Fn(&Value) -> (StatusCode, String) + Clone + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let route = warp::post()
            .and(warp::path::full())
            .and(
                warp::query::raw()
                    .or(warp::any().map(String::new))
                    .unify(),
            )
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .map(
                move |path: FullPath, query: String, headers: HeaderMap, bytes: Bytes| {
                    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                    let (status, reply) = respond(&body);
                    recorded.lock().unwrap().push(RecordedRequest {
                        path: path.as_str().to_string(),
                        query,
                        headers,
                        body,
                    });
                    warp::reply::with_status(
                        warp::reply::with_header(reply, "content-type", "application/json"),
                        status,
                    )
                },
            );

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, requests }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Completion endpoint that answers with the user message it was sent.
pub(crate) fn echo_completion() -> FakeService {
    FakeService::start(|body| {
        let content = body["messages"][0]["content"].clone();
        let reply = serde_json::json!({
            "id": "chatcmpl-fake",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": content },
            }],
        });
        (StatusCode::OK, reply.to_string())
    })
}
