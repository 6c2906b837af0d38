#![allow(dead_code)]

use async_trait::async_trait;
use dominion_energy::config::Config;
use dominion_energy::error::{DominionError, Result};
use dominion_energy::http::{HttpRequest, HttpResponse, Transport};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, String),
    Fail(String),
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Reply::Respond(200, body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply::Respond(status, body.to_string())
    }
}

/// Transport answering by URL path; the last reply for a path repeats
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, VecDeque<Reply>)>>,
    requests: Mutex<Vec<HttpRequest>>,
    closed: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, reply: Reply) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|(p, _)| p == path) {
                Some((_, queue)) => queue.push_back(reply),
                None => routes.push((path.to_string(), VecDeque::from([reply]))),
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(path))
            .collect()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let queue = routes
                .iter_mut()
                .find(|(path, _)| url.ends_with(path.as_str()))
                .map(|(_, queue)| queue);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Respond(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Fail(message)) => Err(DominionError::network(message)),
            None => Ok(HttpResponse::new(404, "")),
        }
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.account.username = "user@example.com".to_string();
    config.account.password = "hunter2".to_string();
    config.account.account_number = "1234567890".to_string();
    config
}

/// Data envelope with a success status
pub fn envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "status": {"code": 200, "message": "OK"},
        "data": data,
    })
}
