//! Scripted transport for client tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use super::transport::{Query, Transport};
use crate::protocol::HttpResponse;

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
pub struct MockTransport {
    replies: RefCell<VecDeque<Result<HttpResponse, String>>>,
    pub requests: RefCell<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, body: Value) -> &Self {
        self.replies.borrow_mut().push_back(Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        }));
        self
    }

    pub fn reply_status(&self, status: u16) -> &Self {
        self.replies.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: String::new(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.replies.borrow_mut().push_back(Err(message.to_string()));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last(&self) -> Recorded {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    fn record(&self, method: &'static str, query: &Query<'_>, body: Option<String>) -> Result<HttpResponse, String> {
        self.requests.borrow_mut().push(Recorded {
            method,
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            body: body.map(|raw| serde_json::from_str(&raw).expect("request body is JSON")),
        });
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()))
    }
}

impl Transport for MockTransport {
    async fn post(&self, _url: &str, query: &Query<'_>, body: String) -> Result<HttpResponse, String> {
        self.record("POST", query, Some(body))
    }

    async fn get(&self, _url: &str, query: &Query<'_>) -> Result<HttpResponse, String> {
        self.record("GET", query, None)
    }

    fn now_millis(&self) -> u64 {
        1_700_000_000_000
    }
}
