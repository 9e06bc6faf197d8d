//! Shared test transport

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use bowerhub::{Transport, TransportError, TransportResponse};

struct Route {
    effective_url: String,
    body: Vec<u8>,
}

/// Serves canned bodies by URL; unknown URLs answer 404
#[derive(Default)]
pub struct FakeGithub {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl FakeGithub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, url: &str, body: &str) -> Self {
        self.redirect(url, url, body)
    }

    pub fn redirect(mut self, url: &str, effective_url: &str, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Route {
                effective_url: effective_url.to_string(),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeGithub {
    fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let route = self.routes.get(url).ok_or_else(|| TransportError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        Ok(TransportResponse::new(
            route.effective_url.clone(),
            Box::new(Cursor::new(route.body.clone())),
        ))
    }
}

pub fn tags_url(path: &str) -> String {
    format!("https://api.github.com/repos/{}/tags?per_page=100&page=1", path)
}
