//! In-memory transport for exercising the client without a network

use crate::transport::{HttpResponse, Transport};
use crate::{Error, Result};
use reqwest::Url;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

struct Route {
    pattern: String,
    replies: VecDeque<Scripted>,
}

/// Replies to requests whose URL contains a registered pattern.
///
/// Routes are matched in registration order. Each route pops its replies
/// in order and repeats the last one once the queue is down to one entry.
/// Unmatched requests get a Jira-style 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, pattern: &str, response: HttpResponse) -> Self {
        self.push(pattern, Scripted::Respond(response))
    }

    pub fn fail(self, pattern: &str, message: &str) -> Self {
        self.push(pattern, Scripted::Fail(message.to_string()))
    }

    /// Hold every reply for `delay` before returning it
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(self, pattern: &str, reply: Scripted) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            match routes.iter_mut().find(|r| r.pattern == pattern) {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(Route {
                    pattern: pattern.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    fn next_reply(&self, url: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().ok()?;
        let route = routes.iter_mut().find(|r| url.contains(&r.pattern))?;
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse> {
        let url = url.to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.clone());
        }

        let reply = self.next_reply(&url);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(Error::Transport(message)),
            None => Ok(HttpResponse::new(404, r#"{"errorMessages":["Issue does not exist"]}"#)
                .with_content_type("application/json")),
        }
    }
}
