//! Scripted [`Transport`] for tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::client::{Method, api_error};
use crate::{ApiRequest, GithubResult, Transport};

#[derive(Debug, Clone)]
struct MockResponse {
    status: u16,
    body: String,
}

#[derive(Debug)]
struct Route {
    method: Method,
    url: String,
    responses: VecDeque<MockResponse>,
}

/// A transport that replays scripted responses and records every request.
///
/// Responses are matched on method and exact URL. Several responses for
/// the same route are returned in order; the last one repeats. Requests
/// without a scripted route receive a `404 Not Found`.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a response for `method url`.
    pub fn respond(
        &self,
        method: Method,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> &Self {
        let url = url.into();
        let response = MockResponse {
            status,
            body: body.into(),
        };

        let mut routes = lock(&self.routes);
        if let Some(route) = routes
            .iter_mut()
            .find(|route| route.method == method && route.url == url)
        {
            route.responses.push_back(response);
        } else {
            routes.push(Route {
                method,
                url,
                responses: VecDeque::from([response]),
            });
        }
        self
    }

    /// Scripts a `200 OK` JSON response for `method url`.
    pub fn respond_json(&self, method: Method, url: impl Into<String>, body: &Value) -> &Self {
        self.respond(method, url, 200, body.to_string())
    }

    /// Returns every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the requests received for `method url`.
    #[must_use]
    pub fn requests_to(&self, method: Method, url: &str) -> Vec<ApiRequest> {
        lock(&self.requests)
            .iter()
            .filter(|request| request.method == method && request.url == url)
            .cloned()
            .collect()
    }

    fn reply(&self, request: &ApiRequest) -> GithubResult<String> {
        let response = {
            let mut routes = lock(&self.routes);
            routes
                .iter_mut()
                .find(|route| route.method == request.method && route.url == request.url)
                .and_then(|route| {
                    if route.responses.len() > 1 {
                        route.responses.pop_front()
                    } else {
                        route.responses.front().cloned()
                    }
                })
        };

        match response {
            Some(MockResponse { status, body }) if (200..300).contains(&status) => Ok(body),
            Some(MockResponse { status, body }) => Err(api_error(request, status, &body)),
            None => Err(api_error(request, 404, r#"{"message":"Not Found"}"#)),
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = GithubResult<String>> + Send {
        let result = self.reply(&request);
        lock(&self.requests).push(request);
        std::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GithubError;

    #[tokio::test]
    async fn test_unscripted_route_is_not_found() {
        let transport = MockTransport::new();
        let result = transport
            .send(ApiRequest::new(Method::Get, "https://api.github.com/nope"))
            .await;
        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_responses_are_replayed_in_order() {
        let transport = MockTransport::new();
        transport
            .respond(Method::Get, "https://x/a", 200, "first")
            .respond(Method::Get, "https://x/a", 500, "{}");

        let first = transport
            .send(ApiRequest::new(Method::Get, "https://x/a"))
            .await;
        let second = transport
            .send(ApiRequest::new(Method::Get, "https://x/a"))
            .await;
        let third = transport
            .send(ApiRequest::new(Method::Get, "https://x/a"))
            .await;

        assert_eq!(first.unwrap(), "first");
        assert!(matches!(second, Err(GithubError::Api { status: 500, .. })));
        assert!(matches!(third, Err(GithubError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_routes_match_on_method() {
        let transport = MockTransport::new();
        transport.respond(Method::Post, "https://x/a", 201, "created");

        let get = transport
            .send(ApiRequest::new(Method::Get, "https://x/a"))
            .await;
        assert_eq!(get.unwrap_err().status(), Some(404));
        assert_eq!(transport.requests_to(Method::Get, "https://x/a").len(), 1);
        assert!(transport.requests_to(Method::Post, "https://x/a").is_empty());
    }
}
