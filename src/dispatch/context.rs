//! Per-request state shared by middleware and handlers.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::dispatch::{Rejection, Request};
use crate::middleware::Flow;
use crate::routing::{RouteNameRegistry, UrlBase};

/// Positional path parameters, the request, and the response being built.
///
/// Middleware and handlers set the status, add headers and write output
/// here; the dispatcher turns it into the final [`Response`](crate::dispatch::Response).
#[derive(Debug)]
pub struct RequestContext<'r> {
    params: Vec<String>,
    request: &'r Request,
    urls: Option<(&'r RouteNameRegistry, UrlBase)>,
    status: Option<StatusCode>,
    headers: HeaderMap,
    output: String,
}

impl<'r> RequestContext<'r> {
    pub fn new(request: &'r Request, params: Vec<String>) -> Self {
        Self {
            params,
            request,
            urls: None,
            status: None,
            headers: HeaderMap::new(),
            output: String::new(),
        }
    }

    /// Enable [`url`](Self::url) for this request.
    pub fn with_urls(mut self, names: &'r RouteNameRegistry, base: UrlBase) -> Self {
        self.urls = Some((names, base));
        self
    }

    /// Captured path parameters, left to right.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    pub fn request(&self) -> &'r Request {
        self.request
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append to the response body.
    pub fn write(&mut self, text: impl AsRef<str>) {
        self.output.push_str(text.as_ref());
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Write `rejection` as the response and stop the middleware chain.
    pub fn reject(&mut self, rejection: Rejection) -> Flow {
        self.set_status(rejection.status());
        self.write(rejection.to_string());
        Flow::Halt
    }

    /// URL of the named route, built against this request's host.
    pub fn url<S: AsRef<str>>(&self, name: &str, params: &[S]) -> Option<String> {
        let (names, base) = self.urls.as_ref()?;
        names.build(name, params, base)
    }

    pub(crate) fn into_parts(self) -> (Option<StatusCode>, HeaderMap, String) {
        (self.status, self.headers, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HttpMethod;

    #[test]
    fn test_reject_writes_status_and_message() {
        let request = Request::new("GET", "/admin");
        let mut ctx = RequestContext::new(&request, Vec::new());
        let flow = ctx.reject(Rejection::Unauthorized {
            message: "Unauthorized access!".into(),
        });
        assert_eq!(flow, Flow::Halt);
        assert_eq!(ctx.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(ctx.output(), "Unauthorized access!");
    }

    #[test]
    fn test_url_requires_registry() {
        let request = Request::new("GET", "/");
        let mut names = RouteNameRegistry::new();
        names.define("profile.show", HttpMethod::Get, "/profile/{id}");

        let ctx = RequestContext::new(&request, Vec::new());
        assert_eq!(ctx.url("profile.show", &["7"]), None);

        let ctx = RequestContext::new(&request, Vec::new()).with_urls(&names, UrlBase::default());
        assert_eq!(ctx.url("profile.show", &["7"]).as_deref(), Some("http://localhost/profile/7"));
    }
}
