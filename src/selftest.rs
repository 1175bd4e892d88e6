//! Route smoke tests.
//!
//! # Responsibilities
//! - Replay every registered route with a fixed value in each placeholder
//! - Classify each run by its output and render the results
//!
//! # Design Decisions
//! - PASS means the output contains neither `404` nor `500`; a handler that
//!   legitimately prints `404` is reported as FAIL
//! - A 500-class dispatch error is a FAIL whose output is the error message
//! - Api routes are replayed against the api space only

use std::fmt;

use serde::Serialize;

use crate::dispatch::Request;
use crate::routing::{HttpMethod, Route, RouteSpace, Router};

/// Outcome of one replayed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Verdict::Pass => "✅",
            Verdict::Fail => "❌",
        }
    }
}

/// One row of the report.
#[derive(Debug, Clone, Serialize)]
pub struct SelfTestResult {
    pub result: Verdict,
    pub method: HttpMethod,
    pub space: RouteSpace,
    /// Registered pattern.
    pub route: String,
    /// Path that was actually requested.
    pub test_path: String,
    pub output: String,
}

impl SelfTestResult {
    /// `GET`, or `GET (API)` for api routes.
    pub fn method_label(&self) -> String {
        match self.space {
            RouteSpace::Standard => self.method.to_string(),
            RouteSpace::Api => format!("{} (API)", self.method),
        }
    }

    pub fn passed(&self) -> bool {
        self.result == Verdict::Pass
    }
}

/// All rows, in route iteration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelfTestReport {
    pub results: Vec<SelfTestResult>,
}

impl SelfTestReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// The report as a standalone HTML table.
    pub fn render_html(&self) -> String {
        let mut html = String::from(
            "<h1 style=\"text-align:center;font-family:sans-serif\">Route Test Results</h1>\n\
             <table border=\"1\" cellpadding=\"6\" style=\"border-collapse:collapse;margin:20px auto;min-width:700px\">\n\
             <thead><tr><th>Result</th><th>Method</th><th>Test Path</th><th>Route</th><th>Output</th></tr></thead>\n<tbody>\n",
        );
        for row in &self.results {
            let background = if row.passed() { "#eaffea" } else { "#ffeaea" };
            html.push_str(&format!(
                "<tr style=\"background:{background}\"><td style=\"text-align:center\">{} {}</td><td>{}</td><td>{}</td><td>{}</td><td><pre style=\"margin:0;font-size:13px\">{}</pre></td></tr>\n",
                row.result.icon(),
                row.result.as_str(),
                html_escape::encode_text(&row.method_label()),
                html_escape::encode_text(&row.test_path),
                html_escape::encode_text(&row.route),
                html_escape::encode_text(&row.output),
            ));
        }
        html.push_str("</tbody></table>\n");
        html
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<6} {:<16} {:<32} {:<32} OUTPUT", "RESULT", "METHOD", "TEST PATH", "ROUTE")?;
        for row in &self.results {
            let output = row.output.lines().next().unwrap_or_default();
            writeln!(
                f,
                "{:<6} {:<16} {:<32} {:<32} {}",
                row.result.as_str(),
                row.method_label(),
                row.test_path,
                row.route,
                output
            )?;
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}

/// Replays the routes of one router.
#[derive(Debug)]
pub struct SelfTestRunner<'a> {
    router: &'a Router,
    value: String,
}

impl<'a> SelfTestRunner<'a> {
    pub fn new(router: &'a Router, value: impl Into<String>) -> Self {
        Self {
            router,
            value: value.into(),
        }
    }

    pub fn run(&self) -> SelfTestReport {
        let results: Vec<_> = self.router.routes().map(|route| self.replay(route)).collect();
        let report = SelfTestReport { results };
        tracing::info!(passed = report.passed(), failed = report.failed(), "Self-test finished");
        report
    }

    fn replay(&self, route: &Route) -> SelfTestResult {
        let test_path = route.pattern.fill(&self.value);
        let request = Request::new(route.method.as_str(), test_path.clone());

        let (result, output) = match self.router.dispatcher().dispatch_space(route.space, &request) {
            Ok(response) => {
                let pass = !response.body.contains("404") && !response.body.contains("500");
                let verdict = if pass { Verdict::Pass } else { Verdict::Fail };
                (verdict, response.body)
            }
            Err(e) => (Verdict::Fail, e.to_string()),
        };

        if result == Verdict::Fail {
            tracing::warn!(method = %route.method, space = %route.space, route = %route.path(), "Self-test failed");
        }

        SelfTestResult {
            result,
            method: route.method,
            space: route.space,
            route: route.path().to_string(),
            test_path,
            output,
        }
    }
}
