//! Demo controller.

use std::sync::Arc;

use serde_json::json;

use crate::dispatch::{Reply, RequestContext};
use crate::error::ResolveError;
use crate::handler::{Controller, Injectable, Resolver};

/// Site-wide values shared by controllers.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub name: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Craft".to_string(),
        }
    }
}

pub struct HomeController {
    site: Arc<SiteInfo>,
}

impl Injectable for HomeController {
    fn construct(resolver: &Resolver<'_>) -> Result<Self, ResolveError> {
        Ok(Self {
            site: resolver.resolve::<SiteInfo>()?,
        })
    }
}

impl Controller for HomeController {
    const NAME: &'static str = "HomeController";

    fn call_action(&self, action: &str, ctx: &mut RequestContext<'_>) -> Option<Reply> {
        let reply: Reply = match action {
            "index" => self.index(ctx),
            "about" => format!("<h1>About {}</h1>", self.site.name).into(),
            "profile" => self.profile(ctx),
            "update" => json!({"updated": true}).into(),
            _ => return None,
        };
        Some(reply)
    }
}

impl HomeController {
    fn index(&self, ctx: &mut RequestContext<'_>) -> Reply {
        let hello = ctx.url("hello", &["world"]).unwrap_or_default();
        format!(
            "<h1>Welcome to {}</h1>\n<p><a href=\"{}\">Say hello</a></p>",
            html_escape::encode_text(&self.site.name),
            html_escape::encode_double_quoted_attribute(&hello),
        )
        .into()
    }

    fn profile(&self, ctx: &mut RequestContext<'_>) -> Reply {
        let user = ctx
            .request()
            .header("x-user")
            .unwrap_or("member")
            .to_string();
        format!("<h1>Profile of {}</h1>", html_escape::encode_text(&user)).into()
    }
}
