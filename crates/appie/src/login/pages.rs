// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTML pages served by the login capture server.

const LOGIN_TEMPLATE: &str = include_str!("../../web/login.html");

/// Shown after a code has been captured.
pub const SUCCESS_PAGE: &str = include_str!("../../web/success.html");

/// Render the instruction page with the remote login link and the local
/// callback endpoint the page's form submits to.
pub fn render_login_page(login_url: &str, callback_url: &str) -> String {
    LOGIN_TEMPLATE
        .replace("{{login_url}}", &escape_html(login_url))
        .replace("{{callback_url}}", &escape_html(callback_url))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "pages_tests.rs"]
mod tests;
