// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use reqwest::Url;

/// Normalize user input into a bare authorization code.
///
/// Accepts a bare code or any URL carrying a `code` query parameter, such as
/// `appie://login-exit?code=XYZ&state=1`.
pub fn extract_code(input: &str) -> String {
    let input = input.trim();
    if !input.contains("code=") {
        return input.to_owned();
    }

    if let Ok(url) = Url::parse(input) {
        let code = url.query_pairs().find(|(k, _)| k == "code").map(|(_, v)| v.into_owned());
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            return code;
        }
    }

    match input.split_once("code=") {
        Some((_, rest)) => rest.split('&').next().unwrap_or_default().to_owned(),
        None => input.to_owned(),
    }
}

#[cfg(test)]
#[path = "code_tests.rs"]
mod tests;
