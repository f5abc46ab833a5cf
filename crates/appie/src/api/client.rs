// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API client for the Albert Heijn mobile services.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::graphql::{
    self, GraphQlRequest, GraphQlResponse, MemberData, PreviouslyBought, PreviouslyBoughtData,
    Recipe, RecipeData, RecipeSearch, RecipeSearchData,
};
use super::models::{
    AnonymousGrant, CodeGrant, ListItem, ListItemBody, ListItemsBody, OrderItem, OrderItemsBody,
    RefreshGrant, TokenResponse,
};
use super::ApiError;
use crate::credential::{epoch_secs, Credentials};

/// OAuth client identifier of the mobile app.
pub const CLIENT_ID: &str = "appie";

/// Redirect target registered for [`CLIENT_ID`]; not reachable from a browser.
pub const REDIRECT_URI: &str = "appie://login-exit";

const CLIENT_NAME: &str = "appie-ios";
const CLIENT_VERSION: &str = "8.22.3";
const APPLICATION: &str = "AHWEBSHOP";

/// API client holding an optional bearer token.
///
/// Clone is cheap: `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    login_base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, login_base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        crate::ensure_crypto();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("Appie/{CLIENT_VERSION}"))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            login_base_url: login_base_url.trim_end_matches('/').to_owned(),
            token: None,
        })
    }

    /// A copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), ..self.clone() }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Browser login page for the authorization-code grant.
    pub fn login_url(&self) -> String {
        format!(
            "{}/secure/oauth/authorize?client_id={CLIENT_ID}&redirect_uri={REDIRECT_URI}&response_type=code",
            self.login_base_url
        )
    }

    // -- Tokens ---------------------------------------------------------------

    /// Exchange an authorization code for credentials.
    pub async fn exchange_code(&self, code: &str) -> anyhow::Result<Credentials> {
        let body = CodeGrant { client_id: CLIENT_ID, code };
        let token: TokenResponse =
            self.send(Method::POST, "/mobile-auth/v1/auth/token", &[], Some(&body)).await?;
        Ok(token.into_credentials(epoch_secs()))
    }

    /// Refresh credentials. The old refresh token is kept when the response
    /// does not rotate it.
    pub async fn refresh_token(&self, refresh_token: &str) -> anyhow::Result<Credentials> {
        let body = RefreshGrant { client_id: CLIENT_ID, refresh_token };
        let token: TokenResponse =
            self.send(Method::POST, "/mobile-auth/v1/auth/token/refresh", &[], Some(&body)).await?;
        let mut creds = token.into_credentials(epoch_secs());
        if creds.refresh_token.is_none() {
            creds.refresh_token = Some(refresh_token.to_owned());
        }
        Ok(creds)
    }

    /// Request a token that is not tied to a member.
    pub async fn anonymous_token(&self) -> anyhow::Result<Credentials> {
        let body = AnonymousGrant { client_id: CLIENT_ID };
        let token: TokenResponse = self
            .send(Method::POST, "/mobile-auth/v1/auth/token/anonymous", &[], Some(&body))
            .await?;
        Ok(token.into_credentials(epoch_secs()))
    }

    // -- Products -------------------------------------------------------------

    pub async fn search_products(&self, query: &str, limit: u32) -> anyhow::Result<Value> {
        let url = self.endpoint("/mobile-services/product/search/v2", &[])?;
        let limit = limit.to_string();
        let req = self.request(Method::GET, url).query(&[
            ("query", query),
            ("sortOn", "RELEVANCE"),
            ("size", limit.as_str()),
            ("page", "0"),
        ]);
        let body: Value = self.execute(req).await?;
        Ok(take_field(body, "products"))
    }

    pub async fn product(&self, id: u64) -> anyhow::Result<Value> {
        let id = id.to_string();
        self.get_json("/mobile-services/product/detail/v4/fir", &[&id]).await
    }

    pub async fn spotlight_bonus(&self) -> anyhow::Result<Value> {
        let url = self.endpoint("/mobile-services/bonuspage/v2/section/spotlight", &[])?;
        let req = self.request(Method::GET, url).query(&[("application", APPLICATION)]);
        self.execute(req).await
    }

    pub async fn bonus_products(&self, size: u32) -> anyhow::Result<Value> {
        let url = self.endpoint("/mobile-services/product/search/v2", &[])?;
        let size = size.to_string();
        let req = self.request(Method::GET, url).query(&[
            ("bonus", "true"),
            ("size", size.as_str()),
            ("sortOn", "RELEVANCE"),
        ]);
        self.execute(req).await
    }

    pub async fn previously_bought(&self, size: u32, page: u32) -> anyhow::Result<PreviouslyBought> {
        let data: PreviouslyBoughtData = self
            .graphql(&graphql::previously_bought_query(size, page), "productSearch")
            .await?;
        let search = data.product_search;
        Ok(PreviouslyBought {
            products: search.products,
            total_elements: search.page.total_elements,
            page,
            size,
        })
    }

    // -- Member ---------------------------------------------------------------

    pub async fn member(&self) -> anyhow::Result<Value> {
        let data: MemberData = self.graphql(&graphql::member_query(), "member").await?;
        Ok(serde_json::to_value(data.member)?)
    }

    // -- Receipts -------------------------------------------------------------

    pub async fn receipts(&self) -> anyhow::Result<Value> {
        self.get_json("/mobile-services/v1/receipts", &[]).await
    }

    pub async fn receipt(&self, transaction_id: &str) -> anyhow::Result<Value> {
        self.get_json("/mobile-services/v2/receipts", &[transaction_id]).await
    }

    // -- Shopping lists -------------------------------------------------------

    pub async fn shopping_list(&self) -> anyhow::Result<Value> {
        self.get_json("/mobile-services/shoppinglist/v2/items", &[]).await
    }

    pub async fn shopping_lists(&self) -> anyhow::Result<Value> {
        self.get_json("/mobile-services/lists/v3/lists", &[]).await
    }

    pub async fn list_items(&self, list_id: &str) -> anyhow::Result<Value> {
        let url = self.endpoint("/mobile-services/lists/v3/lists", &[list_id, "items"])?;
        self.execute(self.request(Method::GET, url)).await
    }

    pub async fn add_to_shopping_list(&self, items: &[ListItem]) -> anyhow::Result<()> {
        let body = ListItemsBody { items: items.iter().map(ListItemBody::from).collect() };
        let _: Value = self
            .send(Method::PATCH, "/mobile-services/shoppinglist/v2/items", &[], Some(&body))
            .await?;
        Ok(())
    }

    pub async fn clear_shopping_list(&self) -> anyhow::Result<()> {
        let _: Value = self
            .send::<(), _>(Method::DELETE, "/mobile-services/shoppinglist/v2/items", &[], None)
            .await?;
        Ok(())
    }

    // -- Orders ---------------------------------------------------------------

    pub async fn order(&self) -> anyhow::Result<Value> {
        self.get_json("/mobile-services/order/v1/summaries/active", &[]).await
    }

    pub async fn add_to_order(&self, items: &[OrderItem]) -> anyhow::Result<()> {
        let body = OrderItemsBody { items };
        let _: Value =
            self.send(Method::PUT, "/mobile-services/order/v1/items", &[], Some(&body)).await?;
        Ok(())
    }

    // -- Recipes --------------------------------------------------------------

    pub async fn search_recipes(&self, query: &str, size: u32) -> anyhow::Result<RecipeSearch> {
        let data: RecipeSearchData =
            self.graphql(&graphql::recipe_search_query(query, size), "recipeSearch").await?;
        Ok(data.recipe_search)
    }

    pub async fn recipe(&self, id: u64) -> anyhow::Result<Option<Recipe>> {
        let data: RecipeData = self.graphql(&graphql::recipe_query(id), "recipe").await?;
        Ok(data.recipe)
    }

    // -- Plumbing -------------------------------------------------------------

    /// Join `path` onto the base URL and append percent-encoded `segments`.
    fn endpoint(&self, path: &str, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid API URL: {}{}", self.base_url, path))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| anyhow::anyhow!("API URL cannot have a path: {}", self.base_url))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, authenticated = self.token.is_some(), "api request");
        let req = self
            .client
            .request(method, url)
            .header("x-client-name", CLIENT_NAME)
            .header("x-client-version", CLIENT_VERSION)
            .header("x-application", APPLICATION);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> anyhow::Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &String::from_utf8_lossy(&bytes)).into());
        }
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        serde_json::from_slice(&bytes).context("decoding API response")
    }

    async fn get_json(&self, path: &str, segments: &[&str]) -> anyhow::Result<Value> {
        let url = self.endpoint(path, segments)?;
        self.execute(self.request(Method::GET, url)).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        segments: &[&str],
        body: Option<&B>,
    ) -> anyhow::Result<T> {
        let url = self.endpoint(path, segments)?;
        let mut req = self.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.execute(req).await
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, field: &'static str) -> anyhow::Result<T> {
        let resp: GraphQlResponse<T> =
            self.send(Method::POST, "/graphql", &[], Some(&GraphQlRequest { query })).await?;
        Ok(resp.into_data(field)?)
    }
}

/// Return `body[field]` when present, otherwise the whole body.
fn take_field(mut body: Value, field: &str) -> Value {
    match body.get_mut(field) {
        Some(v) => v.take(),
        None => body,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
