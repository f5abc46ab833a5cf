// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GraphQL query builders and typed response schemas.
//!
//! Each query has its own `*Data` type; responses are decoded once into
//! [`GraphQlResponse`] and the error envelope is checked before any data is
//! used.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ApiError;

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Return the data, or the error envelope as an [`ApiError`].
    pub fn into_data(self, field: &'static str) -> Result<T, ApiError> {
        if !self.errors.is_empty() {
            return Err(ApiError::GraphQl(self.errors.into_iter().map(|e| e.message).collect()));
        }
        self.data.ok_or(ApiError::MissingData(field))
    }
}

/// Request body for `POST /graphql`.
#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
}

/// Encode user text as a GraphQL string literal.
fn string_literal(s: &str) -> String {
    Value::from(s).to_string()
}

/// Decode an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

// -- Member -------------------------------------------------------------------

pub fn member_query() -> String {
    "query { member { id emailAddress name { first last } } }".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberData {
    pub member: Option<Member>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Option<i64>,
    pub email_address: Option<String>,
    pub name: Option<PersonName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonName {
    pub first: Option<String>,
    pub last: Option<String>,
}

// -- Previously bought --------------------------------------------------------

pub fn previously_bought_query(size: u32, page: u32) -> String {
    format!(
        "{{ productSearch(input: {{ query: \"\" previouslyBought: true size: {size} page: {page} }}) \
         {{ products {{ id title brand category }} page {{ totalElements totalPages }} }} }}"
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviouslyBoughtData {
    pub product_search: ProductSearch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<ProductSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_elements: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u64,
}

/// Output shape of the `previously-bought` command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviouslyBought {
    pub products: Vec<ProductSummary>,
    pub total_elements: u64,
    pub page: u32,
    pub size: u32,
}

// -- Recipes ------------------------------------------------------------------

pub fn recipe_search_query(query: &str, size: u32) -> String {
    format!(
        "{{ recipeSearch(query: {{ query: {query}, size: {size} }}) {{ \
         result {{ id title slug cookTime images {{ rendition {{ url }} }} }} \
         page {{ totalElements totalPages }} }} }}",
        query = string_literal(query),
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSearchData {
    pub recipe_search: RecipeSearch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSearch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<RecipeSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub cook_time: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<RecipeImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeImage {
    pub rendition: Option<Rendition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rendition {
    pub url: Option<String>,
}

pub fn recipe_query(id: u64) -> String {
    format!(
        "{{ recipe(id: {id}) {{ id title slug description cookTime prepTime \
         servings tags \
         ingredients {{ text quantity name {{ singular plural }} unit {{ singular plural }} }} \
         steps {{ text index }} nutritions {{ name value unit }} \
         images {{ rendition {{ url }} }} }} }}"
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeData {
    pub recipe: Option<Recipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cook_time: Option<u32>,
    pub prep_time: Option<u32>,
    /// Scalar on the provider schema; passed through untouched.
    pub servings: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<RecipeStep>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutritions: Vec<Nutrition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<RecipeImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub text: Option<String>,
    pub quantity: Option<f64>,
    pub name: Option<Inflection>,
    pub unit: Option<Inflection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inflection {
    pub singular: Option<String>,
    pub plural: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeStep {
    pub text: Option<String>,
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nutrition {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[cfg(test)]
#[path = "graphql_tests.rs"]
mod tests;
