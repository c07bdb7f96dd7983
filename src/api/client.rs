//! HTTP implementation of the backend traits

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::dto::{prepare_image_upload, RecipePayload, UploadResponse};
use super::{MealBackend, RecipeBackend, ShoppingBackend};
use crate::api_errors::ApiError;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::{ApiConfig, RecoveryConfig};
use crate::meal_slots::{MealRequest, SavedMeal};
use crate::recipe_model::{convert_recipe_values, RecipeCard, RecipeCardDto, RecipeId};
use crate::shopping::{BreakdownEntry, ShoppingItem, ShoppingItemUpdate};

/// List endpoints answer with either a bare array or a paginated envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Paged { results } => results,
        }
    }
}

/// Backend client with retries and a circuit breaker
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    recovery: RecoveryConfig,
    breaker: CircuitBreaker,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| ApiError::Config(format!("invalid base URL {raw}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            breaker: CircuitBreaker::new(&config.recovery),
            recovery: config.recovery.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request for `path` relative to the base URL, with the bearer
    /// token and an optional JSON body
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<reqwest::Request, ApiError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Config(format!("invalid path {path}: {e}")))?;

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    /// Send a request, retrying transient failures with backoff.
    /// Client errors (4xx other than 429) are returned at once.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ApiError> {
        if self.breaker.is_open() {
            warn!(%method, path, "Circuit open, not sending request");
            return Err(ApiError::CircuitOpen);
        }

        let mut attempt = 0;
        loop {
            let request = self.build_request(method.clone(), path, query, body)?;
            debug!(%method, url = %request.url(), attempt, "Sending request");

            let result = match self.http.execute(request).await {
                Ok(response) => check_status(response).await,
                Err(err) => Err(ApiError::from(err)),
            };

            match result {
                Ok(response) => {
                    self.breaker.record_success();
                    return Ok(response);
                }
                Err(err) if err.is_transient() => {
                    self.breaker.record_failure();
                    if attempt >= self.recovery.max_retries || self.breaker.is_open() {
                        error!(%method, path, attempts = attempt + 1, "Request failed: {err}");
                        return Err(err);
                    }
                    let delay = retry_delay(&self.recovery, attempt);
                    warn!(%method, path, attempt, delay_ms = delay.as_millis() as u64, "Retrying after: {err}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(%method, path, "Request rejected: {err}");
                    return Err(err);
                }
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, path, query, body).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, method: Method, path: &str, body: Option<&Value>) -> Result<(), ApiError> {
        self.execute(method, path, &[], body).await?;
        Ok(())
    }

    /// Upload an image and return its storage path
    pub async fn upload_image(&self, bytes: &[u8]) -> Result<String, ApiError> {
        let upload = prepare_image_upload(bytes)?;
        let body = to_value(&upload)?;
        let response: UploadResponse = self.send_json(Method::POST, "uploads/", &[], Some(&body)).await?;
        info!(path = %response.path, "Image uploaded");
        Ok(response.path)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Encode(e.to_string()))
}

/// Turn a non-success response into `ApiError::Status`, keeping the body as the message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let body = body.trim();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown status").to_string()
    } else {
        body.to_string()
    };
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Backoff before retry number `attempt + 1`: exponential from the base
/// delay, plus up to half the base delay of random jitter, capped at the
/// maximum delay
pub fn retry_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let exponential = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << attempt.min(16));
    let jitter = if config.base_retry_delay_ms >= 2 {
        rand::thread_rng().gen_range(0..=config.base_retry_delay_ms / 2)
    } else {
        0
    };
    Duration::from_millis(exponential.saturating_add(jitter).min(config.max_retry_delay_ms))
}

fn recipe_path(id: &RecipeId) -> String {
    format!("recipes/{id}/")
}

fn meal_path(id: &RecipeId) -> String {
    format!("meals/{id}/")
}

#[async_trait]
impl RecipeBackend for ApiClient {
    async fn list_recipes(&self, category: Option<&str>) -> Result<Vec<RecipeCard>, ApiError> {
        let query: Vec<(&str, &str)> = category.map(|c| ("recipe_category", c)).into_iter().collect();
        let entries: ListResponse<Value> = self.send_json(Method::GET, "recipes/", &query, None).await?;
        let recipes = convert_recipe_values(entries.into_vec());
        debug!(count = recipes.len(), "Recipes loaded");
        Ok(recipes)
    }

    async fn get_recipe(&self, id: &RecipeId) -> Result<RecipeCard, ApiError> {
        let dto: RecipeCardDto = self.send_json(Method::GET, &recipe_path(id), &[], None).await?;
        Ok(RecipeCard::try_from(dto)?)
    }

    async fn create_recipe(&self, recipe: &RecipePayload) -> Result<RecipeCard, ApiError> {
        let body = to_value(recipe)?;
        let dto: RecipeCardDto = self.send_json(Method::POST, "recipes/", &[], Some(&body)).await?;
        Ok(RecipeCard::try_from(dto)?)
    }

    async fn update_recipe(&self, id: &RecipeId, recipe: &RecipePayload) -> Result<RecipeCard, ApiError> {
        let body = to_value(recipe)?;
        let dto: RecipeCardDto = self.send_json(Method::PUT, &recipe_path(id), &[], Some(&body)).await?;
        Ok(RecipeCard::try_from(dto)?)
    }

    async fn delete_recipe(&self, id: &RecipeId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &recipe_path(id), None).await
    }
}

#[async_trait]
impl MealBackend for ApiClient {
    async fn list_meals(&self) -> Result<Vec<SavedMeal>, ApiError> {
        let meals: ListResponse<SavedMeal> = self.send_json(Method::GET, "meals/", &[], None).await?;
        Ok(meals.into_vec())
    }

    async fn create_meal(&self, meal: &MealRequest) -> Result<SavedMeal, ApiError> {
        let body = to_value(meal)?;
        self.send_json(Method::POST, "meals/", &[], Some(&body)).await
    }

    async fn update_meal(&self, id: &RecipeId, meal: &MealRequest) -> Result<SavedMeal, ApiError> {
        let body = to_value(meal)?;
        self.send_json(Method::PUT, &meal_path(id), &[], Some(&body)).await
    }

    async fn delete_meal(&self, id: &RecipeId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &meal_path(id), None).await
    }
}

#[async_trait]
impl ShoppingBackend for ApiClient {
    async fn list_shopping_items(&self) -> Result<Vec<ShoppingItem>, ApiError> {
        let items: ListResponse<ShoppingItem> = self.send_json(Method::GET, "shopping-items/", &[], None).await?;
        Ok(items.into_vec())
    }

    async fn generate_from_planner(&self, start_date: NaiveDate) -> Result<Vec<ShoppingItem>, ApiError> {
        let body = json!({ "start_date": start_date.format("%Y-%m-%d").to_string() });
        let items: ListResponse<ShoppingItem> = self
            .send_json(Method::POST, "shopping-items/generate_from_planner/", &[], Some(&body))
            .await?;
        let items = items.into_vec();
        info!(%start_date, count = items.len(), "Shopping list generated from planner");
        Ok(items)
    }

    async fn get_breakdown(&self, id: i64) -> Result<Vec<BreakdownEntry>, ApiError> {
        let entries: ListResponse<BreakdownEntry> = self
            .send_json(Method::GET, &format!("shopping-items/{id}/breakdown/"), &[], None)
            .await?;
        Ok(entries.into_vec())
    }

    async fn update_shopping_item(&self, id: i64, update: &ShoppingItemUpdate) -> Result<ShoppingItem, ApiError> {
        let body = to_value(update)?;
        self.send_json(Method::PATCH, &format!("shopping-items/{id}/"), &[], Some(&body))
            .await
    }

    async fn delete_shopping_item(&self, id: i64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("shopping-items/{id}/"), None).await
    }

    async fn clear_checked(&self) -> Result<(), ApiError> {
        self.send_empty(Method::POST, "shopping-items/clear_checked/", None).await
    }
}
