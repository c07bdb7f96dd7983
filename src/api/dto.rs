//! Request and response bodies that only exist on the wire

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::api_errors::ApiError;
use crate::recipe_model::{RecipeCard, RecipeIngredient};

/// Largest image accepted for upload (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Recipe create/update body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipePayload {
    pub name: String,
    pub servings: u32,
    pub total_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preference: Option<String>,
    pub is_favorite: bool,
    pub ingredients: Vec<IngredientPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientPayload {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
}

impl From<&RecipeIngredient> for IngredientPayload {
    fn from(ingredient: &RecipeIngredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            quantity: ingredient.quantity,
            unit: ingredient.unit.clone(),
            category: ingredient.category.clone(),
        }
    }
}

impl From<&RecipeCard> for RecipePayload {
    fn from(recipe: &RecipeCard) -> Self {
        Self {
            name: recipe.name.trim().to_string(),
            servings: recipe.servings,
            total_time: recipe.total_time,
            recipe_category: recipe.category.clone(),
            meal_type: recipe.meal_type.clone(),
            dietary_preference: recipe.dietary_preference.clone(),
            is_favorite: recipe.is_favorite,
            ingredients: recipe.ingredients.iter().map(IngredientPayload::from).collect(),
        }
    }
}

/// Image upload body: the file as a base64 data URI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRequest {
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    /// Storage path of the uploaded image
    pub path: String,
}

/// Validate an image and encode it for upload.
/// Only PNG, JPEG, WebP and GIF files up to [`MAX_UPLOAD_BYTES`] are accepted.
pub fn prepare_image_upload(bytes: &[u8]) -> Result<UploadRequest, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::Upload("empty file".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::Upload(format!(
            "{} bytes exceeds the {} byte limit",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| ApiError::Upload("unrecognized image format".to_string()))?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        other => return Err(ApiError::Upload(format!("unsupported image format {other:?}"))),
    };

    Ok(UploadRequest {
        image: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
    })
}
