use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::{consts as perm, AuthUser};
use crate::errors::ServiceError;
use crate::services::recipes::CreateRecipeRequest;
use crate::{ApiResponse, AppState};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_recipe))
        .route("/:id", get(get_recipe))
}

async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::RECIPES_WRITE)?;
    let recipe = state.services.recipes.create_recipe(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(recipe))))
}

async fn get_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require(perm::RECIPES_READ)?;
    let recipe = state.services.recipes.get_recipe(id).await?;
    Ok(Json(ApiResponse::success(recipe)))
}
