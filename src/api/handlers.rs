use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        ChatRequest, ChatResponse, Interaction, InteractionRequest, Listing, Recommendation,
        ScrapeQuery, UserId,
    },
    services::recommender::Strategy,
};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Scrapes every marketplace for a product
pub async fn scrape(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ScrapeQuery>,
) -> AppResult<Json<Vec<Listing>>> {
    let product_name = params.product_name.trim();
    if product_name.is_empty() {
        return Err(AppError::InvalidInput(
            "product_name cannot be empty".to_string(),
        ));
    }

    tracing::info!(request_id = %request_id, product = %product_name, "Scraping for product");

    let report = state.aggregator.aggregate_report(product_name).await;
    for failed in report.failed_sources() {
        tracing::warn!(
            request_id = %request_id,
            source = %failed.source,
            status = ?failed.status,
            "Source degraded"
        );
    }

    Ok(Json(report.listings))
}

/// User-based recommendations for a user
pub async fn user_based_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<Recommendation>>> {
    recommendations_for(&state, Strategy::UserBased, user_id).await
}

/// Item-based recommendations for a user
pub async fn item_based_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<Recommendation>>> {
    recommendations_for(&state, Strategy::ItemBased, user_id).await
}

async fn recommendations_for(
    state: &AppState,
    strategy: Strategy,
    user_id: UserId,
) -> AppResult<Json<Vec<Recommendation>>> {
    let interactions = state.store.fetch_interactions(None).await?;
    let recommendations = state
        .recommender
        .recommend(strategy, user_id, &interactions)?;

    if recommendations.is_empty() {
        return Err(AppError::NotFound(
            "No recommendations found for this user.".to_string(),
        ));
    }

    Ok(Json(recommendations))
}

/// Appends one interaction to the history
pub async fn create_interaction(
    State(state): State<AppState>,
    Json(request): Json<InteractionRequest>,
) -> AppResult<(StatusCode, Json<Interaction>)> {
    if request.item_title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "item_title cannot be empty".to_string(),
        ));
    }
    if !request.rating.is_finite() {
        return Err(AppError::InvalidInput("rating must be a number".to_string()));
    }

    let interaction = Interaction::new(request.user_id, request.item_title, request.rating);
    state.store.record_interaction(&interaction).await?;

    Ok((StatusCode::CREATED, Json(interaction)))
}

/// Answers a chat message
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let response = state.chat.handle(request.user_id, &request.message).await?;
    Ok(Json(ChatResponse { response }))
}
