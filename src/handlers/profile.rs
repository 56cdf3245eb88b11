// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::{profile::MeResponse, reward::Redemption},
    store::SharedStore,
    utils::jwt::Claims,
};

/// Get current player's profile and remaining attempts.
#[utoipa::path(
    get,
    path = "/api/profile/me",
    tag = "Profile",
    responses(
        (status = 200, description = "Current profile", body = MeResponse),
        (status = 404, description = "Profile not found")
    ),
    security(("jwt" = []))
)]
pub async fn get_me(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let player = claims.player()?;

    let profile = store
        .get_profile(player.user_id)
        .await?
        .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(MeResponse::from(profile)))
}

/// List rewards redeemed by the current player, newest first.
#[utoipa::path(
    get,
    path = "/api/profile/rewards",
    tag = "Profile",
    responses(
        (status = 200, description = "Redemptions", body = Vec<Redemption>)
    ),
    security(("jwt" = []))
)]
pub async fn list_my_rewards(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let player = claims.player()?;
    let redemptions = store.list_redemptions(player.user_id).await?;
    Ok(Json(redemptions))
}
