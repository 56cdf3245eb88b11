// src/handlers/rewards.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::reward::{RedeemResponse, Reward},
    services::analytics::{QuizEvent, SharedNotifier},
    store::SharedStore,
    utils::jwt::Claims,
};

/// Lists rewards currently on offer.
#[utoipa::path(
    get,
    path = "/api/rewards",
    tag = "Rewards",
    responses(
        (status = 200, description = "Active rewards, cheapest first", body = Vec<Reward>)
    )
)]
pub async fn list_rewards(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    let rewards = store.list_active_rewards().await?;
    Ok(Json(rewards))
}

/// Spends points on a reward.
#[utoipa::path(
    post,
    path = "/api/rewards/{id}/redeem",
    tag = "Rewards",
    params(("id" = Uuid, Path, description = "Reward ID")),
    responses(
        (status = 200, description = "Reward redeemed", body = RedeemResponse),
        (status = 400, description = "Not enough points"),
        (status = 404, description = "Reward not found"),
        (status = 409, description = "Out of stock")
    ),
    security(("jwt" = []))
)]
pub async fn redeem_reward(
    State(store): State<SharedStore>,
    State(notifier): State<SharedNotifier>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let player = claims.player()?;

    let redeemed = store.redeem_reward(player.user_id, id, Utc::now()).await?;

    tracing::info!(
        user_id = %player.user_id,
        reward_id = %id,
        remaining_points = redeemed.remaining_points,
        "Reward redeemed"
    );
    notifier.notify(&QuizEvent::RewardClaimed {
        user_id: player.user_id,
        reward_name: redeemed.redemption.reward_name.clone(),
        points_cost: redeemed.redemption.points_spent,
    });

    Ok(Json(redeemed))
}
