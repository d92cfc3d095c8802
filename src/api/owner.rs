use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    auth::AuthToken,
    ledger::{CandidateSpec, VotingWindow},
    store::Notification,
};
use crate::service::LedgerService;

pub fn routes() -> Vec<Route> {
    routes![configure_window, add_candidate]
}

#[post("/window", data = "<window>", format = "json")]
async fn configure_window(
    token: AuthToken,
    window: Json<VotingWindow>,
    ledger: &State<LedgerService>,
) -> Result<Json<Notification>> {
    let notification = ledger
        .configure_window(token.identity(), window.start, window.end)
        .await?;
    Ok(Json(notification))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn add_candidate(
    token: AuthToken,
    spec: Json<CandidateSpec>,
    ledger: &State<LedgerService>,
) -> Result<Json<Notification>> {
    let notification = ledger.add_candidate(token.identity(), spec.0).await?;
    Ok(Json(notification))
}
