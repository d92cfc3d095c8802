use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use super::CandidateParam;
use crate::error::Result;
use crate::model::{
    identity::Identity,
    ledger::{CandidateDescription, Winner},
    store::Notification,
};
use crate::service::{LedgerService, LedgerSummary};

pub fn routes() -> Vec<Route> {
    routes![
        summary,
        candidate,
        winner,
        voting_active,
        voter_status,
        notifications,
    ]
}

#[get("/ledger")]
async fn summary(ledger: &State<LedgerService>) -> Json<LedgerSummary> {
    Json(ledger.summary().await)
}

#[get("/candidates/<candidate_id>")]
async fn candidate(
    candidate_id: CandidateParam,
    ledger: &State<LedgerService>,
) -> Result<Json<CandidateDescription>> {
    Ok(Json(ledger.candidate(candidate_id.0).await?))
}

#[get("/winner")]
async fn winner(ledger: &State<LedgerService>) -> Result<Json<Winner>> {
    Ok(Json(ledger.winner().await?))
}

#[get("/voting/active")]
async fn voting_active(ledger: &State<LedgerService>) -> Json<bool> {
    Json(ledger.is_voting_active().await)
}

#[get("/voters/<identity>")]
async fn voter_status(identity: Identity, ledger: &State<LedgerService>) -> Json<VoterStatus> {
    let has_voted = ledger.has_voted(&identity).await;
    Json(VoterStatus {
        identity,
        has_voted,
    })
}

#[get("/notifications")]
async fn notifications(ledger: &State<LedgerService>) -> Result<Json<Vec<Notification>>> {
    Ok(Json(ledger.notifications().await?))
}

/// Whether a given identity has used its ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterStatus {
    pub identity: Identity,
    pub has_voted: bool,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    use super::*;
    use crate::api::testing::{cookie_for, expect_error, json_ok, post_as};
    use crate::model::{
        clock::ManualClock,
        ledger::{CandidateId, CandidateSpec, LedgerEvent, Phase, VotingWindow},
    };
    use crate::test_epoch;

    async fn add(client: &Client, spec: &CandidateSpec) {
        let response =
            post_as(client, &Identity::example_owner(), "/candidates".to_string(), spec).await;
        assert_eq!(Status::Ok, response.status());
    }

    async fn open_window(client: &Client, start: i64, end: i64) {
        let window = VotingWindow {
            start: test_epoch() + Duration::seconds(start),
            end: test_epoch() + Duration::seconds(end),
        };
        let response =
            post_as(client, &Identity::example_owner(), "/window".to_string(), &window).await;
        assert_eq!(Status::Ok, response.status());
    }

    async fn vote(client: &Client, voter: &Identity, candidate_id: CandidateId) {
        let response = client
            .post(format!("/candidates/{candidate_id}/vote"))
            .cookie(cookie_for(client, voter))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn fresh_summary(client: Client) {
        let response = client.get(uri!(summary)).dispatch().await;
        let summary: LedgerSummary = json_ok(response).await;
        assert_eq!(
            summary,
            LedgerSummary {
                owner: Identity::example_owner(),
                candidate_count: 0,
                window_configured: false,
                voting_start: None,
                voting_end: None,
                voting_active: false,
                phase: Phase::Unconfigured,
            }
        );
    }

    #[backend_test]
    async fn summary_follows_clock(client: Client, clock: ManualClock) {
        add(&client, &CandidateSpec::example_ada()).await;
        open_window(&client, 10, 20).await;

        let summary: LedgerSummary = json_ok(client.get(uri!(summary)).dispatch().await).await;
        assert_eq!(summary.candidate_count, 1);
        assert!(summary.window_configured);
        assert_eq!(summary.voting_start, Some(test_epoch() + Duration::seconds(10)));
        assert_eq!(summary.voting_end, Some(test_epoch() + Duration::seconds(20)));
        assert_eq!(summary.phase, Phase::Pending);

        let active: bool = json_ok(client.get(uri!(voting_active)).dispatch().await).await;
        assert!(!active);

        clock.set(test_epoch() + Duration::seconds(20));
        let active: bool = json_ok(client.get(uri!(voting_active)).dispatch().await).await;
        assert!(active);

        clock.advance(Duration::seconds(1));
        let active: bool = json_ok(client.get(uri!(voting_active)).dispatch().await).await;
        assert!(!active);
    }

    #[backend_test]
    async fn get_candidate(client: Client) {
        add(&client, &CandidateSpec::example_ada()).await;
        add(&client, &CandidateSpec::example_bo()).await;

        let response = client.get(uri!(candidate(2_u32))).dispatch().await;
        let bo: CandidateDescription = json_ok(response).await;
        assert_eq!(bo.name, "Bo");
        assert_eq!(bo.affiliation, CandidateSpec::example_bo().affiliation);

        // The vote count is not part of this view.
        let response = client.get(uri!(candidate(1_u32))).dispatch().await;
        let raw = response.into_string().await.unwrap();
        assert!(!raw.contains("votes"));

        let response = client.get(uri!(candidate(0_u32))).dispatch().await;
        expect_error(response, Status::NotFound, "InvalidCandidate").await;
        let response = client.get(uri!(candidate(3_u32))).dispatch().await;
        expect_error(response, Status::NotFound, "InvalidCandidate").await;
    }

    #[backend_test]
    async fn candidate_ids_outside_u32(client: Client) {
        add(&client, &CandidateSpec::example_ada()).await;

        for raw in ["4294967296", "-1", "ada"] {
            let response = client.get(format!("/candidates/{raw}")).dispatch().await;
            expect_error(response, Status::NotFound, "InvalidCandidate").await;
        }
    }

    #[backend_test]
    async fn winner_breaks_ties_towards_lowest_id(client: Client, clock: ManualClock) {
        add(&client, &CandidateSpec::example_ada()).await;
        add(&client, &CandidateSpec::example_bo()).await;
        open_window(&client, 10, 20).await;

        clock.set(test_epoch() + Duration::seconds(15));
        vote(&client, &Identity::new("a"), 2).await;
        vote(&client, &Identity::new("b"), 1).await;
        vote(&client, &Identity::new("c"), 2).await;
        vote(&client, &Identity::new("d"), 1).await;

        let response = client.get(uri!(winner)).dispatch().await;
        expect_error(response, Status::Conflict, "VotingStillInProgress").await;

        clock.set(test_epoch() + Duration::seconds(21));
        let winner: Winner = json_ok(client.get(uri!(winner)).dispatch().await).await;
        assert_eq!(
            winner,
            Winner {
                id: 1,
                name: "Ada".to_string(),
                votes: 2,
            }
        );
    }

    #[backend_test]
    async fn winner_edge_cases(client: Client, clock: ManualClock) {
        let response = client.get(uri!(winner)).dispatch().await;
        expect_error(response, Status::Conflict, "WindowNotConfigured").await;

        add(&client, &CandidateSpec::example_ada()).await;
        open_window(&client, 10, 20).await;
        clock.set(test_epoch() + Duration::seconds(21));
        let response = client.get(uri!(winner)).dispatch().await;
        expect_error(response, Status::Conflict, "NoVotesCast").await;
    }

    #[backend_test]
    async fn voter_status_and_notifications(client: Client, clock: ManualClock) {
        add(&client, &CandidateSpec::example_ada()).await;
        open_window(&client, 0, 20).await;
        let x = Identity::example_voter();

        let status: VoterStatus =
            json_ok(client.get(uri!(voter_status(&x))).dispatch().await).await;
        assert!(!status.has_voted);

        clock.advance(Duration::seconds(5));
        vote(&client, &x, 1).await;

        let status: VoterStatus =
            json_ok(client.get(uri!(voter_status(&x))).dispatch().await).await;
        assert_eq!(
            status,
            VoterStatus {
                identity: x.clone(),
                has_voted: true,
            }
        );

        let log: Vec<Notification> =
            json_ok(client.get(uri!(notifications)).dispatch().await).await;
        assert_eq!(log.len(), 3);
        assert!(matches!(log[0].event, LedgerEvent::CandidateAdded { id: 1, .. }));
        assert!(matches!(log[1].event, LedgerEvent::WindowConfigured { .. }));
        assert_eq!(
            log[2].event,
            LedgerEvent::VoteCast {
                voter: x,
                candidate_id: 1,
            }
        );
        assert_eq!(log[2].recorded_at, test_epoch() + Duration::seconds(5));
    }

    #[backend_test]
    async fn unknown_route_gets_json_error(client: Client) {
        let response = client
            .get("/nowhere")
            .header(ContentType::JSON)
            .dispatch()
            .await;
        expect_error(response, Status::NotFound, "NotFound").await;
    }
}
