use rocket::{serde::json::Json, Route, State};

use super::CandidateParam;
use crate::error::Result;
use crate::model::{auth::AuthToken, store::Notification};
use crate::service::LedgerService;

pub fn routes() -> Vec<Route> {
    routes![vote]
}

#[post("/candidates/<candidate_id>/vote")]
async fn vote(
    token: AuthToken,
    candidate_id: CandidateParam,
    ledger: &State<LedgerService>,
) -> Result<Json<Notification>> {
    let notification = ledger.vote(token.identity(), candidate_id.0).await?;
    Ok(Json(notification))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{
        http::Status,
        local::asynchronous::{Client, LocalResponse},
    };

    use super::*;
    use crate::api::testing::{cookie_for, expect_error, json_ok, post_as};
    use crate::model::{
        clock::ManualClock,
        identity::Identity,
        ledger::{CandidateId, CandidateSpec, LedgerEvent, VotingWindow},
        store::{LedgerStore, MemoryStore},
    };
    use crate::test_epoch;

    /// Add Ada (1) and Bo (2), then open voting over `[T+10, T+20]`.
    async fn set_up_election(client: &Client) {
        let owner = Identity::example_owner();
        for spec in [CandidateSpec::example_ada(), CandidateSpec::example_bo()] {
            let response = post_as(client, &owner, "/candidates".to_string(), &spec).await;
            assert_eq!(Status::Ok, response.status());
        }
        let window = VotingWindow {
            start: test_epoch() + Duration::seconds(10),
            end: test_epoch() + Duration::seconds(20),
        };
        let response = post_as(client, &owner, "/window".to_string(), &window).await;
        assert_eq!(Status::Ok, response.status());
    }

    async fn vote_as<'c>(
        client: &'c Client,
        voter: &Identity,
        candidate_id: CandidateId,
    ) -> LocalResponse<'c> {
        client
            .post(uri!(vote(candidate_id)))
            .cookie(cookie_for(client, voter))
            .dispatch()
            .await
    }

    /// Vote with an arbitrary path segment in place of the candidate ID.
    async fn vote_raw<'c>(client: &'c Client, voter: &Identity, raw: &str) -> LocalResponse<'c> {
        client
            .post(format!("/candidates/{raw}/vote"))
            .cookie(cookie_for(client, voter))
            .dispatch()
            .await
    }

    #[backend_test]
    async fn vote_once(client: Client, clock: ManualClock, store: MemoryStore) {
        set_up_election(&client).await;
        let x = Identity::example_voter();

        clock.set(test_epoch() + Duration::seconds(12));
        let notification: Notification = json_ok(vote_as(&client, &x, 1).await).await;
        assert_eq!(
            notification.event,
            LedgerEvent::VoteCast {
                voter: x.clone(),
                candidate_id: 1,
            }
        );

        clock.set(test_epoch() + Duration::seconds(13));
        expect_error(vote_as(&client, &x, 1).await, Status::Conflict, "AlreadyVoted").await;

        let ledger = store.load().await.unwrap().unwrap();
        assert_eq!(ledger.candidates()[0].votes, 1);
        assert!(ledger.has_voted(&x));
    }

    #[backend_test]
    async fn vote_outside_window(client: Client, clock: ManualClock, store: MemoryStore) {
        set_up_election(&client).await;
        let x = Identity::example_voter();

        clock.set(test_epoch() + Duration::seconds(9));
        expect_error(
            vote_as(&client, &x, 1).await,
            Status::Conflict,
            "VotingNotStarted",
        )
        .await;

        clock.set(test_epoch() + Duration::seconds(21));
        expect_error(vote_as(&client, &x, 1).await, Status::Conflict, "VotingEnded").await;

        // Setup wrote three notifications; the refused votes wrote none.
        assert_eq!(store.notification_count().await.unwrap(), 3);
    }

    #[backend_test]
    async fn vote_without_window(client: Client) {
        let owner = Identity::example_owner();
        let response =
            post_as(&client, &owner, "/candidates".to_string(), &CandidateSpec::example_ada())
                .await;
        assert_eq!(Status::Ok, response.status());

        expect_error(
            vote_as(&client, &Identity::example_voter(), 1).await,
            Status::Conflict,
            "WindowNotConfigured",
        )
        .await;
    }

    #[backend_test]
    async fn vote_for_unknown_candidate(client: Client, clock: ManualClock) {
        set_up_election(&client).await;
        clock.set(test_epoch() + Duration::seconds(15));
        let x = Identity::example_voter();

        expect_error(vote_as(&client, &x, 0).await, Status::NotFound, "InvalidCandidate").await;
        expect_error(vote_as(&client, &x, 3).await, Status::NotFound, "InvalidCandidate").await;

        // The refused attempts did not use up the ballot.
        let response = vote_as(&client, &x, 2).await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn vote_for_candidate_id_outside_u32(
        client: Client,
        clock: ManualClock,
        store: MemoryStore,
    ) {
        set_up_election(&client).await;
        let x = Identity::example_voter();

        // Window checks still come first.
        clock.set(test_epoch() + Duration::seconds(9));
        expect_error(
            vote_raw(&client, &x, "4294967296").await,
            Status::Conflict,
            "VotingNotStarted",
        )
        .await;

        clock.set(test_epoch() + Duration::seconds(15));
        for raw in ["4294967296", "-1"] {
            expect_error(
                vote_raw(&client, &x, raw).await,
                Status::NotFound,
                "InvalidCandidate",
            )
            .await;
        }

        assert!(!store.load().await.unwrap().unwrap().has_voted(&x));
        assert_eq!(store.notification_count().await.unwrap(), 3);
    }

    #[backend_test]
    async fn vote_requires_token(client: Client, clock: ManualClock) {
        set_up_election(&client).await;
        clock.set(test_epoch() + Duration::seconds(15));
        let response = client.post(uri!(vote(1_u32))).dispatch().await;
        expect_error(response, Status::Unauthorized, "Unauthenticated").await;
    }
}
