use std::convert::Infallible;

use rocket::{
    http::{
        uri::fmt::{Formatter, FromUriParam, Path, UriDisplay},
        Status,
    },
    request::FromParam,
    serde::json::Json,
    Catcher, Request, Route,
};

use crate::error::{status_kind, ErrorBody};
use crate::model::ledger::CandidateId;

mod owner;
mod public;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(owner::routes());
    routes.extend(voter::routes());
    routes.extend(public::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Report guard failures and unmatched routes with the same body as every other error.
#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let body = ErrorBody {
        error: status_kind(status).to_string(),
        message: format!("{} {}", req.method(), req.uri()),
    };
    (status, Json(body))
}

/// A `<candidate_id>` path segment.
///
/// Never forwards: a segment that cannot be a candidate ID (negative, too
/// large, not a number) becomes ID 0, which is never assigned, so the ledger
/// reports it as `InvalidCandidate` in its usual precondition order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CandidateParam(pub CandidateId);

impl<'a> FromParam<'a> for CandidateParam {
    type Error = Infallible;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        let id = param.parse().unwrap_or_else(|_| {
            debug!("'{param}' is not a candidate ID");
            0
        });
        Ok(Self(id))
    }
}

impl UriDisplay<Path> for CandidateParam {
    fn fmt(&self, f: &mut Formatter<'_, Path>) -> std::fmt::Result {
        UriDisplay::<Path>::fmt(&self.0, f)
    }
}

impl FromUriParam<Path, CandidateId> for CandidateParam {
    type Target = CandidateId;

    fn from_uri_param(id: CandidateId) -> CandidateId {
        id
    }
}


#[cfg(test)]
mod testing {
    use rocket::{
        http::{ContentType, Cookie, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };
    use serde::de::DeserializeOwned;

    use crate::error::ErrorBody;
    use crate::model::{auth::AuthToken, identity::Identity};
    use crate::Config;

    /// A signed auth cookie for `identity`.
    pub fn cookie_for(client: &Client, identity: &Identity) -> Cookie<'static> {
        let config = client.rocket().state::<Config>().unwrap();
        AuthToken::new(identity.clone()).into_cookie(config).unwrap()
    }

    /// POST `body` as JSON on behalf of `identity`.
    pub async fn post_as<'c>(
        client: &'c Client,
        identity: &Identity,
        uri: String,
        body: &impl serde::Serialize,
    ) -> LocalResponse<'c> {
        client
            .post(uri)
            .header(ContentType::JSON)
            .cookie(cookie_for(client, identity))
            .body(serde_json::to_string(body).unwrap())
            .dispatch()
            .await
    }

    /// Parse a successful JSON response.
    pub async fn json_ok<T: DeserializeOwned>(response: LocalResponse<'_>) -> T {
        assert_eq!(Status::Ok, response.status());
        let raw = response.into_string().await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Assert an error response of the given status and kind.
    pub async fn expect_error(response: LocalResponse<'_>, status: Status, kind: &str) {
        assert_eq!(status, response.status());
        let raw = response.into_string().await.unwrap();
        let body: ErrorBody = serde_json::from_str(&raw).unwrap();
        assert_eq!(body.error, kind);
    }
}
