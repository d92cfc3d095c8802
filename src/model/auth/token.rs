use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::identity::Identity;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Proof that a request was made by a particular caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    identity: Identity,
}

impl AuthToken {
    /// Create a token vouching for `identity`.
    ///
    /// Only the identity provider that shares `jwt_secret` should call this.
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// The caller identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sign this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Verify and decode a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let data: TokenData<Claims> = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )?;
        Ok(data.claims.token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Every caller must present a valid token; there is no anonymous fallback.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<Config>>().await {
            request::Outcome::Success(config) => config,
            _ => {
                return request::Outcome::Failure((
                    Status::InternalServerError,
                    Error::Status(
                        Status::InternalServerError,
                        "Configuration is not loaded".to_string(),
                    ),
                ))
            }
        };

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => {
                return request::Outcome::Failure((
                    Status::Unauthorized,
                    Error::Status(Status::Unauthorized, "Missing auth token".to_string()),
                ))
            }
        };

        match Self::from_cookie(cookie, config) {
            Ok(token) => request::Outcome::Success(token),
            Err(err) => {
                debug!("Rejected auth token: {err}");
                request::Outcome::Failure((Status::Unauthorized, err))
            }
        }
    }
}
