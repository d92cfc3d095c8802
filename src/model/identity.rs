use std::fmt::{Display, Formatter};

use rocket::{
    http::{
        impl_from_uri_param_identity,
        uri::fmt::{Formatter as UriFormatter, Path, UriDisplay},
    },
    request::FromParam,
};
use serde::{Deserialize, Serialize};

/// An opaque, unforgeable caller identity, as vouched for by the hosting environment.
///
/// The ledger trusts identities completely: whoever presents a valid auth token
/// for an identity *is* that identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> FromParam<'a> for Identity {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        if param.is_empty() {
            Err(param)
        } else {
            Ok(Self::new(param))
        }
    }
}

impl UriDisplay<Path> for Identity {
    fn fmt(&self, formatter: &mut UriFormatter<'_, Path>) -> std::fmt::Result {
        formatter.write_value(self.as_str())
    }
}

impl_from_uri_param_identity!([Path] Identity);

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Identity {
        /// Matches `ledger_owner` in `Rocket.toml`.
        pub fn example_owner() -> Self {
            Self::new("owner")
        }

        pub fn example_voter() -> Self {
            Self::new("voter-x")
        }

        pub fn example_voter2() -> Self {
            Self::new("voter-y")
        }
    }
}
