//! Session layer for the ETL dashboard.
//!
//! Token issuance, refresh and redirect flows belong to the managed identity
//! service behind [`IdentityProvider`]; this crate only restores, labels and
//! ends the session.

mod claims;
mod providers;
mod session;

pub use claims::TokenClaims;
pub use etl_types::{AccessToken, Credentials, IdentityError, IdentityProvider};
pub use providers::{EnvIdentityProvider, StaticIdentityProvider};
pub use session::{Identity, Session, SessionProvider, UNKNOWN_LOGIN};
