mod authenticator;
mod credentials;
mod error;
pub mod exchange;
mod utils;

pub use authenticator::Authenticator;
pub use credentials::{CredentialStore, TokenPair};
pub use error::AuthError;
pub use exchange::{AppCredentials, AuthEndpoints, TokenExchanger};
