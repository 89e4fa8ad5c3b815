//! Authentication

mod auto_refresh;
mod client_credentials;
pub(crate) mod common;
mod token;

pub use auto_refresh::AuthFlow;
pub use auto_refresh::AutoRefreshTokenProvider;
pub use auto_refresh::DEFAULT_REFRESH_BUFFER;
pub use client_credentials::ClientCredentialsFlow;
pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
