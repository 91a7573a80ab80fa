//! Authentication infrastructure module
//!
//! JWT token management and the login / token-resolution flow.

mod jwt;
mod service;

pub use jwt::{
    IdentityClaims, JwtConfig, JwtService, TokenClaims, TokenError, TokenLifetime, TokenService,
};
pub use service::{AuthResponse, AuthService};
