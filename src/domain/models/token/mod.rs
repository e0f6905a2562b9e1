pub mod token;

pub use token::{
    AccessClaims, IssuedTokens, RefreshClaims, RefreshedTokens, SessionContext,
    SessionInvalidReason, SessionValidation, TokenError, TokenType, TypedClaims,
};
