pub mod request;
pub mod response;

pub use request::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    ResetPasswordRequest,
};
pub use response::{ForgotPasswordResponse, LoginResponse, RegisterResponse, SessionRef};
