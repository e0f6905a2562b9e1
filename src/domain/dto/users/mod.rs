pub mod request;
pub mod response;

pub use request::{ProfileUpdateRequest, StatusChangeRequest};
pub use response::{SessionListResponse, SessionResponse, UserListResponse, UserResponse};
