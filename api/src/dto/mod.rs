//! Data Transfer Objects for API requests and responses

pub mod verification;

pub use verification::{SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse};
