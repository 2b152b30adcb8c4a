//! Response mapping shared by the route handlers

pub mod error;

pub use error::{
    domain_error_response, json_error_handler, throttled_response, validation_error_response,
    verify_result_response,
};
