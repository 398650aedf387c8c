// Job application submission and review.
// service.rs holds the four operations; handlers.rs adapts them to HTTP.

pub mod handlers;
pub mod service;
pub mod validation;
