//! HTTP layer: routes, middleware, sessions and request validation

pub mod constants;
pub mod flash;
pub mod forms;
pub mod helpers;
pub mod middleware;
pub mod services;
pub mod session;
