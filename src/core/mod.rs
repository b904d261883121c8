pub mod auth;
pub mod create;
pub mod period;
pub mod session;
