//! API handlers for authgate.
//!
//! `auth` holds the register/login/logout pipeline and the session gate;
//! `users` is an example of a route composed behind that gate.

pub mod auth;
pub mod health;
pub mod users;
