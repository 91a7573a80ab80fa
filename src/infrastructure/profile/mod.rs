//! Profile access over the user store

mod service;

pub use service::ProfileService;
