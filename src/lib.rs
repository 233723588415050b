#[macro_use]
extern crate serde;

pub mod config;
pub mod constant;
pub mod error;
pub mod models;
pub mod oss;
pub mod oss_signer;
pub mod oss_string_to_sign;
pub mod payload;
pub mod routes;
pub mod uploader;

pub use config::Config;
pub use error::{Error, Result};
pub use models::AppState;
pub use oss::*;
pub use oss_signer::*;
pub use oss_string_to_sign::*;
pub use payload::*;
pub use routes::create_router;
pub use uploader::*;
