//! External service integrations.

pub mod ads_client {
    pub use crate::ads_client::*;
}

pub mod ads_models {
    pub use crate::ads_models::*;
}
