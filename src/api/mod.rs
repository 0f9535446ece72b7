// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod app {
    pub use crate::app::*;
}

pub mod docs {
    pub use crate::docs::*;
}
