// Domain-layer modules and shared errors/models
pub mod billing {
    pub use crate::billing::*;
}

pub mod audience {
    pub use crate::audience::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
