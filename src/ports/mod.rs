pub mod repository;
pub mod session;

pub use repository::*;
pub use session::*;
