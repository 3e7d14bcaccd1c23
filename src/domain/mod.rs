pub mod project;
pub mod stats;
pub mod user;

pub use project::*;
pub use stats::*;
pub use user::*;
