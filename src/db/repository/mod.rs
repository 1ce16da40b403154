//! Repository layer: entity-scoped database operations.

mod patient;
mod record;
mod session;
mod template;
mod user;

pub use patient::*;
pub use record::*;
pub use session::*;
pub use template::*;
pub use user::*;
