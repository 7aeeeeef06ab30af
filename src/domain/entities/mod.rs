pub mod agent;
pub mod business_hour;
pub mod conversation;
pub mod message;
pub mod room;
pub mod user;

pub use agent::*;
pub use business_hour::*;
pub use conversation::*;
pub use message::*;
pub use room::*;
pub use user::*;
