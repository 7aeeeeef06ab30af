pub mod connection_manager;
pub mod i18n;
pub mod settings;

pub use connection_manager::*;
pub use i18n::*;
pub use settings::*;
