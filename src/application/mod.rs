pub mod business_hours;
pub mod hooks;
pub mod lifecycle;
pub mod omnichannel;
pub mod routing;
pub mod services;

pub use omnichannel::OmnichannelOrchestrator;
