use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait]
pub trait TimeService: Send + Sync {
    /// Wall-clock instant used for business hours and message age checks
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}
