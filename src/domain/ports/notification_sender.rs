/// Best-effort delivery of messages only the recipient sees
pub trait NotificationSender: Send + Sync {
    /// Fire-and-forget; must not block the caller
    fn broadcast_ephemeral(&self, user_id: &str, room_id: &str, message: &str) -> Result<(), String>;
}
