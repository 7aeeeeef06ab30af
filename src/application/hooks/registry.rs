use super::{HookChain, HookHandler, HookPoint, HookPriority, HookVeto};
use crate::domain::entities::{Message, Room, User};
use std::sync::Arc;

/// Runs before a message is persisted; handlers may rewrite or veto it
pub struct BeforeSaveMessage;

impl HookPoint for BeforeSaveMessage {
    const NAME: &'static str = "before-save-message";
    type Payload = Message;
    type Context = ();

    fn chain(registry: &HookRegistry) -> &HookChain<Self> {
        &registry.before_save_message
    }
}

/// Runs before a user is added to a room
pub struct BeforeJoinRoom;

impl HookPoint for BeforeJoinRoom {
    const NAME: &'static str = "before-join-room";
    type Payload = User;
    type Context = Room;

    fn chain(registry: &HookRegistry) -> &HookChain<Self> {
        &registry.before_join_room
    }
}

/// Runs before a user leaves a room through the ordinary leave path
pub struct BeforeLeaveRoom;

impl HookPoint for BeforeLeaveRoom {
    const NAME: &'static str = "before-leave-room";
    type Payload = User;
    type Context = Room;

    fn chain(registry: &HookRegistry) -> &HookChain<Self> {
        &registry.before_leave_room
    }
}

/// Event name to ordered handler list table, filled at process wiring time
#[derive(Default)]
pub struct HookRegistry {
    before_save_message: HookChain<BeforeSaveMessage>,
    before_join_room: HookChain<BeforeJoinRoom>,
    before_leave_room: HookChain<BeforeLeaveRoom>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: HookPoint>(
        &self,
        id: &str,
        priority: HookPriority,
        handler: Arc<dyn HookHandler<H>>,
    ) {
        H::chain(self).register(id, priority, handler);
    }

    pub fn unregister<H: HookPoint>(&self, id: &str) -> bool {
        H::chain(self).unregister(id)
    }

    pub async fn run<H: HookPoint>(
        &self,
        payload: H::Payload,
        context: &H::Context,
    ) -> Result<H::Payload, HookVeto> {
        H::chain(self).run(payload, context).await
    }

    pub fn handler_ids<H: HookPoint>(&self) -> Vec<String> {
        H::chain(self).handler_ids()
    }
}
