use super::{
    BeforeJoinRoom, BeforeLeaveRoom, HookHandler, HookPriority, HookRegistry, HookResult,
    HookVeto,
};
use crate::domain::entities::{Room, User};
use crate::domain::ports::permission_service::{PermissionService, PERMISSION_VIEW_LIVECHAT_ROOM};
use crate::domain::ports::setting_watcher::{SettingWatcher, SETTING_LANGUAGE};
use crate::domain::ports::translator::Translator;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub const JOIN_GATE_ID: &str = "cant-join-omnichannel-room";
pub const LEAVE_GATE_ID: &str = "cant-leave-omnichannel-room";

pub const REASON_USER_IS_NOT_AGENT: &str = "error-user-is-not-agent";
pub const REASON_CANT_LEAVE_OMNICHANNEL_ROOM: &str = "error-cant-leave-omnichannel-room";
pub const CANT_LEAVE_MESSAGE_KEY: &str = "You_cant_leave_a_livechat_room_Please_use_the_close_button";

/// Only omnichannel agents may join omnichannel conversations
pub struct OmnichannelJoinGate {
    permissions: Arc<dyn PermissionService>,
}

impl OmnichannelJoinGate {
    pub fn new(permissions: Arc<dyn PermissionService>) -> Self {
        Self { permissions }
    }
}

#[async_trait]
impl HookHandler<BeforeJoinRoom> for OmnichannelJoinGate {
    async fn handle(&self, user: User, room: &Room) -> HookResult<User> {
        if !room.is_omnichannel() {
            return Ok(user);
        }

        let is_agent = self
            .permissions
            .has_permission(&user.id, PERMISSION_VIEW_LIVECHAT_ROOM, None)
            .await?;

        if !is_agent {
            return Err(HookVeto::new(REASON_USER_IS_NOT_AGENT, "User is not an Omnichannel Agent")
                .with_details(json!({ "method": "beforeJoinRoom" }))
                .into());
        }

        Ok(user)
    }
}

/// Omnichannel conversations are ended with the close action, never by leaving
pub struct OmnichannelLeaveGate {
    translator: Arc<dyn Translator>,
    settings: Arc<dyn SettingWatcher>,
    fallback_language: String,
}

impl OmnichannelLeaveGate {
    pub fn new(
        translator: Arc<dyn Translator>,
        settings: Arc<dyn SettingWatcher>,
        fallback_language: String,
    ) -> Self {
        Self {
            translator,
            settings,
            fallback_language,
        }
    }

    fn language_for(&self, user: &User) -> String {
        user.language
            .clone()
            .or_else(|| {
                self.settings
                    .get(SETTING_LANGUAGE)
                    .and_then(|v| v.as_str().map(str::to_string))
                    .filter(|l| !l.is_empty())
            })
            .unwrap_or_else(|| self.fallback_language.clone())
    }
}

#[async_trait]
impl HookHandler<BeforeLeaveRoom> for OmnichannelLeaveGate {
    async fn handle(&self, user: User, room: &Room) -> HookResult<User> {
        if !room.is_omnichannel() {
            return Ok(user);
        }

        let language = self.language_for(&user);
        let message = self.translator.translate(CANT_LEAVE_MESSAGE_KEY, &[], &language);

        Err(HookVeto::new(REASON_CANT_LEAVE_OMNICHANNEL_ROOM, message).into())
    }
}

/// Register both permanent room gates
pub fn register_room_access_gates(
    registry: &HookRegistry,
    permissions: Arc<dyn PermissionService>,
    translator: Arc<dyn Translator>,
    settings: Arc<dyn SettingWatcher>,
    fallback_language: String,
) {
    registry.register::<BeforeJoinRoom>(
        JOIN_GATE_ID,
        HookPriority::Low,
        Arc::new(OmnichannelJoinGate::new(permissions)),
    );
    registry.register::<BeforeLeaveRoom>(
        LEAVE_GATE_ID,
        HookPriority::Low,
        Arc::new(OmnichannelLeaveGate::new(translator, settings, fallback_language)),
    );
}
