//! Inbound email event to chat notification mapping.

use crate::{InboundEmailEvent, OutboundNotification, SlackConfig};

/// Builds the chat notification for an inbound email.
///
/// Routing fields (`channel`, `icon_emoji`) come from configuration only, so a
/// crafted inbound payload cannot redirect the message. The poster name and
/// text come from the sender display name and the plain-text body.
pub fn translate(event: &InboundEmailEvent, chat: &SlackConfig) -> OutboundNotification {
    OutboundNotification {
        channel: chat.channel.clone(),
        username: event.from.clone(),
        text: event.text_part.clone(),
        icon_emoji: chat.emoji.clone(),
    }
}
