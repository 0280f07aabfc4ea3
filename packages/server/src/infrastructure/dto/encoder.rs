//! JSON encoding of room events as `{"event", "data"}` frames.

use crate::domain::{RoomEvent, RoomEventEncoder};

use super::websocket::{
    ExpenseDto, MessageDto, SettlementDto, UserStoppedTypingDto, UserTypingDto, encode_frame,
    event,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRoomEventEncoder;

impl RoomEventEncoder for JsonRoomEventEncoder {
    fn encode(&self, room_event: RoomEvent<'_>) -> String {
        match room_event {
            RoomEvent::MessagePosted(view) => {
                encode_frame(event::RECEIVE_MESSAGE, None, &MessageDto::from(view))
            }
            RoomEvent::UserTyping { user_id, username } => encode_frame(
                event::USER_TYPING,
                None,
                &UserTypingDto {
                    user_id: user_id.to_string(),
                    username: username.to_string(),
                },
            ),
            RoomEvent::UserStoppedTyping(user_id) => encode_frame(
                event::USER_STOPPED_TYPING,
                None,
                &UserStoppedTypingDto {
                    user_id: user_id.to_string(),
                },
            ),
            RoomEvent::ExpenseAdded(view) => {
                encode_frame(event::NEW_EXPENSE, None, &ExpenseDto::from(view))
            }
            RoomEvent::ExpenseDeleted(expense_id) => {
                encode_frame(event::EXPENSE_DELETED, None, &expense_id.as_str())
            }
            RoomEvent::DebtSettled(view) => {
                encode_frame(event::DEBT_SETTLED, None, &SettlementDto::from(view))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExpenseId, UserId};
    use serde_json::Value;

    #[test]
    fn test_encode_user_typing() {
        // given:
        let user_id = UserId::new("alice".to_string()).unwrap();

        // when:
        let json = JsonRoomEventEncoder.encode(RoomEvent::UserTyping {
            user_id: &user_id,
            username: "Alice",
        });

        // then:
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "userTyping");
        assert_eq!(value["data"]["userId"], "alice");
        assert_eq!(value["data"]["username"], "Alice");
        assert!(value.get("ack").is_none());
    }

    #[test]
    fn test_encode_expense_deleted_carries_id_only() {
        let expense_id = ExpenseId::new("exp-1".to_string()).unwrap();
        let json = JsonRoomEventEncoder.encode(RoomEvent::ExpenseDeleted(&expense_id));
        assert_eq!(json, r#"{"event":"expenseDeleted","data":"exp-1"}"#);
    }
}
