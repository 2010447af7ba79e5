use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MessageId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

/// Append-only transcript of the assistant panel. Messages are never edited
/// or reordered; ids only grow.
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, sender: Sender, text: String) -> MessageId {
        let id = MessageId(self.messages.len());
        self.messages.push(ChatMessage {
            id,
            text,
            sender,
            timestamp: Utc::now(),
        });
        id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatLog, MessageId, Sender};

    #[test]
    fn ids_are_monotonic_and_order_is_append_only() {
        let mut log = ChatLog::new();
        let a = log.push(Sender::User, "where do bottlenecks cluster?".to_string());
        let b = log.push(Sender::Assistant, "mostly along I-5".to_string());
        assert_eq!(a, MessageId(0));
        assert_eq!(b, MessageId(1));
        assert!(a < b);

        let senders: Vec<_> = log.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Assistant]);
    }
}
