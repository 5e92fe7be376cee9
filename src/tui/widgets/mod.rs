mod messages;

pub use messages::{bubble_lines, MessageList, MessageListState};
