//! Demo transcript shown when a session starts

use super::message::Message;

const WELCOME: &str = "Hello! Welcome to **NoAI**. I'm here to help you with any questions you might have. How can I assist you today?";

const MARKDOWN_QUESTION: &str =
    "Hi there! Can you help me understand how to use markdown formatting in messages?";

const MARKDOWN_ANSWER: &str = r#"Here are some common markdown formatting options you can use:

**Bold text** - Use double asterisks: `**bold**`
*Italic text* - Use single asterisks: `*italic*`

You can also create lists:
- Bullet point 1
- Bullet point 2
- Bullet point 3

And even code blocks:
```javascript
function greet(name) {
  return `Hello, ${name}!`;
}
```

Feel free to try any of these formatting options in your messages!"#;

const COMPLIMENT: &str = "That's really helpful! The interface looks very clean and modern.";

const THANKS: &str = "Thank you! The interface is designed to be minimalistic and user-friendly, similar to ChatGPT but with our own clean aesthetic. Is there anything specific you'd like to know about or discuss?";

/// The fixed five-message transcript, alternating authors, assistant first
pub fn demo_transcript() -> Vec<Message> {
    vec![
        Message::assistant("1", WELCOME, "10:30 AM"),
        Message::user("2", MARKDOWN_QUESTION, "10:31 AM"),
        Message::assistant("3", MARKDOWN_ANSWER, "10:31 AM"),
        Message::user("4", COMPLIMENT, "10:32 AM"),
        Message::assistant("5", THANKS, "10:32 AM"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_alternates_authors() {
        let messages = demo_transcript();
        assert_eq!(messages.len(), 5);
        for (i, msg) in messages.iter().enumerate() {
            assert_eq!(msg.is_authored_by_user(), i % 2 == 1, "message {}", i);
        }
    }

    #[test]
    fn test_transcript_ids_are_distinct() {
        let messages = demo_transcript();
        let ids: Vec<&str> = messages.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_markdown_answer_contains_code_fence() {
        let messages = demo_transcript();
        assert!(messages[2].content().contains("```javascript"));
    }
}
