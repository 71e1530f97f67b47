use crate::types::{ConversationTurn, TurnRole};

/// Rendered when there are no past turns.
pub const EMPTY_HISTORY: &str = "No conversation history.";

/// Renders past turns as a `User: ...` / `Assistant: ...` transcript.
///
/// # Example
/// ```
/// use support_flows::history::format_history;
/// use support_flows::types::ConversationTurn;
///
/// let turns = [ConversationTurn::user("Hi"), ConversationTurn::model("Hello")];
/// assert_eq!(format_history(&turns), "User: Hi\nAssistant: Hello");
/// ```
pub fn format_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    turns
        .iter()
        .map(|t| {
            let speaker = match t.role {
                TurnRole::User => "User",
                TurnRole::Model => "Assistant",
            };
            format!("{speaker}: {}", t.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_placeholder() {
        assert_eq!(format_history(&[]), EMPTY_HISTORY);
    }

    #[test]
    fn single_turn_has_no_trailing_newline() {
        assert_eq!(format_history(&[ConversationTurn::user("Hi")]), "User: Hi");
    }

    #[test]
    fn content_is_kept_verbatim() {
        let turns = [
            ConversationTurn::user("  spaced  "),
            ConversationTurn::model("line1\nline2"),
            ConversationTurn::user(""),
        ];
        assert_eq!(
            format_history(&turns),
            "User:   spaced  \nAssistant: line1\nline2\nUser: "
        );
    }
}
