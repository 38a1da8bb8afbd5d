//! Alternation repair for conversation history.
//!
//! Chat models reject histories that do not strictly alternate `user` / `model`
//! starting with `user`. Turns that break the alternation are dropped, never
//! reordered.

use super::model::{ConversationTurn, Speaker};

/// Keeps each turn only if its speaker is the one expected next.
///
/// The first kept turn is always from the user. Already-alternating,
/// user-first histories are returned unchanged.
pub fn repair_history(turns: &[ConversationTurn]) -> Vec<ConversationTurn> {
    let mut expected = Speaker::User;
    let mut repaired = Vec::with_capacity(turns.len());

    for turn in turns {
        if turn.speaker != expected {
            continue;
        }
        repaired.push(turn.clone());
        expected = match expected {
            Speaker::User => Speaker::Assistant,
            Speaker::Assistant => Speaker::User,
        };
    }

    repaired
}

/// Repairs `turns` for replay ahead of a new user message.
///
/// A trailing user turn is dropped as well, since the new message takes its
/// place and the history must end on an answered turn.
pub fn prepare_history(turns: &[ConversationTurn]) -> Vec<ConversationTurn> {
    let mut history = repair_history(turns);
    if history
        .last()
        .is_some_and(|turn| turn.speaker == Speaker::User)
    {
        history.pop();
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speakers(turns: &[ConversationTurn]) -> Vec<Speaker> {
        turns.iter().map(|turn| turn.speaker).collect()
    }

    #[test]
    fn test_alternating_history_is_unchanged() {
        let turns = vec![
            ConversationTurn::user("a"),
            ConversationTurn::assistant("b"),
            ConversationTurn::user("c"),
        ];

        assert_eq!(repair_history(&turns), turns);
        assert_eq!(repair_history(&repair_history(&turns)), turns);
    }

    #[test]
    fn test_leading_assistant_and_repeated_user_are_dropped() {
        let turns = vec![
            ConversationTurn::assistant("welcome"),
            ConversationTurn::user("first"),
            ConversationTurn::user("second"),
            ConversationTurn::assistant("reply"),
        ];

        let repaired = repair_history(&turns);

        assert_eq!(
            repaired,
            vec![
                ConversationTurn::user("first"),
                ConversationTurn::assistant("reply"),
            ]
        );
    }

    #[test]
    fn test_consecutive_assistant_turns_keep_first() {
        let turns = vec![
            ConversationTurn::user("q"),
            ConversationTurn::assistant("a1"),
            ConversationTurn::assistant("a2"),
            ConversationTurn::user("q2"),
        ];

        let repaired = repair_history(&turns);

        assert_eq!(speakers(&repaired), vec![Speaker::User, Speaker::Assistant, Speaker::User]);
        assert_eq!(repaired[1].text, "a1");
    }

    #[test]
    fn test_empty_history() {
        assert!(repair_history(&[]).is_empty());
        assert!(prepare_history(&[]).is_empty());
    }

    #[test]
    fn test_prepare_drops_trailing_user_turn() {
        let turns = vec![
            ConversationTurn::user("q1"),
            ConversationTurn::assistant("a1"),
            ConversationTurn::user("q2 (about to be resent)"),
        ];

        let history = prepare_history(&turns);

        assert_eq!(speakers(&history), vec![Speaker::User, Speaker::Assistant]);
    }

    #[test]
    fn test_prepare_keeps_history_ending_on_assistant() {
        let turns = vec![ConversationTurn::user("q1"), ConversationTurn::assistant("a1")];
        assert_eq!(prepare_history(&turns), turns);
    }

    #[test]
    fn test_only_assistant_turns_yield_empty_history() {
        let turns = vec![
            ConversationTurn::assistant("hello"),
            ConversationTurn::assistant("anyone?"),
        ];
        assert!(repair_history(&turns).is_empty());
    }
}
