//! Pure game policies: guess evaluation and master rotation.
//!
//! Both functions are side-effect free. The room entity calls them as the
//! single source of truth; nothing else decides correctness or rotation.

use super::{
    entity::RoomMember,
    value_object::{Answer, Guess, PlayerId},
};

/// Outcome of evaluating a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

/// Compare a submission against the stored answer.
///
/// Case-insensitive; leading/trailing whitespace on the submission is
/// ignored. The answer is already normalized at construction.
pub fn evaluate_guess(answer: &Answer, guess: &Guess) -> GuessOutcome {
    if guess.as_str().trim().to_lowercase() == answer.as_str() {
        GuessOutcome::Correct
    } else {
        GuessOutcome::Incorrect
    }
}

/// Select the next game master from the roster.
///
/// The roster's join order is the stable ordering: the member immediately
/// after `current` wins, wrapping to the first after the last. When
/// `current` is not rostered (departed, or an inconsistent master id being
/// healed) the first member is selected. `None` only on an empty roster.
pub fn next_master(roster: &[RoomMember], current: &PlayerId) -> Option<PlayerId> {
    if roster.is_empty() {
        return None;
    }
    let next = match roster.iter().position(|m| &m.id == current) {
        Some(idx) => (idx + 1) % roster.len(),
        None => 0,
    };
    Some(roster[next].id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Player, RoomMember};
    use crate::domain::value_object::PlayerId;

    fn member(id: &str) -> RoomMember {
        let player_id = PlayerId::new(id.to_string()).unwrap();
        let name = Player::default_display_name(&player_id);
        RoomMember::from_player(&Player::new(player_id, name), false)
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id.to_string()).unwrap()
    }

    fn answer(s: &str) -> Answer {
        Answer::new(s.to_string()).unwrap()
    }

    fn guess(s: &str) -> Guess {
        Guess::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_evaluate_guess_ignores_case_and_whitespace() {
        // テスト項目: 大文字小文字と前後空白を無視して比較する
        // then (期待する結果):
        assert_eq!(
            evaluate_guess(&answer("Piano"), &guess(" piano ")),
            GuessOutcome::Correct
        );
        assert_eq!(
            evaluate_guess(&answer("  4 "), &guess("4")),
            GuessOutcome::Correct
        );
    }

    #[test]
    fn test_evaluate_guess_incorrect() {
        // テスト項目: 一致しない推測は不正解
        // then (期待する結果):
        assert_eq!(
            evaluate_guess(&answer("piano"), &guess("pianos")),
            GuessOutcome::Incorrect
        );
    }

    #[test]
    fn test_next_master_is_cyclic() {
        // テスト項目: [A, B, C] で B の次は C、C の次は A に戻る
        // given (前提条件):
        let roster = vec![member("a"), member("b"), member("c")];

        // then (期待する結果):
        assert_eq!(next_master(&roster, &pid("b")), Some(pid("c")));
        assert_eq!(next_master(&roster, &pid("c")), Some(pid("a")));
    }

    #[test]
    fn test_next_master_absent_current_selects_first() {
        // テスト項目: 現マスターがロスターにいなければ先頭を選ぶ
        // given (前提条件):
        let roster = vec![member("a"), member("b"), member("c")];

        // then (期待する結果):
        assert_eq!(next_master(&roster, &pid("departed")), Some(pid("a")));
    }

    #[test]
    fn test_next_master_single_member() {
        // テスト項目: 一人だけのロスターでは同じメンバーが選ばれ続ける
        // given (前提条件):
        let roster = vec![member("a")];

        // then (期待する結果):
        assert_eq!(next_master(&roster, &pid("a")), Some(pid("a")));
    }

    #[test]
    fn test_next_master_empty_roster() {
        // テスト項目: 空のロスターでは None（呼び出し側が防ぐ前提）
        // then (期待する結果):
        assert_eq!(next_master(&[], &pid("a")), None);
    }
}
