//! Domain factories for generating identifiers.

use rand::Rng;

use super::value_object::{PlayerId, RoomCode, ROOM_CODE_LEN};

/// Factory for generating PlayerId instances.
///
/// Encapsulates id generation, separating the generation concern from the
/// validation logic in PlayerId.
pub struct PlayerIdFactory;

impl PlayerIdFactory {
    /// Generate a new PlayerId from a random UUID v4.
    pub fn generate() -> PlayerId {
        let uuid = uuid::Uuid::new_v4();
        PlayerId::new(uuid.to_string()).expect("uuid string satisfies PlayerId validation")
    }
}

/// Factory for generating RoomCode instances.
///
/// Codes are six characters drawn from `A-Z0-9`. Uniqueness is not
/// guaranteed here; the store rejects collisions and the caller
/// regenerates.
pub struct RoomCodeFactory;

const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl RoomCodeFactory {
    /// Generate a new random RoomCode.
    pub fn generate() -> RoomCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
            .collect();
        RoomCode::new(code).expect("generated code matches the room code format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_factory_generate() {
        // テスト項目: UUID v4 形式のプレイヤー ID を生成できる
        // when (操作):
        let id = PlayerIdFactory::generate();

        // then (期待する結果): UUID v4 の標準長（ハイフン含む）
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn test_player_id_factory_generate_uniqueness() {
        // テスト項目: 毎回異なる ID を生成する
        // when (操作):
        let id1 = PlayerIdFactory::generate();
        let id2 = PlayerIdFactory::generate();

        // then (期待する結果):
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_room_code_factory_generate_format() {
        // テスト項目: 生成されたコードは 6 文字の英大文字・数字のみ
        // when (操作):
        let code = RoomCodeFactory::generate();

        // then (期待する結果):
        assert_eq!(code.as_str().len(), 6);
        assert!(code
            .as_str()
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
