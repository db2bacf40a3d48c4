//! Polyglot `.bin` entry layout.
//!
//! Each entry is 16 bytes, big-endian: a 64-bit position key, a 16-bit move,
//! a 16-bit weight and a 32-bit learn field. Files are sorted by key.

use shakmaty::{Move, Role, Square};

pub const ENTRY_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub key: u64,
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    pub fn parse(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut key = [0u8; 8];
        key.copy_from_slice(&bytes[0..8]);
        let mut learn = [0u8; 4];
        learn.copy_from_slice(&bytes[12..16]);

        Self {
            key: u64::from_be_bytes(key),
            raw_move: u16::from_be_bytes([bytes[8], bytes[9]]),
            weight: u16::from_be_bytes([bytes[10], bytes[11]]),
            learn: u32::from_be_bytes(learn),
        }
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        bytes[0..8].copy_from_slice(&self.key.to_be_bytes());
        bytes[8..10].copy_from_slice(&self.raw_move.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.weight.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.learn.to_be_bytes());
        bytes
    }

    pub fn book_move(&self) -> BookMove {
        BookMove::decode(self.raw_move)
    }
}

/// A move as stored in the book. Castling is stored as the king moving onto
/// its own rook, which is also how `shakmaty` reports the target of a castle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl BookMove {
    pub fn decode(raw: u16) -> Self {
        let field = |shift: u16| u32::from((raw >> shift) & 0x7);

        let to = Square::new(field(3) * 8 + field(0));
        let from = Square::new(field(9) * 8 + field(6));
        let promotion = match field(12) {
            1 => Some(Role::Knight),
            2 => Some(Role::Bishop),
            3 => Some(Role::Rook),
            4 => Some(Role::Queen),
            _ => None,
        };

        Self {
            from,
            to,
            promotion,
        }
    }

    pub fn matches(&self, chess_move: &Move) -> bool {
        chess_move.from() == Some(self.from)
            && chess_move.to() == self.to
            && chess_move.promotion() == self.promotion
    }
}
