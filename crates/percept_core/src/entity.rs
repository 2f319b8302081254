//! Entity identity
//!
//! Every tracked object is addressed by an [`EntityId`]. Per-entity tables
//! (requests, hypotheses, refresh flags) are dense arrays indexed by
//! [`EntityId::index`]: 0 = ball, 1..=11 teammates, 12..=22 opponents.

use serde::{Deserialize, Serialize};

use crate::error::{PerceptError, Result};

/// Players per side.
pub const TEAM_SIZE: usize = 11;

/// Ball + both teams.
pub const ENTITY_COUNT: usize = TEAM_SIZE * 2 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Teammate,
    Opponent,
}

/// Ball or player (uniform number 1..=TEAM_SIZE).
///
/// Build player ids through [`EntityId::teammate`] / [`EntityId::opponent`] so
/// the uniform number is checked once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityId {
    Ball,
    Teammate(u8),
    Opponent(u8),
}

impl EntityId {
    pub fn teammate(unum: u8) -> Result<Self> {
        Self::player(Side::Teammate, unum)
    }

    pub fn opponent(unum: u8) -> Result<Self> {
        Self::player(Side::Opponent, unum)
    }

    pub fn player(side: Side, unum: u8) -> Result<Self> {
        if unum == 0 || unum as usize > TEAM_SIZE {
            return Err(PerceptError::UnknownEntity { side, unum });
        }
        Ok(match side {
            Side::Teammate => EntityId::Teammate(unum),
            Side::Opponent => EntityId::Opponent(unum),
        })
    }

    /// Dense table index.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            EntityId::Ball => 0,
            EntityId::Teammate(u) => u as usize,
            EntityId::Opponent(u) => TEAM_SIZE + u as usize,
        }
    }

    /// [`EntityId::index`] for ids that exist in a match; `None` for uniform
    /// numbers outside `1..=TEAM_SIZE`, which would alias another slot.
    #[inline]
    pub fn slot(self) -> Option<usize> {
        match self.unum() {
            Some(u) if u == 0 || u as usize > TEAM_SIZE => None,
            _ => Some(self.index()),
        }
    }

    /// Inverse of [`EntityId::index`].
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(EntityId::Ball),
            i if i <= TEAM_SIZE => Some(EntityId::Teammate(i as u8)),
            i if i < ENTITY_COUNT => Some(EntityId::Opponent((i - TEAM_SIZE) as u8)),
            _ => None,
        }
    }

    pub fn is_ball(self) -> bool {
        matches!(self, EntityId::Ball)
    }

    pub fn unum(self) -> Option<u8> {
        match self {
            EntityId::Ball => None,
            EntityId::Teammate(u) | EntityId::Opponent(u) => Some(u),
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            EntityId::Ball => None,
            EntityId::Teammate(_) => Some(Side::Teammate),
            EntityId::Opponent(_) => Some(Side::Opponent),
        }
    }

    /// All ids in index order.
    pub fn all() -> impl Iterator<Item = EntityId> {
        (0..ENTITY_COUNT).filter_map(EntityId::from_index)
    }

    /// All player ids (both sides), index order.
    pub fn players() -> impl Iterator<Item = EntityId> {
        (1..ENTITY_COUNT).filter_map(EntityId::from_index)
    }

    pub fn teammates() -> impl Iterator<Item = EntityId> {
        (1..=TEAM_SIZE as u8).map(EntityId::Teammate)
    }

    pub fn opponents() -> impl Iterator<Item = EntityId> {
        (1..=TEAM_SIZE as u8).map(EntityId::Opponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_covers_all_slots() {
        let ids: Vec<_> = EntityId::all().collect();
        assert_eq!(ids.len(), ENTITY_COUNT);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
        assert_eq!(EntityId::from_index(ENTITY_COUNT), None);
    }

    #[test]
    fn test_player_constructor_rejects_bad_unum() {
        assert!(EntityId::teammate(0).is_err());
        assert!(EntityId::opponent(12).is_err());
        assert_eq!(EntityId::opponent(11).unwrap(), EntityId::Opponent(11));
        assert_eq!(EntityId::Opponent(11).index(), ENTITY_COUNT - 1);
    }

    #[test]
    fn test_slot_rejects_aliasing_ids() {
        assert_eq!(EntityId::Ball.slot(), Some(0));
        assert_eq!(EntityId::Opponent(4).slot(), Some(15));
        assert_eq!(EntityId::Teammate(15).slot(), None);
        assert_eq!(EntityId::Opponent(0).slot(), None);
    }

    #[test]
    fn test_players_excludes_ball() {
        assert!(EntityId::players().all(|id| !id.is_ball()));
        assert_eq!(EntityId::players().count(), TEAM_SIZE * 2);
    }
}
