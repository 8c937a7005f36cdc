//! Combatant identity as seen by the turn bookkeeping.
//!
//! The host owns combatants; the tracker only needs a stable, structurally
//! comparable key for each of them. Party members are keyed by their actor id
//! and troop members by their slot index in the troop.

use core::fmt;

/// Database identifier of a party member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u16);

/// Slot index of a troop member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyIndex(pub u16);

/// A combatant taking part in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    Actor(ActorId),
    Enemy(EnemyIndex),
}

/// Which side of the battle a subject fights on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubjectKind {
    Actor,
    Enemy,
}

impl Subject {
    pub const fn actor(id: u16) -> Self {
        Self::Actor(ActorId(id))
    }

    pub const fn enemy(index: u16) -> Self {
        Self::Enemy(EnemyIndex(index))
    }

    pub const fn kind(&self) -> SubjectKind {
        match self {
            Self::Actor(_) => SubjectKind::Actor,
            Self::Enemy(_) => SubjectKind::Enemy,
        }
    }

    pub const fn is_actor(&self) -> bool {
        matches!(self, Self::Actor(_))
    }

    pub const fn is_enemy(&self) -> bool {
        matches!(self, Self::Enemy(_))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor(ActorId(id)) => write!(f, "actor#{id}"),
            Self::Enemy(EnemyIndex(index)) => write!(f, "enemy#{index}"),
        }
    }
}
