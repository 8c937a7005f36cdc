//! Timed statuses carried by battlers.
//!
//! Durations are counted in rounds. A status loses one turn each time its
//! bearer's end-of-turn resolution runs and is removed when it reaches zero.

use arrayvec::ArrayVec;
use battle_core::TrackerConfig;

/// A status with a remaining duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub name: String,
    pub turns_left: u32,
    /// Bearer queues no actions while this status is active.
    pub restricts_action: bool,
}

/// Active statuses on a battler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSet {
    statuses: ArrayVec<Status, { TrackerConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a status. Re-adding an active status keeps the longer duration.
    ///
    /// Statuses beyond capacity are dropped; returns false in that case.
    pub fn add(&mut self, status: Status) -> bool {
        if let Some(existing) = self.statuses.iter_mut().find(|s| s.name == status.name) {
            existing.turns_left = existing.turns_left.max(status.turns_left);
            existing.restricts_action |= status.restricts_action;
            return true;
        }

        if status.turns_left == 0 {
            return true;
        }

        self.statuses.try_push(status).is_ok()
    }

    /// Decrements every status by one turn and removes the expired ones.
    ///
    /// Returns the names of the removed statuses.
    pub fn tick(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        for status in self.statuses.iter_mut() {
            status.turns_left = status.turns_left.saturating_sub(1);
        }
        self.statuses.retain(|status| {
            if status.turns_left == 0 {
                expired.push(status.name.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    pub fn restricts_action(&self) -> bool {
        self.statuses.iter().any(|s| s.restricts_action)
    }

    pub fn turns_left(&self, name: &str) -> Option<u32> {
        self.statuses
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.turns_left)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.statuses.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, turns: u32) -> Status {
        Status {
            name: name.to_string(),
            turns_left: turns,
            restricts_action: false,
        }
    }

    #[test]
    fn tick_expires_statuses_reaching_zero() {
        let mut set = StatusSet::new();
        set.add(status("poison", 2));
        set.add(status("haste", 1));

        assert_eq!(set.tick(), vec!["haste".to_string()]);
        assert_eq!(set.turns_left("poison"), Some(1));
        assert_eq!(set.tick(), vec!["poison".to_string()]);
        assert!(set.is_empty());
    }

    #[test]
    fn re_adding_keeps_longer_duration() {
        let mut set = StatusSet::new();
        set.add(status("poison", 3));
        set.add(status("poison", 1));

        assert_eq!(set.turns_left("poison"), Some(3));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn capacity_is_bounded() {
        let mut set = StatusSet::new();
        for i in 0..TrackerConfig::MAX_STATUS_EFFECTS {
            assert!(set.add(status(&format!("s{i}"), 2)));
        }
        assert!(!set.add(status("overflow", 2)));
    }

    #[test]
    fn restriction_follows_active_statuses() {
        let mut set = StatusSet::new();
        set.add(Status {
            restricts_action: true,
            ..status("stun", 1)
        });
        assert!(set.restricts_action());

        set.tick();
        assert!(!set.restricts_action());
    }
}
