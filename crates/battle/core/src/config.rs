/// How the forced-end corrective pass treats members already resolved this round.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CorrectivePolicy {
    /// Only members whose end-of-turn resolution has not fired yet are corrected.
    /// Keeps the per-round resolution count at exactly one.
    #[default]
    UnresolvedOnly,

    /// Every battle member is corrected, including ones resolved earlier in the
    /// round. Those members have their statuses decremented twice.
    AllMembers,
}

/// Tracker configuration constants and tunable parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerConfig {
    pub corrective_policy: CorrectivePolicy,
}

impl TrackerConfig {
    // ===== compile-time constants =====
    /// Maximum number of timed statuses a single combatant can carry.
    pub const MAX_STATUS_EFFECTS: usize = 8;
    /// Typical party size; used to pre-size the ledger.
    pub const MAX_PARTY_MEMBERS: usize = 4;
    /// Typical troop size; used to pre-size the ledger.
    pub const MAX_TROOP_MEMBERS: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corrective_policy(corrective_policy: CorrectivePolicy) -> Self {
        Self { corrective_policy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_kebab_case() {
        assert_eq!(
            "all-members".parse::<CorrectivePolicy>(),
            Ok(CorrectivePolicy::AllMembers)
        );
        assert_eq!(
            "Unresolved-Only".parse::<CorrectivePolicy>(),
            Ok(CorrectivePolicy::UnresolvedOnly)
        );
        assert!("everyone".parse::<CorrectivePolicy>().is_err());
    }

    #[test]
    fn default_policy_guards_against_double_resolution() {
        assert_eq!(
            TrackerConfig::default().corrective_policy,
            CorrectivePolicy::UnresolvedOnly
        );
    }
}
