bitflags::bitflags! {
    /// Per-round tracker flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RoundFlags: u8 {
        /// The round's end-of-turn routine has not run yet.
        const TURN_END_PENDING = 1 << 0;
        /// A subject's final action was detected and its resolution is pending.
        const LAST_ACTION = 1 << 1;
    }
}

impl RoundFlags {
    /// Flags at the start of every round.
    pub const fn round_start() -> Self {
        Self::TURN_END_PENDING
    }

    pub const fn turn_end_pending(&self) -> bool {
        self.contains(Self::TURN_END_PENDING)
    }

    pub const fn last_action(&self) -> bool {
        self.contains(Self::LAST_ACTION)
    }
}
