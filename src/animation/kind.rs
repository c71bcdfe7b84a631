use std::fmt;
use std::str::FromStr;

/// Every animation the character knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimationKind {
    Idle,
    Arrive,
    Goodbye,
    Backflip,
    Glasses,
    Wave,
    Talking,
    /// Single default frame shown before anything else is loaded.
    Nothing,
    Curse,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 9] = [
        AnimationKind::Idle,
        AnimationKind::Arrive,
        AnimationKind::Goodbye,
        AnimationKind::Backflip,
        AnimationKind::Glasses,
        AnimationKind::Wave,
        AnimationKind::Talking,
        AnimationKind::Nothing,
        AnimationKind::Curse,
    ];

    /// One-shot animations a reply can request, in playback order.
    pub const FLAGGED: [AnimationKind; 4] = [
        AnimationKind::Wave,
        AnimationKind::Backflip,
        AnimationKind::Glasses,
        AnimationKind::Goodbye,
    ];

    /// Asset directory name, also the JSON flag name for flagged animations.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Arrive => "arrive",
            Self::Goodbye => "goodbye",
            Self::Backflip => "backflip",
            Self::Glasses => "glasses",
            Self::Wave => "wave",
            Self::Talking => "talking",
            Self::Nothing => "nothing",
            Self::Curse => "curse",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| format!("Unknown animation: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::AnimationKind;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in AnimationKind::ALL {
            assert_eq!(kind.name().parse::<AnimationKind>(), Ok(kind));
        }
        assert!("moonwalk".parse::<AnimationKind>().is_err());
    }
}
