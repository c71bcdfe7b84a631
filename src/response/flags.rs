use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::animation::AnimationKind;

/// Which one-shot animations a reply asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationFlags {
    pub wave: bool,
    pub backflip: bool,
    pub glasses: bool,
    pub goodbye: bool,
}

impl AnimationFlags {
    /// Reads the four flags from a JSON object. Unknown keys are ignored,
    /// missing or non-boolean values count as false.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let flag = |key: &str| object.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            wave: flag("wave"),
            backflip: flag("backflip"),
            glasses: flag("glasses"),
            goodbye: flag("goodbye"),
        }
    }

    /// Independent draws for each flag, used when the reply carried no JSON.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, odds: &FallbackOdds) -> Self {
        Self {
            wave: chance(rng, odds.wave),
            backflip: chance(rng, odds.backflip),
            glasses: chance(rng, odds.glasses),
            goodbye: chance(rng, odds.goodbye),
        }
    }

    pub fn is_set(&self, kind: AnimationKind) -> bool {
        match kind {
            AnimationKind::Wave => self.wave,
            AnimationKind::Backflip => self.backflip,
            AnimationKind::Glasses => self.glasses,
            AnimationKind::Goodbye => self.goodbye,
            _ => false,
        }
    }

    /// Flagged animations in playback order: wave, backflip, glasses, goodbye.
    pub fn queued(&self) -> Vec<AnimationKind> {
        AnimationKind::FLAGGED
            .into_iter()
            .filter(|kind| self.is_set(*kind))
            .collect()
    }

    pub fn any(&self) -> bool {
        self.wave || self.backflip || self.glasses || self.goodbye
    }
}

/// Probability of each flag when a reply has to be decorated at random.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackOdds {
    pub wave: f64,
    pub backflip: f64,
    pub glasses: f64,
    pub goodbye: f64,
}

impl Default for FallbackOdds {
    fn default() -> Self {
        Self {
            wave: 0.3,
            backflip: 0.2,
            glasses: 0.25,
            goodbye: 0.0,
        }
    }
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if probability.is_nan() || probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.gen_bool(probability)
    }
}
