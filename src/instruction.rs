//! Per-LED override rules
//!
//! An instruction table lets a keymap paint individual LEDs or whole layers
//! differently from the rotating animation. Rules are checked in order and
//! every matching rule replaces what earlier rules produced, so the last
//! matching rule wins.

use crate::color::{ColorAccumulator, Rgb};
use crate::pattern::{PatternBand, Scroll, evaluate};
use crate::topology::Led;

/// Number of 32-bit words in an [`LedIdSet`]
pub const LED_ID_WORDS: usize = 4;

/// Bitset of 1-based LED ids, one `u32` word per 32 ids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedIdSet([u32; LED_ID_WORDS]);

impl LedIdSet {
    pub const EMPTY: Self = Self([0; LED_ID_WORDS]);

    /// Build a set from raw words, `words[0]` holding ids 1 through 32
    pub const fn from_words(words: [u32; LED_ID_WORDS]) -> Self {
        Self(words)
    }

    pub const fn words(&self) -> [u32; LED_ID_WORDS] {
        self.0
    }

    /// Add an id; ids outside the set's range are ignored
    #[must_use]
    pub const fn with(mut self, id: u8) -> Self {
        if let Some((word, bit)) = Self::locate(id) {
            self.0[word] |= bit;
        }
        self
    }

    /// Add every id in `first..=last`
    #[must_use]
    pub const fn with_range(mut self, first: u8, last: u8) -> Self {
        let mut id = first;
        while id <= last {
            self = self.with(id);
            if id == u8::MAX {
                break;
            }
            id += 1;
        }
        self
    }

    pub const fn contains(&self, id: u8) -> bool {
        match Self::locate(id) {
            Some((word, bit)) => self.0[word] & bit != 0,
            None => false,
        }
    }

    const fn locate(id: u8) -> Option<(usize, u32)> {
        if id == 0 {
            return None;
        }
        let index = (id - 1) as usize;
        let word = index / 32;
        if word >= LED_ID_WORDS {
            return None;
        }
        Some((word, 1 << (index % 32)))
    }
}

/// What a matching rule does to the LED
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstructionAction {
    /// Paint a flat color
    Color(Rgb),
    /// Evaluate a built-in pattern by index
    Pattern(u8),
    /// Evaluate whichever pattern the animation id currently selects
    RotatingPattern,
}

/// One override rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedInstruction {
    /// Only match while this is the highest active layer
    pub layer: Option<u8>,
    /// Only match LEDs whose id is in the set
    pub ids: Option<LedIdSet>,
    pub action: InstructionAction,
}

impl LedInstruction {
    /// A rule matching every LED on every layer
    pub const fn new(action: InstructionAction) -> Self {
        Self {
            layer: None,
            ids: None,
            action,
        }
    }

    #[must_use]
    pub const fn on_layer(mut self, layer: u8) -> Self {
        self.layer = Some(layer);
        self
    }

    #[must_use]
    pub const fn for_ids(mut self, ids: LedIdSet) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Check the layer and id gates for `led`
    pub fn matches(&self, led: &Led, highest_layer: u8) -> bool {
        if self.layer.is_some_and(|layer| layer != highest_layer) {
            return false;
        }
        if self.ids.is_some_and(|ids| !ids.contains(led.id)) {
            return false;
        }
        true
    }
}

/// Index of the most significant set bit of the layer state
///
/// The base layer alone (or no layer at all) yields `0`.
#[allow(clippy::cast_possible_truncation)]
pub const fn highest_active_layer(layer_state: u32) -> u8 {
    if layer_state == 0 {
        return 0;
    }
    (31 - layer_state.leading_zeros()) as u8
}

/// Patterns available while resolving an LED
#[derive(Debug, Clone, Copy)]
pub struct PatternSet<'a> {
    /// Built-in table addressed by [`InstructionAction::Pattern`]
    pub builtin: &'a [&'a [PatternBand]],
    /// The pattern selected by the animation id, if any
    pub rotating: Option<&'a [PatternBand]>,
    pub scroll: Scroll,
}

/// Compute the color contribution of `led` before clamping
///
/// With no instructions the rotating pattern is evaluated directly.
/// Otherwise every rule is visited; a matching rule resets the contribution
/// and applies its action, and rules that do not match leave it alone.
pub fn resolve(
    instructions: &[LedInstruction],
    patterns: &PatternSet<'_>,
    led: &Led,
    highest_layer: u8,
) -> ColorAccumulator {
    let mut acc = ColorAccumulator::ZERO;

    if instructions.is_empty() {
        if let Some(rotating) = patterns.rotating {
            evaluate(rotating, patterns.scroll, led.px, &mut acc);
        }
        return acc;
    }

    for instruction in instructions {
        if !instruction.matches(led, highest_layer) {
            continue;
        }

        acc = ColorAccumulator::ZERO;
        match instruction.action {
            InstructionAction::Color(color) => {
                acc = ColorAccumulator::from(color);
            }
            InstructionAction::Pattern(id) => {
                if let Some(bands) = patterns.builtin.get(usize::from(id)) {
                    evaluate(bands, patterns.scroll, led.px, &mut acc);
                }
            }
            InstructionAction::RotatingPattern => {
                if let Some(rotating) = patterns.rotating {
                    evaluate(rotating, patterns.scroll, led.px, &mut acc);
                }
            }
        }
    }

    acc
}
