//! Sprite evaluation, per-scanline fetch buffers, and the eight-slot sprite
//! pixel pipeline.

use bitflags::bitflags;

bitflags! {
    /// OAM byte 2 attribute bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE         = 0b0000_0011;
        const PRIORITY_BEHIND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL   = 0b1000_0000;
    }
}

impl Default for SpriteAttributes {
    fn default() -> Self {
        Self::empty()
    }
}

/// Incremental sprite evaluation over dots 65-256 of a visible scanline.
///
/// Hardware walks primary OAM at roughly two dots per step. The evaluation
/// here advances one sprite per odd step-pair: read Y, range-test it against
/// the next scanline, and either copy the sprite into secondary OAM or move
/// on. The ninth in-range sprite sets the overflow flag (the hardware's
/// diagonal OAM-index bug is not modelled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteEvaluation {
    /// Next primary OAM index to examine (0..64).
    pub(crate) n: u8,
    /// Sprites accepted so far (0..=8).
    pub(crate) count: u8,
    /// Sprite 0 was accepted for the next scanline.
    pub(crate) sprite0_in_range: bool,
    /// Evaluation found a ninth in-range sprite.
    pub(crate) overflow: bool,
}

impl SpriteEvaluation {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Sprite bytes and pattern rows fetched during dots 257-320, staged for the
/// next scanline's pipeline load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteLine {
    pub(crate) count: u8,
    pub(crate) sprite0_present: bool,
    pub(crate) attributes: [u8; 8],
    pub(crate) x: [u8; 8],
    pub(crate) pattern_low: [u8; 8],
    pub(crate) pattern_high: [u8; 8],
}

impl SpriteLine {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A single sprite slot active on the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct SpriteSlot {
    pattern_low: u8,
    pattern_high: u8,
    attributes: SpriteAttributes,
    x_counter: u8,
    sprite0: bool,
}

/// Sprite pixel information produced for a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePixel {
    /// Sprite palette select (0..=3).
    pub(crate) palette: u8,
    /// Color index within the palette (0 means transparent).
    pub(crate) color: u8,
    /// Sprite is drawn behind an opaque background.
    pub(crate) behind_background: bool,
    /// Pixel came from OAM sprite 0.
    pub(crate) is_sprite0: bool,
}

/// The eight sprite slots for the scanline currently being drawn.
///
/// Each slot has two pattern shifters and an X counter; once the counter
/// expires the shifters advance one bit per dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePipeline {
    slots: [SpriteSlot; 8],
    active: u8,
}

impl SpritePipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Loads the staged sprite line at the start of a scanline.
    ///
    /// Horizontally flipped sprites have their bitplanes reversed here so
    /// left-shifting always walks screen pixels left to right.
    pub(crate) fn load_line(&mut self, line: &SpriteLine) {
        self.clear();
        self.active = line.count.min(8);

        for i in 0..self.active as usize {
            let attributes = SpriteAttributes::from_bits_retain(line.attributes[i]);
            let mut low = line.pattern_low[i];
            let mut high = line.pattern_high[i];
            if attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
                low = low.reverse_bits();
                high = high.reverse_bits();
            }

            self.slots[i] = SpriteSlot {
                pattern_low: low,
                pattern_high: high,
                attributes,
                x_counter: line.x[i],
                sprite0: line.sprite0_present && i == 0,
            };
        }
    }

    /// Samples the highest-priority opaque sprite pixel and advances the
    /// active shifters by one dot.
    ///
    /// Walks the slots in OAM order: the first opaque pixel wins regardless
    /// of priority bits (priority only matters against the background).
    pub(crate) fn sample_and_shift(&mut self) -> SpritePixel {
        let mut chosen: Option<SpritePixel> = None;

        for slot in self.slots.iter_mut().take(self.active as usize) {
            if slot.x_counter > 0 {
                slot.x_counter -= 1;
                continue;
            }

            let bit0 = (slot.pattern_low >> 7) & 1;
            let bit1 = (slot.pattern_high >> 7) & 1;
            let color = (bit1 << 1) | bit0;

            if chosen.is_none() && color != 0 {
                chosen = Some(SpritePixel {
                    palette: (slot.attributes & SpriteAttributes::PALETTE).bits(),
                    color,
                    behind_background: slot
                        .attributes
                        .contains(SpriteAttributes::PRIORITY_BEHIND),
                    is_sprite0: slot.sprite0,
                });
            }

            slot.pattern_low <<= 1;
            slot.pattern_high <<= 1;
        }

        chosen.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_one_sprite(x: u8, attributes: u8, low: u8, high: u8) -> SpriteLine {
        let mut line = SpriteLine::default();
        line.count = 1;
        line.sprite0_present = true;
        line.attributes[0] = attributes;
        line.x[0] = x;
        line.pattern_low[0] = low;
        line.pattern_high[0] = high;
        line
    }

    #[test]
    fn x_counter_delays_output() {
        let mut pipeline = SpritePipeline::new();
        pipeline.load_line(&line_with_one_sprite(2, 0, 0x80, 0x00));

        assert_eq!(pipeline.sample_and_shift().color, 0);
        assert_eq!(pipeline.sample_and_shift().color, 0);
        let pixel = pipeline.sample_and_shift();
        assert_eq!(pixel.color, 1);
        assert!(pixel.is_sprite0);
    }

    #[test]
    fn horizontal_flip_reverses_bit_order() {
        let mut pipeline = SpritePipeline::new();
        let flip = SpriteAttributes::FLIP_HORIZONTAL.bits();
        pipeline.load_line(&line_with_one_sprite(0, flip, 0b0000_0001, 0));

        let pixel = pipeline.sample_and_shift();
        assert_eq!(pixel.color, 1);
    }

    #[test]
    fn first_opaque_slot_wins() {
        let mut line = SpriteLine::default();
        line.count = 2;
        line.attributes = [0b01, 0b10, 0, 0, 0, 0, 0, 0];
        line.pattern_low = [0x00, 0xFF, 0, 0, 0, 0, 0, 0];
        line.pattern_high = [0xFF, 0xFF, 0, 0, 0, 0, 0, 0];

        let mut pipeline = SpritePipeline::new();
        pipeline.load_line(&line);
        let pixel = pipeline.sample_and_shift();
        // Slot 0 is opaque (color 2), so slot 1's color 3 must not show.
        assert_eq!(pixel.color, 2);
        assert_eq!(pixel.palette, 0b01);
    }

    #[test]
    fn behind_background_bit_is_reported() {
        let mut pipeline = SpritePipeline::new();
        let behind = SpriteAttributes::PRIORITY_BEHIND.bits();
        pipeline.load_line(&line_with_one_sprite(0, behind, 0x80, 0x00));
        assert!(pipeline.sample_and_shift().behind_background);
    }
}
