use serde::{Deserialize, Serialize};

/// Raw per-tick input as the host samples it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub move_x: f32,
    pub move_y: f32,
    pub fire_held: bool,
}

impl FrameInput {
    pub const IDLE: Self = Self {
        move_x: 0.0,
        move_y: 0.0,
        fire_held: false,
    };

    pub fn new(move_x: f32, move_y: f32, fire_held: bool) -> Self {
        Self {
            move_x,
            move_y,
            fire_held,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DirectionFlags {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DirectionFlags {
    /// Only the sign of each axis matters; magnitude is ignored.
    pub fn from_axes(move_x: f32, move_y: f32) -> Self {
        Self {
            left: move_x < 0.0,
            right: move_x > 0.0,
            up: move_y > 0.0,
            down: move_y < 0.0,
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FireLatch {
    #[default]
    Ready,
    Firing,
    Held,
}

impl FireLatch {
    /// Advances the latch for one input sample and reports whether this sample is a fresh press.
    pub fn advance(&mut self, fire_held: bool) -> bool {
        let (next, fired) = match (*self, fire_held) {
            (_, false) => (Self::Ready, false),
            (Self::Ready, true) => (Self::Firing, true),
            (Self::Firing | Self::Held, true) => (Self::Held, false),
        };
        *self = next;
        fired
    }
}

#[inline]
pub fn encode_input_byte(input: FrameInput) -> u8 {
    let flags = DirectionFlags::from_axes(input.move_x, input.move_y);
    (if flags.left { 0x01 } else { 0 })
        | (if flags.right { 0x02 } else { 0 })
        | (if flags.up { 0x04 } else { 0 })
        | (if flags.down { 0x08 } else { 0 })
        | (if input.fire_held { 0x10 } else { 0 })
}

#[inline]
pub fn decode_input_byte(byte: u8) -> FrameInput {
    let axis = |negative: u8, positive: u8| {
        let mut value = 0.0;
        if (byte & negative) != 0 {
            value -= 1.0;
        }
        if (byte & positive) != 0 {
            value += 1.0;
        }
        value
    };
    FrameInput {
        move_x: axis(0x01, 0x02),
        move_y: axis(0x08, 0x04),
        fire_held: (byte & 0x10) != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_threshold_by_sign() {
        let flags = DirectionFlags::from_axes(0.2, -0.9);
        assert!(flags.right && !flags.left);
        assert!(flags.down && !flags.up);
        assert!(!DirectionFlags::from_axes(0.0, 0.0).any());
    }

    #[test]
    fn latch_fires_once_per_press() {
        let mut latch = FireLatch::default();
        let presses = [true, true, true, false, true, false, false, true];
        let fired: Vec<bool> = presses.iter().map(|held| latch.advance(*held)).collect();
        assert_eq!(
            fired,
            vec![true, false, false, false, true, false, false, true]
        );
        assert_eq!(latch, FireLatch::Firing);
    }

    #[test]
    fn latch_walks_ready_firing_held() {
        let mut latch = FireLatch::Ready;
        latch.advance(true);
        assert_eq!(latch, FireLatch::Firing);
        latch.advance(true);
        assert_eq!(latch, FireLatch::Held);
        latch.advance(false);
        assert_eq!(latch, FireLatch::Ready);
    }

    #[test]
    fn input_byte_keeps_direction_and_fire() {
        let input = FrameInput::new(-1.0, 1.0, true);
        let byte = encode_input_byte(input);
        assert_eq!(byte, 0x01 | 0x04 | 0x10);
        assert_eq!(decode_input_byte(byte), input);
        assert_eq!(decode_input_byte(0x03).move_x, 0.0);
    }
}
