//! Unipolar stepper driver
//!
//! Drives a 4-coil unipolar stepper (28BYJ-48 through a ULN2003 array)
//! directly from four GPIO pins using the 8-phase half-step sequence. Each
//! call to [`MotionDriver::advance`] moves one phase, so the step rate is
//! the caller's poll rate.

use curtain_core::traits::{Direction, MotionDriver};
use embedded_hal::digital::OutputPin;

/// Coil pattern per half-step phase, as (A, B, C, D)
pub const HALF_STEP_SEQUENCE: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// Half-step driver over four coil pins
pub struct UnipolarStepper<A, B, C, D> {
    a: A,
    b: B,
    c: C,
    d: D,
    /// Index into [`HALF_STEP_SEQUENCE`]
    phase: usize,
    remaining: u32,
    direction: Direction,
    /// Walk the sequence forward to open
    open_clockwise: bool,
    energized: bool,
}

impl<A, B, C, D> UnipolarStepper<A, B, C, D>
where
    A: OutputPin,
    B: OutputPin,
    C: OutputPin,
    D: OutputPin,
{
    /// Create a driver with all coils off
    ///
    /// `open_clockwise` selects which way the sequence is walked when
    /// opening, which is also the way the motor runs to find the home
    /// switch.
    pub fn new(a: A, b: B, c: C, d: D, open_clockwise: bool) -> Self {
        let mut stepper = Self {
            a,
            b,
            c,
            d,
            phase: 0,
            remaining: 0,
            direction: Direction::Open,
            open_clockwise,
            energized: false,
        };
        stepper.release();
        stepper
    }

    /// Current phase index
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Check if any coil is driven
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// Consume the driver and return its pins
    pub fn release_pins(self) -> (A, B, C, D) {
        (self.a, self.b, self.c, self.d)
    }

    fn clockwise(&self) -> bool {
        (self.direction == Direction::Open) == self.open_clockwise
    }

    fn energize(&mut self) {
        let [a, b, c, d] = HALF_STEP_SEQUENCE[self.phase];
        set(&mut self.a, a);
        set(&mut self.b, b);
        set(&mut self.c, c);
        set(&mut self.d, d);
        self.energized = true;
    }

    /// Switch every coil off
    fn release(&mut self) {
        set(&mut self.a, false);
        set(&mut self.b, false);
        set(&mut self.c, false);
        set(&mut self.d, false);
        self.energized = false;
    }
}

/// Drive a coil pin; target GPIO writes are infallible
fn set<P: OutputPin>(pin: &mut P, high: bool) {
    let _ = if high { pin.set_high() } else { pin.set_low() };
}

impl<A, B, C, D> MotionDriver for UnipolarStepper<A, B, C, D>
where
    A: OutputPin,
    B: OutputPin,
    C: OutputPin,
    D: OutputPin,
{
    fn begin_move(&mut self, direction: Direction, steps: u32) {
        self.direction = direction;
        self.remaining = steps;
    }

    fn advance(&mut self) -> u32 {
        if self.remaining == 0 {
            return 0;
        }

        let len = HALF_STEP_SEQUENCE.len();
        self.phase = if self.clockwise() {
            (self.phase + 1) % len
        } else {
            (self.phase + len - 1) % len
        };
        self.energize();
        self.remaining -= 1;
        self.remaining
    }

    fn steps_remaining(&self) -> u32 {
        self.remaining
    }

    fn halt(&mut self) {
        self.remaining = 0;
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Mock GPIO pin that records its level in a shared cell
    struct MockPin<'a> {
        level: &'a Cell<bool>,
    }

    impl ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.level.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.level.set(true);
            Ok(())
        }
    }

    struct Coils {
        levels: [Cell<bool>; 4],
    }

    impl Coils {
        fn new() -> Self {
            Self {
                levels: [
                    Cell::new(true),
                    Cell::new(true),
                    Cell::new(true),
                    Cell::new(true),
                ],
            }
        }

        fn stepper(
            &self,
            open_clockwise: bool,
        ) -> UnipolarStepper<MockPin<'_>, MockPin<'_>, MockPin<'_>, MockPin<'_>> {
            UnipolarStepper::new(
                MockPin {
                    level: &self.levels[0],
                },
                MockPin {
                    level: &self.levels[1],
                },
                MockPin {
                    level: &self.levels[2],
                },
                MockPin {
                    level: &self.levels[3],
                },
                open_clockwise,
            )
        }

        fn pattern(&self) -> [bool; 4] {
            [
                self.levels[0].get(),
                self.levels[1].get(),
                self.levels[2].get(),
                self.levels[3].get(),
            ]
        }
    }

    #[test]
    fn test_starts_released() {
        let coils = Coils::new();
        let stepper = coils.stepper(true);
        assert_eq!(coils.pattern(), [false; 4]);
        assert!(!stepper.is_energized());
        assert_eq!(stepper.steps_remaining(), 0);
    }

    #[test]
    fn test_advance_counts_down() {
        let coils = Coils::new();
        let mut stepper = coils.stepper(true);
        stepper.begin_move(Direction::Close, 3);

        assert_eq!(stepper.advance(), 2);
        assert_eq!(stepper.advance(), 1);
        assert_eq!(stepper.advance(), 0);
        assert_eq!(stepper.advance(), 0);
        assert!(!stepper.is_busy());
    }

    #[test]
    fn test_open_walks_sequence_forward() {
        let coils = Coils::new();
        let mut stepper = coils.stepper(true);
        stepper.begin_move(Direction::Open, 8);

        for expected in 1..=8 {
            stepper.advance();
            let phase = expected % 8;
            assert_eq!(stepper.phase(), phase);
            assert_eq!(coils.pattern(), HALF_STEP_SEQUENCE[phase]);
        }
    }

    #[test]
    fn test_close_walks_sequence_backward() {
        let coils = Coils::new();
        let mut stepper = coils.stepper(true);
        stepper.begin_move(Direction::Close, 2);

        stepper.advance();
        assert_eq!(stepper.phase(), 7);
        stepper.advance();
        assert_eq!(stepper.phase(), 6);
        assert_eq!(coils.pattern(), HALF_STEP_SEQUENCE[6]);
    }

    #[test]
    fn test_reversed_polarity() {
        let coils = Coils::new();
        let mut stepper = coils.stepper(false);
        stepper.begin_move(Direction::Open, 1);
        stepper.advance();
        assert_eq!(stepper.phase(), 7);
    }

    #[test]
    fn test_halt_releases_coils() {
        let coils = Coils::new();
        let mut stepper = coils.stepper(true);
        stepper.begin_move(Direction::Open, 100);
        stepper.advance();
        assert!(stepper.is_energized());

        stepper.halt();
        assert_eq!(stepper.steps_remaining(), 0);
        assert_eq!(coils.pattern(), [false; 4]);
        assert!(!stepper.is_energized());
    }

    #[test]
    fn test_phase_kept_across_moves() {
        let coils = Coils::new();
        let mut stepper = coils.stepper(true);
        stepper.begin_move(Direction::Open, 3);
        while stepper.advance() > 0 {}
        stepper.halt();

        stepper.begin_move(Direction::Close, 1);
        stepper.advance();
        assert_eq!(stepper.phase(), 2);
    }

    #[test]
    fn test_sequence_adjacent_phases_share_a_coil() {
        for i in 0..HALF_STEP_SEQUENCE.len() {
            let current = HALF_STEP_SEQUENCE[i];
            let next = HALF_STEP_SEQUENCE[(i + 1) % HALF_STEP_SEQUENCE.len()];
            assert!(current.iter().zip(next.iter()).any(|(a, b)| *a && *b));
        }
    }
}
