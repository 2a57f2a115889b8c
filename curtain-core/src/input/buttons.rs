//! Button debouncing
//!
//! The open and close buttons are sampled together and reduced to a single
//! [`Button`] combination, which must hold steady for the debounce delay
//! before it is accepted.

use crate::timer::PendingTimer;

/// Debounced button combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Open button only
    Open,
    /// Close button only
    Close,
    /// Both buttons held together
    Both,
    /// Nothing pressed
    None,
}

impl Button {
    /// Combine raw button levels (true = pressed)
    pub fn from_levels(open: bool, close: bool) -> Self {
        match (open, close) {
            (true, false) => Button::Open,
            (false, true) => Button::Close,
            (true, true) => Button::Both,
            (false, false) => Button::None,
        }
    }

    /// Check if any button is down
    pub fn is_pressed(self) -> bool {
        self != Button::None
    }
}

/// Debouncer for the two front-panel buttons
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    delay_ms: u32,
    /// Most recent raw combination
    raw: Button,
    /// Armed at the last raw edge
    edge: PendingTimer,
    debounced: Button,
    last_real: Button,
    last_real_at: Option<u32>,
    press_pending: bool,
}

impl ButtonDebouncer {
    /// Create a debouncer with nothing pressed
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            raw: Button::None,
            edge: PendingTimer::new(),
            debounced: Button::None,
            last_real: Button::None,
            last_real_at: None,
            press_pending: false,
        }
    }

    /// Feed one sample of the raw levels, returning the debounced state
    pub fn update(&mut self, open: bool, close: bool, now: u32) -> Button {
        let current = Button::from_levels(open, close);
        if current != self.raw {
            self.raw = current;
            self.edge.arm(now);
        }

        if self.debounced != self.raw && self.edge.is_due(now, self.delay_ms) {
            self.debounced = self.raw;
            self.edge.disarm();

            if self.raw.is_pressed() {
                self.last_real = self.raw;
                self.last_real_at = Some(now);
                self.press_pending = true;
            }
        }

        self.debounced
    }

    /// Current debounced state
    pub fn state(&self) -> Button {
        self.debounced
    }

    /// Last accepted combination other than [`Button::None`]
    pub fn last_real(&self) -> Button {
        self.last_real
    }

    /// When [`last_real`](Self::last_real) was accepted
    pub fn last_press_time(&self) -> Option<u32> {
        self.last_real_at
    }

    /// Take a newly accepted press, reporting each press once
    pub fn pressed_edge(&mut self) -> Option<Button> {
        if core::mem::take(&mut self.press_pending) {
            Some(self.last_real)
        } else {
            None
        }
    }
}
