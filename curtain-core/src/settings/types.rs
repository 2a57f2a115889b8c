//! Settings value types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest storable away distance (positions are `i32` step counts)
pub const MAX_AWAY: u32 = i32::MAX as u32;

/// Actions a learned remote code can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RemoteAction {
    /// Fully open
    Open,
    /// Fully close
    Close,
    /// Stop the current move
    Cancel,
    /// Toggle dawn/dusk automation
    Autodawn,
    /// Toggle temperature automation
    Autotemp,
}

impl RemoteAction {
    /// All actions, in learning order
    pub const ALL: [RemoteAction; 5] = [
        RemoteAction::Open,
        RemoteAction::Close,
        RemoteAction::Cancel,
        RemoteAction::Autodawn,
        RemoteAction::Autotemp,
    ];

    /// Next action in learning order, `None` after the last
    pub fn next(self) -> Option<Self> {
        match self {
            RemoteAction::Open => Some(RemoteAction::Close),
            RemoteAction::Close => Some(RemoteAction::Cancel),
            RemoteAction::Cancel => Some(RemoteAction::Autodawn),
            RemoteAction::Autodawn => Some(RemoteAction::Autotemp),
            RemoteAction::Autotemp => None,
        }
    }
}

/// User-configurable settings mirrored to storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Travel distance from home to fully closed, in steps (0 = unbounded)
    pub away: u32,
    /// Open at dawn, close at dusk
    pub autodawn: bool,
    /// Close when it gets hot
    pub autotemp: bool,
    /// Remote code for [`RemoteAction::Open`]
    pub remote_open: i32,
    /// Remote code for [`RemoteAction::Close`]
    pub remote_close: i32,
    /// Remote code for [`RemoteAction::Cancel`]
    pub remote_cancel: i32,
    /// Remote code for [`RemoteAction::Autodawn`]
    pub remote_autodawn: i32,
    /// Remote code for [`RemoteAction::Autotemp`]
    pub remote_autotemp: i32,
}

impl Settings {
    /// Default settings with the given away distance
    pub fn with_away(away: u32) -> Self {
        Self {
            away: away.min(MAX_AWAY),
            ..Self::default()
        }
    }

    /// Away distance as a signed position
    pub fn away_position(&self) -> i32 {
        self.away.min(MAX_AWAY) as i32
    }

    /// Code assigned to an action (0 = unassigned)
    pub fn remote_code(&self, action: RemoteAction) -> i32 {
        match action {
            RemoteAction::Open => self.remote_open,
            RemoteAction::Close => self.remote_close,
            RemoteAction::Cancel => self.remote_cancel,
            RemoteAction::Autodawn => self.remote_autodawn,
            RemoteAction::Autotemp => self.remote_autotemp,
        }
    }

    /// Assign a code to an action
    pub fn set_remote_code(&mut self, action: RemoteAction, code: i32) {
        let slot = match action {
            RemoteAction::Open => &mut self.remote_open,
            RemoteAction::Close => &mut self.remote_close,
            RemoteAction::Cancel => &mut self.remote_cancel,
            RemoteAction::Autodawn => &mut self.remote_autodawn,
            RemoteAction::Autotemp => &mut self.remote_autotemp,
        };
        *slot = code;
    }

    /// Find the action a received code is assigned to
    ///
    /// Code 0 means "unassigned" and never matches.
    pub fn action_for_code(&self, code: i32) -> Option<RemoteAction> {
        if code == 0 {
            return None;
        }
        RemoteAction::ALL
            .into_iter()
            .find(|&action| self.remote_code(action) == code)
    }
}
