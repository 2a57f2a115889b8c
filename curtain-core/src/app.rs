//! Automation and command dispatch
//!
//! [`CurtainApp`] is the top of the core: it feeds raw input samples into
//! the debouncers, turns the resulting edges into [`Command`]s, applies
//! them to the [`Curtain`] and finally runs the curtain's own poll.
//!
//! Per-poll order:
//!
//! 1. Update debounced inputs
//! 2. Home switch (ends a homing run or an opening move)
//! 3. Buttons, then remote, then light and temperature automation
//! 4. Apply commands
//! 5. [`Curtain::poll`]

use curtain_hal::ByteStorage;
use heapless::Vec;

use crate::config::CurtainConfig;
use crate::controller::{Curtain, PollReport};
use crate::input::{Brightness, Button, Inputs};
use crate::motion::Direction;
use crate::settings::RemoteAction;
use crate::traits::MotionDriver;

pub use crate::input::InputSample;

/// Upper bound on commands issued in a single poll
pub const MAX_COMMANDS: usize = 8;

/// A request produced from user input or automation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Move fully open
    Open,
    /// Move fully closed
    Close,
    /// Stop the current move
    Cancel,
    /// Quarter-turn nudge
    Step(Direction),
    /// Flip dawn/dusk automation
    ToggleAutodawn,
    /// Flip temperature automation
    ToggleAutotemp,
    /// Seek the home switch
    Home,
    /// Start assigning remote codes
    LearnRemote,
}

impl From<RemoteAction> for Command {
    fn from(action: RemoteAction) -> Self {
        match action {
            RemoteAction::Open => Command::Open,
            RemoteAction::Close => Command::Close,
            RemoteAction::Cancel => Command::Cancel,
            RemoteAction::Autodawn => Command::ToggleAutodawn,
            RemoteAction::Autotemp => Command::ToggleAutotemp,
        }
    }
}

/// What happened during one application poll
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppReport {
    /// Commands issued this poll, in the order they were applied
    pub commands: Vec<Command, MAX_COMMANDS>,
    /// The home switch set the home position this poll
    pub home_reached: bool,
    /// A remote code was learned this poll
    pub learned: Option<RemoteAction>,
    /// Result of the curtain poll
    pub poll: PollReport,
}

impl AppReport {
    /// Check if nothing worth logging happened
    pub fn is_quiet(&self) -> bool {
        self.commands.is_empty() && !self.home_reached && self.learned.is_none() && self.poll.is_quiet()
    }
}

/// Curtain with inputs, automation and remote learning
pub struct CurtainApp<M, S> {
    curtain: Curtain<M, S>,
    inputs: Inputs,
    hot_threshold_c: i16,
    was_hot: bool,
    /// Next action to assign while learning remote codes
    learning: Option<RemoteAction>,
    auto_home: bool,
}

impl<M: MotionDriver, S: ByteStorage> CurtainApp<M, S> {
    /// Create the application
    pub fn new(driver: M, storage: S, config: &CurtainConfig) -> Self {
        Self {
            curtain: Curtain::new(driver, storage, config),
            inputs: Inputs::new(config),
            hot_threshold_c: config.hot_threshold_c,
            was_hot: false,
            learning: None,
            auto_home: true,
        }
    }

    /// Load persisted settings (call once at startup)
    pub fn load(&mut self) -> bool {
        self.curtain.load()
    }

    /// Underlying curtain
    pub fn curtain(&self) -> &Curtain<M, S> {
        &self.curtain
    }

    /// Mutable access to the underlying curtain
    pub fn curtain_mut(&mut self) -> &mut Curtain<M, S> {
        &mut self.curtain
    }

    /// Debounced input state
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// Action the next learned code will be assigned to
    pub fn learning(&self) -> Option<RemoteAction> {
        self.learning
    }

    /// Run one application cycle
    pub fn poll(&mut self, now: u32, sample: &InputSample) -> AppReport {
        self.inputs.update(sample, now);

        let home_reached = self.check_home_switch();

        let mut commands = Vec::new();
        let mut learned = None;

        if let Some(button) = self.inputs.buttons.pressed_edge() {
            if let Some(command) = self.button_command(button) {
                queue(&mut commands, command);
            }
        }

        if let Some(code) = self.inputs.remote.take_signal() {
            if self.learning.is_some() {
                learned = self.learn(code, now);
            } else if let Some(action) = self.curtain.settings().action_for_code(code) {
                queue(&mut commands, action.into());
            }
        }

        self.automation(&mut commands);

        if self.auto_home && !self.curtain.is_homed() && !self.curtain.is_moving() {
            queue(&mut commands, Command::Home);
        }
        self.auto_home = false;

        for &command in &commands {
            self.apply(command, now);
        }

        let poll = self.curtain.poll(now);

        AppReport {
            commands,
            home_reached,
            learned,
            poll,
        }
    }

    /// Apply a single command, returning whether it was accepted
    pub fn apply(&mut self, command: Command, now: u32) -> bool {
        match command {
            Command::Open => self.curtain.open(),
            Command::Close => self.curtain.close(),
            Command::Cancel => self.curtain.cancel(),
            Command::Step(direction) => self.curtain.step(direction),
            Command::ToggleAutodawn => {
                self.curtain.store_mut().toggle_autodawn(now);
                true
            }
            Command::ToggleAutotemp => {
                self.curtain.store_mut().toggle_autotemp(now);
                true
            }
            Command::Home => self.curtain.seek_home(),
            Command::LearnRemote => {
                self.learning = Some(RemoteAction::Open);
                true
            }
        }
    }

    /// Set home when the switch closes while travelling toward it
    fn check_home_switch(&mut self) -> bool {
        if !self.inputs.home_pressed() {
            return false;
        }

        let curtain = &self.curtain;
        let toward_home = curtain.is_homing()
            || curtain.position().moving_direction() == Some(Direction::Open)
            || (!curtain.is_homed() && !curtain.is_moving());
        if toward_home {
            self.curtain.set_home();
        }
        toward_home
    }

    fn button_command(&mut self, button: Button) -> Option<Command> {
        if self.learning.take().is_some() {
            // Any press ends learning and is otherwise swallowed
            return None;
        }
        if self.curtain.is_moving() {
            return Some(Command::Cancel);
        }
        match button {
            Button::Open | Button::Close if !self.curtain.is_homed() => Some(Command::Home),
            Button::Open => Some(Command::Step(Direction::Open)),
            Button::Close => Some(Command::Step(Direction::Close)),
            Button::Both => Some(Command::LearnRemote),
            Button::None => None,
        }
    }

    /// Assign `code` to the action being learned
    fn learn(&mut self, code: i32, now: u32) -> Option<RemoteAction> {
        let action = self.learning?;
        if code == 0 || self.learned_this_session(code, action) {
            return None;
        }

        self.curtain
            .store_mut()
            .set_remote_code(action, code, now);
        self.learning = action.next();
        Some(action)
    }

    /// Check if `code` was already assigned to an action before `current`
    fn learned_this_session(&self, code: i32, current: RemoteAction) -> bool {
        let settings = self.curtain.settings();
        RemoteAction::ALL
            .into_iter()
            .take_while(|&action| action != current)
            .any(|action| settings.remote_code(action) == code)
    }

    fn automation(&mut self, commands: &mut Vec<Command, MAX_COMMANDS>) {
        let settings = *self.curtain.settings();

        if let Some(phase) = self.inputs.light.take_transition() {
            if settings.autodawn {
                queue(
                    commands,
                    match phase {
                        Brightness::Light => Command::Open,
                        Brightness::Dark => Command::Close,
                    },
                );
            }
        }

        if let Some(temperature) = self.inputs.temperature() {
            let hot = temperature > self.hot_threshold_c;
            if hot && !self.was_hot && settings.autotemp {
                queue(commands, Command::Close);
            }
            self.was_hot = hot;
        }
    }
}

/// Push a command, dropping it if the poll already issued the maximum
fn queue(commands: &mut Vec<Command, MAX_COMMANDS>, command: Command) {
    let _ = commands.push(command);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::position::tests::SimDriver;
    use crate::motion::MotionEvent;
    use curtain_hal::MemoryStorage;

    type TestApp = CurtainApp<SimDriver, MemoryStorage<256>>;

    fn app() -> TestApp {
        CurtainApp::new(
            SimDriver::default(),
            MemoryStorage::new(),
            &CurtainConfig::default(),
        )
    }

    /// App that has already been homed by its switch
    fn homed_app() -> TestApp {
        let mut app = app();
        let report = app.poll(
            0,
            &InputSample {
                home_switch: true,
                ..InputSample::default()
            },
        );
        assert!(report.home_reached);
        assert!(app.curtain().is_homed());
        app
    }

    fn idle() -> InputSample {
        InputSample::default()
    }

    /// Hold a button combination long enough to debounce, then release it
    fn press(app: &mut TestApp, open: bool, close: bool, now: u32) -> Vec<Command, MAX_COMMANDS> {
        let sample = InputSample {
            open_button: open,
            close_button: close,
            ..InputSample::default()
        };
        let mut issued = Vec::new();
        for t in now..=now + 30 {
            for &command in app.poll(t, &sample).commands.iter() {
                let _ = issued.push(command);
            }
        }
        for t in now + 31..=now + 62 {
            app.poll(t, &idle());
        }
        issued
    }

    fn remote(app: &mut TestApp, code: i32, now: u32) -> AppReport {
        app.poll(
            now,
            &InputSample {
                remote_code: Some(code),
                ..InputSample::default()
            },
        )
    }

    fn run_until_idle(app: &mut TestApp, mut now: u32) -> u32 {
        for _ in 0..200_000 {
            app.poll(now, &idle());
            now += 1;
            if !app.curtain().is_moving() {
                return now;
            }
        }
        panic!("curtain never stopped");
    }

    #[test]
    fn test_starts_homing_on_first_poll() {
        let mut app = app();
        let report = app.poll(0, &idle());
        assert_eq!(report.commands.as_slice(), &[Command::Home]);
        assert!(app.curtain().is_homing());
        assert!(matches!(
            report.poll.motion,
            Some(MotionEvent::Started {
                direction: Direction::Open,
                ..
            })
        ));
    }

    #[test]
    fn test_home_switch_ends_homing_run() {
        let mut app = app();
        for t in 0..100 {
            app.poll(t, &idle());
        }
        assert!(app.curtain().is_homing());

        let report = app.poll(
            100,
            &InputSample {
                home_switch: true,
                ..InputSample::default()
            },
        );
        assert!(report.home_reached);
        assert!(app.curtain().is_homed());
        assert!(!app.curtain().is_moving());
        assert_eq!(app.curtain().location(), 0);
    }

    #[test]
    fn test_no_automatic_retry_after_failed_homing() {
        let config = CurtainConfig {
            homing_travel_steps: 10,
            ..CurtainConfig::default()
        };
        let mut app: TestApp = CurtainApp::new(SimDriver::default(), MemoryStorage::new(), &config);

        let mut failed = false;
        for t in 0..50 {
            let report = app.poll(t, &idle());
            if report.poll.motion == Some(MotionEvent::HomingFailed) {
                failed = true;
            }
            if t > 20 {
                assert!(report.commands.is_empty());
            }
        }
        assert!(failed);
        assert!(!app.curtain().is_homed());

        // A button press asks for another homing run
        let issued = press(&mut app, true, false, 100);
        assert_eq!(issued.as_slice(), &[Command::Home]);
        assert_eq!(app.curtain().position().driver().moves, 2);
    }

    #[test]
    fn test_home_switch_ignored_while_closing() {
        let mut app = homed_app();
        app.curtain_mut().set_away(5000, 1);
        app.curtain_mut().close();
        app.poll(1, &idle());

        let report = app.poll(
            2,
            &InputSample {
                home_switch: true,
                ..InputSample::default()
            },
        );
        assert!(!report.home_reached);
        assert!(app.curtain().is_moving());
    }

    #[test]
    fn test_home_switch_during_open_move() {
        let mut app = homed_app();
        app.curtain_mut().set_target(2000);
        let now = run_until_idle(&mut app, 1);

        app.curtain_mut().open();
        for t in now..now + 100 {
            app.poll(t, &idle());
        }
        let report = app.poll(
            now + 100,
            &InputSample {
                home_switch: true,
                ..InputSample::default()
            },
        );
        assert!(report.home_reached);
        assert_eq!(app.curtain().location(), 0);
        assert!(!app.curtain().is_moving());
    }

    #[test]
    fn test_idle_buttons_step() {
        let mut app = homed_app();
        app.curtain_mut().set_away(4096, 0);

        let issued = press(&mut app, false, true, 10);
        assert_eq!(issued.as_slice(), &[Command::Step(Direction::Close)]);
        let now = run_until_idle(&mut app, 100);
        assert_eq!(app.curtain().location(), 1024);

        let issued = press(&mut app, true, false, now);
        assert_eq!(issued.as_slice(), &[Command::Step(Direction::Open)]);
        run_until_idle(&mut app, now + 100);
        assert_eq!(app.curtain().location(), 0);
    }

    #[test]
    fn test_press_while_moving_cancels() {
        let mut app = homed_app();
        app.curtain_mut().set_target(3000);
        app.poll(1, &idle());
        assert!(app.curtain().is_moving());

        let issued = press(&mut app, true, false, 2);
        assert_eq!(issued.as_slice(), &[Command::Cancel]);
        assert!(!app.curtain().is_moving());

        // Position recovered from partial travel, never overshoots
        let location = app.curtain().location();
        assert!(location > 0 && location < 3000);
        assert_eq!(location as i64, app.curtain().position().driver().physical);
    }

    #[test]
    fn test_remote_codes_dispatch() {
        let mut app = homed_app();
        app.curtain_mut().set_away(2000, 0);
        let store = app.curtain_mut().store_mut();
        store.set_remote_code(RemoteAction::Close, 0x11, 0);
        store.set_remote_code(RemoteAction::Cancel, 0x22, 0);
        store.set_remote_code(RemoteAction::Autodawn, 0x33, 0);

        let report = remote(&mut app, 0x11, 1);
        assert_eq!(report.commands.as_slice(), &[Command::Close]);
        assert!(app.curtain().is_moving());

        for t in 2..500 {
            app.poll(t, &idle());
        }
        let report = remote(&mut app, 0x22, 500);
        assert_eq!(report.commands.as_slice(), &[Command::Cancel]);
        assert!(!app.curtain().is_moving());

        let report = remote(&mut app, 0x33, 501);
        assert_eq!(report.commands.as_slice(), &[Command::ToggleAutodawn]);
        assert!(app.curtain().settings().autodawn);

        // Unknown code does nothing
        let report = remote(&mut app, 0x44, 502);
        assert!(report.commands.is_empty());
    }

    #[test]
    fn test_learn_all_codes() {
        let mut app = homed_app();
        let issued = press(&mut app, true, true, 10);
        assert_eq!(issued.as_slice(), &[Command::LearnRemote]);
        assert_eq!(app.learning(), Some(RemoteAction::Open));

        let codes = [101, 102, 103, 104, 105];
        for (i, &code) in codes.iter().enumerate() {
            let report = remote(&mut app, code, 200 + i as u32);
            assert_eq!(report.learned, Some(RemoteAction::ALL[i]));
            assert!(report.commands.is_empty());
        }
        assert_eq!(app.learning(), None);

        let settings = app.curtain().settings();
        for (action, code) in RemoteAction::ALL.into_iter().zip(codes) {
            assert_eq!(settings.remote_code(action), code);
        }

        // Learned codes are persisted with a single debounced write
        let mut flushes = 0;
        for t in 300..6000 {
            if app.poll(t, &idle()).poll.flushed == Ok(true) {
                flushes += 1;
            }
        }
        assert_eq!(flushes, 1);
    }

    #[test]
    fn test_learning_ignores_repeat_frames() {
        let mut app = homed_app();
        press(&mut app, true, true, 10);

        assert_eq!(remote(&mut app, 101, 200).learned, Some(RemoteAction::Open));
        assert_eq!(remote(&mut app, 101, 210).learned, None);
        assert_eq!(app.learning(), Some(RemoteAction::Close));
    }

    #[test]
    fn test_button_ends_learning() {
        let mut app = homed_app();
        press(&mut app, true, true, 10);
        remote(&mut app, 101, 200);

        let issued = press(&mut app, false, true, 300);
        assert!(issued.is_empty());
        assert_eq!(app.learning(), None);
        assert!(!app.curtain().is_moving());

        // Code now dispatches instead of being learned
        let report = remote(&mut app, 101, 400);
        assert_eq!(report.learned, None);
    }

    #[test]
    fn test_autodawn_follows_light() {
        let mut app = homed_app();
        app.curtain_mut().set_away(1000, 0);
        app.curtain_mut().store_mut().set_autodawn(true, 0);

        let dark = InputSample {
            light: Some(50),
            ..InputSample::default()
        };
        let mut closed_at = None;
        for t in 1..=2100 {
            let report = app.poll(t, &dark);
            if report.commands.contains(&Command::Close) {
                closed_at = Some(t);
            }
        }
        assert_eq!(closed_at, Some(2001));
        let now = run_until_idle(&mut app, 2101);
        assert_eq!(app.curtain().location(), 1000);

        let bright = InputSample {
            light: Some(900),
            ..InputSample::default()
        };
        let mut opened = false;
        for t in now..now + 2100 {
            opened |= app.poll(t, &bright).commands.contains(&Command::Open);
        }
        assert!(opened);
    }

    #[test]
    fn test_light_ignored_without_autodawn() {
        let mut app = homed_app();
        app.curtain_mut().set_away(1000, 0);

        let dark = InputSample {
            light: Some(50),
            ..InputSample::default()
        };
        for t in 1..3000 {
            assert!(app.poll(t, &dark).commands.is_empty());
        }
    }

    #[test]
    fn test_autotemp_closes_on_rising_edge() {
        let mut app = homed_app();
        app.curtain_mut().set_away(1000, 0);
        app.curtain_mut().store_mut().set_autotemp(true, 0);

        let reading = |c| InputSample {
            temperature_c: Some(c),
            ..InputSample::default()
        };

        assert!(app.poll(1, &reading(25)).commands.is_empty());
        assert!(app.poll(2, &reading(28)).commands.is_empty());
        assert_eq!(app.poll(3, &reading(29)).commands.as_slice(), &[Command::Close]);

        // Staying hot does not re-trigger
        assert!(app.poll(4, &reading(31)).commands.is_empty());

        // Cooling down and heating again does
        app.poll(5, &reading(20));
        assert_eq!(app.poll(6, &reading(30)).commands.as_slice(), &[Command::Close]);
    }

    #[test]
    fn test_command_conversion() {
        assert_eq!(Command::from(RemoteAction::Autotemp), Command::ToggleAutotemp);
        assert_eq!(Command::from(RemoteAction::Open), Command::Open);
    }
}
