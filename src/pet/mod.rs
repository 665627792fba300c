pub mod layout;
pub mod scene;

use std::time::Duration;

use crate::schedule::{Scheduler, Timer};
use crate::sprite::{AnimationConfig, ConfigError};

/// What the cat is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetState {
    Idle,
    Sleeping,
    Waking,
}

impl PetState {
    pub const ALL: [PetState; 3] = [Self::Idle, Self::Sleeping, Self::Waking];

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Sleeping => "Sleeping",
            Self::Waking => "Waking",
        }
    }
}

/// Timers the pet scene arms on its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetTimer {
    /// Advance the sprite animator one frame.
    FrameTick,
    /// The inactivity window ran out.
    FallAsleep,
}

/// One animation per state.
#[derive(Debug, Clone, PartialEq)]
pub struct PetSheets {
    pub idle: AnimationConfig,
    pub sleeping: AnimationConfig,
    pub waking: AnimationConfig,
}

impl PetSheets {
    pub fn for_state(&self, state: PetState) -> &AnimationConfig {
        match state {
            PetState::Idle => &self.idle,
            PetState::Sleeping => &self.sleeping,
            PetState::Waking => &self.waking,
        }
    }

    /// Every sheet replayed at `frames_per_second`.
    pub fn with_frames_per_second(&self, frames_per_second: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            idle: self.idle.with_frames_per_second(frames_per_second)?,
            sleeping: self.sleeping.with_frames_per_second(frames_per_second)?,
            waking: self.waking.with_frames_per_second(frames_per_second)?,
        })
    }
}

/// Idle / Sleeping / Waking state machine plus the inactivity timer.
///
/// Each event method returns the new state when it caused a transition.
pub struct PetController {
    state: PetState,
    sheets: PetSheets,
    inactivity_delay: Duration,
    /// Pending fall-asleep timeout. Only ever armed while Idle.
    inactivity: Option<Timer>,
}

impl PetController {
    pub fn new(sheets: PetSheets, inactivity_delay: Duration) -> Result<Self, ConfigError> {
        if inactivity_delay.is_zero() {
            return Err(ConfigError::ZeroInactivityDelay);
        }
        Ok(Self {
            state: PetState::Idle,
            sheets,
            inactivity_delay,
            inactivity: None,
        })
    }

    pub fn state(&self) -> PetState {
        self.state
    }

    pub fn sheets(&self) -> &PetSheets {
        &self.sheets
    }

    pub fn set_sheets(&mut self, sheets: PetSheets) {
        self.sheets = sheets;
    }

    /// Animation for the current state.
    pub fn config(&self) -> &AnimationConfig {
        self.sheets.for_state(self.state)
    }

    pub fn inactivity_delay(&self) -> Duration {
        self.inactivity_delay
    }

    /// Time left before the cat falls asleep, if the countdown is running.
    pub fn inactivity_remaining(&self, scheduler: &Scheduler<PetTimer>) -> Option<Duration> {
        self.inactivity
            .as_ref()
            .and_then(|timer| scheduler.remaining(timer))
    }

    /// Start tracking inactivity for the current state.
    pub fn activate(&mut self, scheduler: &mut Scheduler<PetTimer>) {
        self.rearm(scheduler);
    }

    /// Pointer moved anywhere in the window. Defers sleep while Idle.
    pub fn pointer_moved(&mut self, scheduler: &mut Scheduler<PetTimer>) {
        self.rearm(scheduler);
    }

    /// Pointer clicked on the cat.
    pub fn clicked(&mut self) -> Option<PetState> {
        match self.state {
            PetState::Sleeping => Some(self.enter(PetState::Waking)),
            PetState::Idle | PetState::Waking => None,
        }
    }

    /// The fall-asleep timeout fired.
    pub fn inactivity_elapsed(&mut self) -> Option<PetState> {
        self.inactivity = None;
        match self.state {
            PetState::Idle => Some(self.enter(PetState::Sleeping)),
            PetState::Sleeping | PetState::Waking => None,
        }
    }

    /// The current non-looping animation came to rest.
    pub fn animation_finished(&mut self, scheduler: &mut Scheduler<PetTimer>) -> Option<PetState> {
        match self.state {
            PetState::Waking => {
                let state = self.enter(PetState::Idle);
                self.rearm(scheduler);
                Some(state)
            }
            PetState::Idle | PetState::Sleeping => None,
        }
    }

    fn enter(&mut self, state: PetState) -> PetState {
        log::info!("cat: {} -> {}", self.state.label(), state.label());
        self.state = state;
        if state != PetState::Idle {
            self.inactivity = None;
        }
        state
    }

    /// Cancel any pending timeout, then arm a fresh one if Idle.
    fn rearm(&mut self, scheduler: &mut Scheduler<PetTimer>) {
        self.inactivity = None;
        if self.state == PetState::Idle {
            let timer = scheduler.set_timeout(self.inactivity_delay, PetTimer::FallAsleep);
            self.inactivity = Some(timer);
            log::debug!("inactivity timer armed for {:?}", self.inactivity_delay);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sprite::SheetId;

    pub(crate) fn reference_sheets() -> PetSheets {
        let sheet = |file: &str, frames, looped| {
            AnimationConfig::new(SheetId::new(file), 32, 32, frames, 8.0, looped).unwrap()
        };
        PetSheets {
            idle: sheet("IdleCat.png", 11, true),
            sleeping: sheet("toSleep.png", 4, false),
            waking: sheet("wakeUp.png", 4, false),
        }
    }

    fn controller() -> PetController {
        PetController::new(reference_sheets(), Duration::from_millis(5000)).unwrap()
    }

    #[test]
    fn config_follows_state() {
        let mut sched = Scheduler::new();
        let mut pet = controller();
        assert_eq!(pet.config().frame_count(), 11);
        assert!(pet.config().looped());

        pet.activate(&mut sched);
        pet.inactivity_elapsed();
        assert_eq!(pet.config().frame_count(), 4);
        assert!(!pet.config().looped());

        pet.clicked();
        assert_eq!(pet.config().sheet().as_str(), "wakeUp.png");
    }

    #[test]
    fn transition_table() {
        let mut sched = Scheduler::new();
        let mut pet = controller();
        pet.activate(&mut sched);

        // Idle ignores clicks and completion.
        assert_eq!(pet.clicked(), None);
        assert_eq!(pet.animation_finished(&mut sched), None);

        assert_eq!(pet.inactivity_elapsed(), Some(PetState::Sleeping));
        assert_eq!(pet.inactivity_elapsed(), None);
        assert_eq!(pet.animation_finished(&mut sched), None);

        assert_eq!(pet.clicked(), Some(PetState::Waking));
        assert_eq!(pet.clicked(), None);
        pet.pointer_moved(&mut sched);
        assert_eq!(pet.state(), PetState::Waking);

        assert_eq!(pet.animation_finished(&mut sched), Some(PetState::Idle));
    }

    #[test]
    fn at_most_one_inactivity_timer() {
        let mut sched = Scheduler::new();
        let mut pet = controller();
        pet.activate(&mut sched);
        for _ in 0..10 {
            pet.pointer_moved(&mut sched);
        }
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn no_countdown_outside_idle() {
        let mut sched = Scheduler::new();
        let mut pet = controller();
        pet.activate(&mut sched);
        pet.inactivity_elapsed();
        assert_eq!(sched.pending(), 0);

        pet.pointer_moved(&mut sched);
        assert_eq!(sched.pending(), 0);
        assert_eq!(pet.inactivity_remaining(&sched), None);

        pet.clicked();
        pet.pointer_moved(&mut sched);
        assert_eq!(sched.pending(), 0);

        pet.animation_finished(&mut sched);
        assert_eq!(pet.inactivity_remaining(&sched), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn rejects_zero_delay() {
        assert!(matches!(
            PetController::new(reference_sheets(), Duration::ZERO),
            Err(ConfigError::ZeroInactivityDelay)
        ));
    }

    #[test]
    fn playback_rate_applies_to_every_sheet() {
        let sheets = reference_sheets().with_frames_per_second(12.0).unwrap();
        for state in PetState::ALL {
            assert_eq!(sheets.for_state(state).frames_per_second(), 12.0);
        }
    }
}
