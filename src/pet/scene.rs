use std::time::Duration;

use glam::Vec2;

use crate::schedule::Scheduler;
use crate::sprite::animator::SpriteAnimator;
use crate::sprite::ConfigError;

use super::layout::{SpriteLayout, SpriteRect};
use super::{PetController, PetState, PetTimer};

/// The cat on screen: controller, animator and the timers driving them.
///
/// Time only moves through [`PetScene::advance`]; every timer that falls due
/// inside the step is handled in deadline order before the next one pops.
pub struct PetScene {
    scheduler: Scheduler<PetTimer>,
    controller: PetController,
    animator: SpriteAnimator,
    layout: SpriteLayout,
}

impl PetScene {
    pub fn new(controller: PetController, layout: SpriteLayout) -> Self {
        let animator = SpriteAnimator::new(controller.config().clone());
        Self {
            scheduler: Scheduler::new(),
            controller,
            animator,
            layout,
        }
    }

    /// Begin animating and counting down to sleep.
    pub fn start(&mut self) {
        self.controller.activate(&mut self.scheduler);
        self.animator.start(&mut self.scheduler, PetTimer::FrameTick);
    }

    pub fn state(&self) -> PetState {
        self.controller.state()
    }

    pub fn animator(&self) -> &SpriteAnimator {
        &self.animator
    }

    pub fn controller(&self) -> &PetController {
        &self.controller
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn inactivity_remaining(&self) -> Option<Duration> {
        self.controller.inactivity_remaining(&self.scheduler)
    }

    /// Time until the next frame tick or sleep check.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.scheduler
            .next_deadline()
            .map(|due| due.saturating_sub(self.scheduler.now()))
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.layout.set_viewport(viewport);
    }

    /// Display scale factor of the window the cat is drawn in.
    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.layout.set_pixels_per_point(pixels_per_point);
    }

    /// Where the current frame is drawn.
    pub fn sprite_rect(&self) -> SpriteRect {
        let config = self.animator.config();
        self.layout.rect(config.frame_width(), config.frame_height())
    }

    /// Run every timer due in the next `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some(timer) = self.scheduler.pop_due(until) {
            let transition = match timer {
                PetTimer::FrameTick => match self.animator.on_tick() {
                    Some(_finished) => self.controller.animation_finished(&mut self.scheduler),
                    None => None,
                },
                PetTimer::FallAsleep => self.controller.inactivity_elapsed(),
            };
            if let Some(state) = transition {
                self.show(state);
            }
        }
        self.scheduler.advance_to(until);
    }

    /// Pointer moved somewhere in the window.
    pub fn pointer_moved(&mut self) {
        self.controller.pointer_moved(&mut self.scheduler);
    }

    /// Pointer clicked at `pos`. Returns whether it landed on the cat.
    pub fn click_at(&mut self, pos: Vec2) -> bool {
        if !self.sprite_rect().contains(pos) {
            return false;
        }
        if let Some(state) = self.controller.clicked() {
            self.show(state);
        }
        true
    }

    /// Change the playback rate of every animation. The running animation
    /// keeps its frame.
    pub fn set_frames_per_second(&mut self, frames_per_second: f32) -> Result<(), ConfigError> {
        let sheets = self.controller.sheets().with_frames_per_second(frames_per_second)?;
        self.controller.set_sheets(sheets);
        let config = self.controller.config().clone();
        if self.animator.reconfigure(config, &mut self.scheduler, PetTimer::FrameTick) {
            log::info!("playback rate set to {frames_per_second} fps");
        }
        Ok(())
    }

    /// Swap in a fresh animator for `state` so it starts from frame 0.
    fn show(&mut self, state: PetState) {
        // Old animator (and its ticker) is dropped before the new one arms.
        self.animator = SpriteAnimator::new(self.controller.sheets().for_state(state).clone());
        self.animator.start(&mut self.scheduler, PetTimer::FrameTick);
    }
}
