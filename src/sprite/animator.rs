use crate::schedule::{Scheduler, Timer};

use super::{AnimationConfig, SourceRect};

/// Reported by [`SpriteAnimator::on_tick`] when a non-looping animation
/// first comes to rest on its last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished;

/// Steps through the frames of one [`AnimationConfig`].
///
/// The animator owns its ticker: a scheduler interval whose event the owner
/// routes back into [`SpriteAnimator::on_tick`]. Replacing or dropping the
/// ticker cancels it, so a reconfigured or dropped animator never sees a
/// tick armed with stale parameters.
#[derive(Debug)]
pub struct SpriteAnimator {
    config: AnimationConfig,
    frame: u32,
    /// Latched once `Finished` has been reported for the current hold.
    finished: bool,
    ticker: Option<Timer>,
}

impl SpriteAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            frame: 0,
            finished: false,
            ticker: None,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// True once a non-looping animation is resting on its last frame.
    pub fn is_holding(&self) -> bool {
        self.finished
    }

    /// Arm the frame ticker, replacing any previous one.
    pub fn start<E: Clone>(&mut self, scheduler: &mut Scheduler<E>, tick: E) {
        // Drop first so the old interval is gone before the new one exists.
        self.ticker = None;
        self.ticker = Some(scheduler.set_interval(self.config.period(), tick));
        log::debug!(
            "animator started: {} ({} frames @ {} fps, loop={})",
            self.config.sheet(),
            self.config.frame_count(),
            self.config.frames_per_second(),
            self.config.looped(),
        );
    }

    /// Switch to `config`.
    ///
    /// A different sheet is a new animation and restarts at frame 0; the same
    /// sheet with other parameters keeps its frame (clamped into range). A
    /// hold that is still on the last frame of a non-looping strip stays
    /// reported. Any change re-arms the ticker if it was running. Returns
    /// false if `config` equals the current one.
    pub fn reconfigure<E: Clone>(
        &mut self,
        config: AnimationConfig,
        scheduler: &mut Scheduler<E>,
        tick: E,
    ) -> bool {
        if config == self.config {
            return false;
        }
        let last = config.frame_count() - 1;
        if config.sheet() != self.config.sheet() {
            self.frame = 0;
            self.finished = false;
        } else {
            self.frame = self.frame.min(last);
            self.finished = self.finished && !config.looped() && self.frame == last;
        }
        self.config = config;
        if self.is_running() {
            self.start(scheduler, tick);
        }
        true
    }

    /// Advance one frame.
    pub fn on_tick(&mut self) -> Option<Finished> {
        let next = self.frame + 1;
        if next < self.config.frame_count() {
            self.frame = next;
        } else if self.config.looped() {
            self.frame = 0;
        } else {
            self.frame = self.config.frame_count() - 1;
            if !self.finished {
                self.finished = true;
                return Some(Finished);
            }
        }
        log::trace!("{} frame {}", self.config.sheet(), self.frame);
        None
    }

    /// Horizontal offset of the sheet so the current frame shows through a
    /// frame-sized window: `-(frame * frame_width)` pixels.
    pub fn sheet_offset_x(&self) -> i64 {
        -(self.frame as i64 * self.config.frame_width() as i64)
    }

    /// Current frame's rectangle inside the sheet.
    pub fn source_rect(&self) -> SourceRect {
        SourceRect {
            x: self.frame * self.config.frame_width(),
            y: 0,
            width: self.config.frame_width(),
            height: self.config.frame_height(),
        }
    }

    /// Current frame as normalized texture coordinates `[u0, v0, u1, v1]`
    /// for a sheet image of the given size.
    pub fn uv_rect(&self, sheet_width: u32, sheet_height: u32) -> [f32; 4] {
        let src = self.source_rect();
        let w = sheet_width.max(1) as f32;
        let h = sheet_height.max(1) as f32;
        [
            src.x as f32 / w,
            src.y as f32 / h,
            (src.x + src.width) as f32 / w,
            (src.y + src.height) as f32 / h,
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sprite::SheetId;

    fn config(sheet: &str, frames: u32, looped: bool) -> AnimationConfig {
        AnimationConfig::new(SheetId::new(sheet), 32, 32, frames, 8.0, looped).unwrap()
    }

    #[test]
    fn frame_stays_in_range() {
        for &(frames, looped) in &[(1, true), (1, false), (4, false), (11, true)] {
            let mut anim = SpriteAnimator::new(config("s.png", frames, looped));
            for _ in 0..50 {
                anim.on_tick();
                assert!(anim.frame() < frames);
            }
        }
    }

    #[test]
    fn looping_wraps_every_frame_count_ticks() {
        let mut anim = SpriteAnimator::new(config("IdleCat.png", 11, true));
        for lap in 0..3 {
            for _ in 0..11 {
                assert_eq!(anim.on_tick(), None);
            }
            assert_eq!(anim.frame(), 0, "lap {lap}");
        }
        assert!(!anim.is_holding());
    }

    #[test]
    fn non_looping_holds_and_finishes_once() {
        let mut anim = SpriteAnimator::new(config("wakeUp.png", 4, false));
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.frame(), 3);

        // The hold begins on the next tick.
        assert_eq!(anim.on_tick(), Some(Finished));
        assert_eq!(anim.frame(), 3);
        for _ in 0..20 {
            assert_eq!(anim.on_tick(), None);
            assert_eq!(anim.frame(), 3);
        }
        assert!(anim.is_holding());
    }

    #[test]
    fn single_frame_finishes_on_first_tick() {
        let mut anim = SpriteAnimator::new(config("still.png", 1, false));
        assert_eq!(anim.on_tick(), Some(Finished));
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn new_sheet_resets_frame() {
        let mut sched: Scheduler<()> = Scheduler::new();
        let mut anim = SpriteAnimator::new(config("IdleCat.png", 11, true));
        anim.start(&mut sched, ());
        for _ in 0..7 {
            anim.on_tick();
        }
        assert_eq!(anim.frame(), 7);

        assert!(anim.reconfigure(config("toSleep.png", 4, false), &mut sched, ()));
        assert_eq!(anim.frame(), 0);
        assert!(anim.is_running());
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn same_sheet_keeps_frame_and_rearms() {
        let mut sched: Scheduler<()> = Scheduler::new();
        let mut anim = SpriteAnimator::new(config("wakeUp.png", 4, false));
        anim.start(&mut sched, ());
        while anim.on_tick().is_none() {}
        assert!(anim.is_holding());

        let faster = anim.config().with_frames_per_second(16.0).unwrap();
        assert!(anim.reconfigure(faster.clone(), &mut sched, ()));
        assert_eq!(anim.frame(), 3);
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.next_deadline(), Some(Duration::from_micros(62_500)));

        // Unchanged config is a no-op.
        assert!(!anim.reconfigure(faster, &mut sched, ()));
    }

    #[test]
    fn rate_change_while_held_does_not_finish_again() {
        let mut sched: Scheduler<()> = Scheduler::new();
        let mut anim = SpriteAnimator::new(config("toSleep.png", 4, false));
        anim.start(&mut sched, ());
        let mut finishes = 0;
        for _ in 0..4 {
            finishes += anim.on_tick().iter().count();
        }
        assert_eq!(finishes, 1);

        let slower = anim.config().with_frames_per_second(4.0).unwrap();
        anim.reconfigure(slower, &mut sched, ());
        assert!(anim.is_holding());
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.frame(), 3);
    }

    #[test]
    fn longer_strip_on_same_sheet_releases_hold() {
        let mut sched: Scheduler<()> = Scheduler::new();
        let mut anim = SpriteAnimator::new(config("toSleep.png", 4, false));
        while anim.on_tick().is_none() {}
        assert!(anim.is_holding());

        assert!(anim.reconfigure(config("toSleep.png", 6, false), &mut sched, ()));
        assert_eq!(anim.frame(), 3);
        assert!(!anim.is_holding());
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.on_tick(), None);
        assert_eq!(anim.on_tick(), Some(Finished));
        assert_eq!(anim.frame(), 5);
    }

    #[test]
    fn restart_and_drop_cancel_ticker() {
        let mut sched: Scheduler<()> = Scheduler::new();
        let mut anim = SpriteAnimator::new(config("IdleCat.png", 11, true));
        anim.start(&mut sched, ());
        anim.start(&mut sched, ());
        assert_eq!(sched.pending(), 1);

        drop(anim);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn offset_and_uv_follow_frame() {
        let mut anim = SpriteAnimator::new(config("IdleCat.png", 11, true));
        anim.on_tick();
        anim.on_tick();
        assert_eq!(anim.sheet_offset_x(), -64);
        assert_eq!(
            anim.source_rect(),
            SourceRect { x: 64, y: 0, width: 32, height: 32 }
        );
        let [u0, v0, u1, v1] = anim.uv_rect(352, 32);
        assert!((u0 - 64.0 / 352.0).abs() < 1e-6);
        assert!((u1 - 96.0 / 352.0).abs() < 1e-6);
        assert_eq!((v0, v1), (0.0, 1.0));
    }
}
