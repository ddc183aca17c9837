//! Arcade view: a session driven by a frame loop
//!
//! Ties an [`ArcadeSession`] to a [`FrameSource`] and to whatever guards the
//! shell registers (key and touch listeners). Closing the session, by Escape
//! or a victory claim, unmounts the view: the loop stops and every guard is
//! released. The close callback runs after that with no borrow of the view
//! held, so it may call straight back into the view.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::session::{ArcadeSession, HudStatus};
use crate::frame::{FrameSource, Mounted, run_every_frame};
use crate::surface::Surface;

pub struct ArcadeView {
    session: RefCell<ArcadeSession>,
    mounted: RefCell<Option<Mounted>>,
}

impl ArcadeView {
    pub fn new(session: ArcadeSession) -> Rc<Self> {
        Rc::new(Self {
            session: RefCell::new(session),
            mounted: RefCell::new(None),
        })
    }

    /// Tick once per frame from `source`, drawing into `surface` when there
    /// is one. `on_status` hears each HUD change.
    pub fn run<S, T>(
        self: &Rc<Self>,
        source: Rc<S>,
        mut surface: Option<T>,
        mut on_status: impl FnMut(HudStatus) + 'static,
    ) where
        S: FrameSource + 'static,
        T: Surface + 'static,
    {
        let view = Rc::downgrade(self);
        let mut last_status = None;
        let handle = run_every_frame(source, move |_time| {
            let Some(view) = view.upgrade() else {
                return;
            };
            let target = surface.as_mut().map(|s| {
                s.begin_frame();
                s as &mut dyn Surface
            });
            let status = view.dispatch(move |session| {
                session.frame(target);
                session.status()
            });
            if last_status != Some(status) {
                last_status = Some(status);
                on_status(status);
            }
        });

        let previous = self
            .mounted
            .borrow_mut()
            .replace(Mounted::new("Arcade", Some(handle)));
        drop(previous);
    }

    /// Keep `guard` alive until the view unmounts. Call after [`Self::run`];
    /// a view that is not running drops the guard at once.
    pub fn hold(&self, guard: impl Any) {
        match self.mounted.borrow_mut().as_mut() {
            Some(mounted) => mounted.hold(guard),
            None => log::debug!("Arcade view not running, guard released"),
        }
    }

    /// Run `f` on the session, then, if it closed the session, unmount and
    /// call the close callback once the borrow is gone.
    fn dispatch<R>(&self, f: impl FnOnce(&mut ArcadeSession) -> R) -> R {
        let (result, on_close) = {
            let mut session = self.session.borrow_mut();
            let result = f(&mut *session);
            (result, session.take_close_callback())
        };
        if let Some(on_close) = on_close {
            self.unmount();
            on_close();
        }
        result
    }

    /// Key-down handler. True if the key was used.
    pub fn handle_key(&self, key: &str) -> bool {
        self.dispatch(|session| session.handle_key(key))
    }

    pub fn touch_start(&self, point: Vec2) {
        self.dispatch(|session| session.touch_start(point));
    }

    pub fn touch_move(&self, point: Vec2) {
        self.dispatch(|session| session.touch_move(point));
    }

    pub fn touch_end(&self) {
        self.dispatch(|session| session.touch_end());
    }

    pub fn claim_victory(&self) -> bool {
        self.dispatch(|session| session.claim_victory())
    }

    pub fn restart(&self) {
        self.dispatch(|session| session.restart());
    }

    pub fn close(&self) {
        self.dispatch(|session| session.close());
    }

    pub fn is_closed(&self) -> bool {
        self.session.borrow().is_closed()
    }

    pub fn status(&self) -> HudStatus {
        self.session.borrow().status()
    }

    pub fn status_json(&self) -> serde_json::Result<String> {
        self.session.borrow().status_json()
    }

    /// Stop the loop and release every guard. Safe to call repeatedly.
    pub fn unmount(&self) {
        let mounted = self.mounted.borrow_mut().take();
        drop(mounted);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.borrow().as_ref().is_some_and(Mounted::is_mounted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::state::GamePhase;
    use crate::frame::ManualFrames;
    use crate::surface::DrawList;
    use std::cell::Cell;
    use std::rc::Weak;

    fn counted_view() -> (Rc<ArcadeView>, Rc<Cell<u32>>) {
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let session = ArcadeSession::new(42, move || counter.set(counter.get() + 1));
        (ArcadeView::new(session), closes)
    }

    fn running(view: &Rc<ArcadeView>) -> Rc<ManualFrames> {
        let frames = ManualFrames::new();
        view.run(Rc::clone(&frames), Some(DrawList::new(190.0, 210.0)), |_| {});
        frames
    }

    /// Flags when dropped
    struct DropFlag(Rc<Cell<bool>>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn test_escape_stops_loop_and_releases_guards() {
        let (view, closes) = counted_view();
        let frames = running(&view);
        let released = Rc::new(Cell::new(false));
        view.hold(DropFlag(Rc::clone(&released)));

        frames.advance(0.0);
        frames.advance(16.0);
        assert_eq!(frames.pending_count(), 1);
        assert!(view.is_mounted());

        assert!(view.handle_key("Escape"));
        assert_eq!(closes.get(), 1);
        assert!(!view.is_mounted());
        assert!(released.get());
        assert_eq!(frames.pending_count(), 0);
        assert_eq!(frames.advance(32.0), 0);

        assert!(!view.handle_key("ArrowDown"));
        assert!(!view.handle_key("Escape"));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_close_callback_can_use_the_view() {
        let slot: Rc<RefCell<Weak<ArcadeView>>> = Rc::new(RefCell::new(Weak::new()));
        let seen = Rc::new(Cell::new(None));
        let session = {
            let slot = Rc::clone(&slot);
            let seen = Rc::clone(&seen);
            ArcadeSession::new(42, move || {
                if let Some(view) = slot.borrow().upgrade() {
                    seen.set(Some(view.status().score));
                    view.unmount();
                    assert!(!view.handle_key("ArrowUp"));
                }
            })
        };
        let view = ArcadeView::new(session);
        *slot.borrow_mut() = Rc::downgrade(&view);
        let frames = running(&view);
        frames.advance(0.0);

        view.close();
        assert_eq!(seen.get(), Some(0));
        assert_eq!(frames.pending_count(), 0);
    }

    #[test]
    fn test_victory_claim_unmounts_only_when_won() {
        let (view, closes) = counted_view();
        let frames = running(&view);

        assert!(!view.claim_victory());
        assert!(view.is_mounted());
        assert_eq!(frames.pending_count(), 1);

        view.session.borrow_mut().state_mut().phase = GamePhase::Won;
        assert!(view.claim_victory());
        assert_eq!(closes.get(), 1);
        assert!(!view.is_mounted());
        assert_eq!(frames.pending_count(), 0);
    }

    #[test]
    fn test_status_reported_on_change_only() {
        let (view, _) = counted_view();
        let frames = ManualFrames::new();
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        view.run(
            Rc::clone(&frames),
            Some(DrawList::new(190.0, 210.0)),
            move |status| sink.borrow_mut().push(status),
        );

        for i in 0..5 {
            frames.advance(i as f64 * 16.0);
        }
        // Idle player, no pellets touched: one initial report
        assert_eq!(reports.borrow().len(), 1);

        view.session.borrow_mut().state_mut().score = 90;
        frames.advance(80.0);
        let reports = reports.borrow();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].score, 90);
    }

    #[test]
    fn test_missing_surface_keeps_loop_alive() {
        let (view, _) = counted_view();
        let frames = ManualFrames::new();
        view.run(Rc::clone(&frames), None::<DrawList>, |_| {});
        frames.advance(0.0);
        frames.advance(16.0);
        assert_eq!(view.session.borrow().state().time_ticks, 0);
        assert_eq!(frames.pending_count(), 1);
    }

    #[test]
    fn test_dropping_view_stops_loop() {
        let (view, closes) = counted_view();
        let frames = running(&view);
        frames.advance(0.0);
        drop(view);
        assert_eq!(frames.pending_count(), 0);
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn test_hold_before_run_releases_guard() {
        let (view, _) = counted_view();
        let released = Rc::new(Cell::new(false));
        view.hold(DropFlag(Rc::clone(&released)));
        assert!(released.get());
        assert!(!view.is_mounted());
    }
}
