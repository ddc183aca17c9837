//! Run-every-frame loops
//!
//! Every effect drives itself the same way: request the next frame, mutate
//! state, render, repeat. [`run_every_frame`] wraps that pattern and returns a
//! [`LoopHandle`] whose cancel (or drop) withdraws the single pending request,
//! so a torn-down component never ticks again. [`Mounted`] bundles a loop
//! with the listeners that belong to it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identifier of a pending frame request
pub type RequestId = u64;

/// One-shot callback receiving the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Something that can call back once on the next display frame
pub trait FrameSource {
    /// Schedule `callback` for the next frame. `None` if scheduling failed.
    fn request_frame(&self, callback: FrameCallback) -> Option<RequestId>;

    /// Withdraw a pending request; unknown ids are ignored
    fn cancel_frame(&self, id: RequestId);
}

struct LoopShared {
    tick: RefCell<Box<dyn FnMut(f64)>>,
    pending: Cell<Option<RequestId>>,
    cancelled: Cell<bool>,
    frames: Cell<u64>,
}

/// Handle to a running loop. Dropping it cancels the loop.
pub struct LoopHandle {
    shared: Rc<LoopShared>,
    source: Rc<dyn FrameSource>,
}

impl LoopHandle {
    /// Stop the loop. Safe to call any number of times.
    pub fn cancel(&self) {
        if self.shared.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.shared.pending.take() {
            self.source.cancel_frame(id);
        }
        log::debug!("Frame loop cancelled after {} frames", self.shared.frames.get());
    }

    pub fn is_running(&self) -> bool {
        !self.shared.cancelled.get()
    }

    /// Number of frames the loop has ticked
    pub fn frames(&self) -> u64 {
        self.shared.frames.get()
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Call `tick` once per frame until the returned handle is cancelled or dropped
pub fn run_every_frame<S, F>(source: Rc<S>, tick: F) -> LoopHandle
where
    S: FrameSource + 'static,
    F: FnMut(f64) + 'static,
{
    let source: Rc<dyn FrameSource> = source;
    let shared = Rc::new(LoopShared {
        tick: RefCell::new(Box::new(tick)),
        pending: Cell::new(None),
        cancelled: Cell::new(false),
        frames: Cell::new(0),
    });
    schedule_next(&shared, &source);
    LoopHandle { shared, source }
}

fn schedule_next(shared: &Rc<LoopShared>, source: &Rc<dyn FrameSource>) {
    let shared_cb = Rc::clone(shared);
    let source_cb = Rc::clone(source);
    let id = source.request_frame(Box::new(move |time| {
        run_frame(&shared_cb, &source_cb, time);
    }));
    if id.is_none() {
        log::warn!("Frame request failed; loop stopped");
    }
    shared.pending.set(id);
}

fn run_frame(shared: &Rc<LoopShared>, source: &Rc<dyn FrameSource>, time: f64) {
    shared.pending.set(None);
    if shared.cancelled.get() {
        return;
    }
    {
        let mut tick = shared.tick.borrow_mut();
        (*tick)(time);
    }
    shared.frames.set(shared.frames.get() + 1);

    // The tick itself may have torn the loop down
    if !shared.cancelled.get() {
        schedule_next(shared, source);
    }
}

/// A mounted component: its frame loop plus guards (event listeners and
/// the like) released together with it
pub struct Mounted {
    name: &'static str,
    frame_loop: Option<LoopHandle>,
    guards: Vec<Box<dyn Any>>,
    active: bool,
}

impl Mounted {
    pub fn new(name: &'static str, frame_loop: Option<LoopHandle>) -> Self {
        log::info!("{} mounted", name);
        Self {
            name,
            frame_loop,
            guards: Vec::new(),
            active: true,
        }
    }

    /// Keep `guard` alive until unmount. Dropped at once if already unmounted.
    pub fn hold(&mut self, guard: impl Any) {
        if self.active {
            self.guards.push(Box::new(guard));
        }
    }

    /// Stop the loop and drop every guard. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
        self.guards.clear();
        log::info!("{} unmounted", self.name);
    }

    pub fn is_mounted(&self) -> bool {
        self.active
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Frame source driven by hand, for tests and headless runs
#[derive(Default)]
pub struct ManualFrames {
    next_id: Cell<RequestId>,
    pending: RefCell<Vec<(RequestId, FrameCallback)>>,
}

impl ManualFrames {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Fire every callback requested before this call. Returns how many ran.
    pub fn advance(&self, time: f64) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback(time);
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FrameSource for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) -> Option<RequestId> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.pending.borrow_mut().push((id, callback));
        Some(id)
    }

    fn cancel_frame(&self, id: RequestId) {
        self.pending.borrow_mut().retain(|(pending, _)| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_loop(frames: &Rc<ManualFrames>) -> (LoopHandle, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let handle = run_every_frame(Rc::clone(frames), move |_| counter.set(counter.get() + 1));
        (handle, count)
    }

    #[test]
    fn test_loop_ticks_once_per_frame() {
        let frames = ManualFrames::new();
        let (handle, count) = counting_loop(&frames);

        assert_eq!(frames.pending_count(), 1);
        for i in 0..5 {
            assert_eq!(frames.advance(i as f64 * 16.0), 1);
        }
        assert_eq!(count.get(), 5);
        assert_eq!(handle.frames(), 5);
        assert_eq!(frames.pending_count(), 1);
    }

    #[test]
    fn test_immediate_teardown_leaves_nothing_pending() {
        let frames = ManualFrames::new();
        let (handle, count) = counting_loop(&frames);
        drop(handle);

        assert_eq!(frames.pending_count(), 0);
        assert_eq!(frames.advance(16.0), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let frames = ManualFrames::new();
        let (handle, count) = counting_loop(&frames);
        frames.advance(0.0);

        handle.cancel();
        handle.cancel();
        assert!(!handle.is_running());
        drop(handle);

        assert_eq!(frames.pending_count(), 0);
        frames.advance(16.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_each_loop_owns_exactly_one_request() {
        let frames = ManualFrames::new();
        let (a, _) = counting_loop(&frames);
        let (b, count_b) = counting_loop(&frames);
        assert_eq!(frames.pending_count(), 2);

        a.cancel();
        assert_eq!(frames.pending_count(), 1);

        frames.advance(0.0);
        assert_eq!(count_b.get(), 1);
        assert_eq!(frames.pending_count(), 1);
        drop(b);
        assert_eq!(frames.pending_count(), 0);
    }

    /// Flags when dropped
    struct DropFlag(Rc<Cell<bool>>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn test_unmount_releases_loop_and_guards() {
        let frames = ManualFrames::new();
        let (handle, count) = counting_loop(&frames);
        let dropped = Rc::new(Cell::new(false));

        let mut mounted = Mounted::new("test", Some(handle));
        mounted.hold(DropFlag(Rc::clone(&dropped)));
        frames.advance(0.0);
        assert!(mounted.is_mounted());
        assert!(!dropped.get());

        mounted.unmount();
        mounted.unmount();
        assert!(!mounted.is_mounted());
        assert!(dropped.get());
        assert_eq!(frames.pending_count(), 0);
        frames.advance(16.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_hold_after_unmount_drops_guard() {
        let mut mounted = Mounted::new("test", None);
        mounted.unmount();
        let dropped = Rc::new(Cell::new(false));
        mounted.hold(DropFlag(Rc::clone(&dropped)));
        assert!(dropped.get());
    }

    #[test]
    fn test_dropping_mounted_unmounts() {
        let frames = ManualFrames::new();
        let (handle, _) = counting_loop(&frames);
        let dropped = Rc::new(Cell::new(false));
        {
            let mut mounted = Mounted::new("test", Some(handle));
            mounted.hold(DropFlag(Rc::clone(&dropped)));
        }
        assert!(dropped.get());
        assert_eq!(frames.pending_count(), 0);
    }

    #[test]
    fn test_tick_can_stop_its_own_loop() {
        let frames = ManualFrames::new();
        let slot: Rc<RefCell<Option<LoopHandle>>> = Rc::new(RefCell::new(None));
        let slot_cb = Rc::clone(&slot);
        let handle = run_every_frame(Rc::clone(&frames), move |_| {
            if let Some(h) = slot_cb.borrow().as_ref() {
                h.cancel();
            }
        });
        *slot.borrow_mut() = Some(handle);

        frames.advance(0.0);
        assert_eq!(frames.pending_count(), 0);
        // Break the handle <-> closure cycle
        slot.borrow_mut().take();
    }
}
