//! Signature Model
//!
//! Shared between the input thread and the raster worker. Pointer samples
//! build the live stroke synchronously; compositing, resizing and snapshots
//! run in issue order on a serial worker and report back through the
//! callback dispatcher.
//!
//! Lock order: input, then raster, then the empty-state tracker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::RgbaImage;
use sigpad_ink::{ContinuousLine, LineState, Point, SegmentShape, StrokePath};
use sigpad_raster::{Color, RasterBuffer, RasterError, RasterImage, decode_image};

use crate::SignatureError;
use crate::config::SignatureConfig;
use crate::dispatch::{CallbackDispatcher, InlineDispatcher, MainQueue};
use crate::observer::{EmptyStateObserver, EmptyStateTracker};
use crate::output::{CanvasSize, SignatureOutput};
use crate::queue::SerialQueue;

/// Image handed to `add_image_to_signature`
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// PNG or JPEG bytes
    Encoded(Vec<u8>),
    /// Decoded straight-alpha pixels
    Rgba(RgbaImage),
}

impl ImageSource {
    fn into_rgba(self) -> Result<RgbaImage, RasterError> {
        match self {
            Self::Encoded(bytes) => decode_image(&bytes),
            Self::Rgba(image) if image.width() == 0 || image.height() == 0 => Err(RasterError::EmptyImage),
            Self::Rgba(image) => Ok(image),
        }
    }
}

/// Raster work waiting for a non-zero canvas
enum DeferredOp {
    Stroke { path: StrokePath, color: Color },
    Image(RgbaImage),
}

/// Worker-side state
struct RasterState {
    size: CanvasSize,
    buffer: Option<RasterBuffer>,
    deferred: Vec<DeferredOp>,
    snapshot: Option<Arc<RasterImage>>,
    snapshot_dirty: bool,
}

impl RasterState {
    fn new() -> Self {
        Self {
            size: CanvasSize::ZERO,
            buffer: None,
            deferred: Vec::new(),
            snapshot: None,
            snapshot_dirty: false,
        }
    }

    /// Committed pixels or ops waiting to be committed
    fn has_content(&self) -> bool {
        self.buffer.as_ref().is_some_and(RasterBuffer::has_content) || !self.deferred.is_empty()
    }

    fn stroke(&mut self, path: StrokePath, color: Color) {
        let sized = !self.size.is_zero();
        match self.buffer.as_mut() {
            Some(buffer) if sized => {
                if buffer.composite_stroke(&path, color) {
                    self.snapshot_dirty = true;
                }
            }
            _ => {
                tracing::debug!("Deferring stroke until the canvas is sized");
                self.deferred.push(DeferredOp::Stroke { path, color });
            }
        }
    }

    fn image(&mut self, image: RgbaImage) -> Result<(), RasterError> {
        let sized = !self.size.is_zero();
        match self.buffer.as_mut() {
            Some(buffer) if sized => {
                buffer.composite_image(&image)?;
                self.snapshot_dirty = true;
            }
            _ => {
                tracing::debug!("Deferring image until the canvas is sized");
                self.deferred.push(DeferredOp::Image(image));
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.clear();
        }
        self.deferred.clear();
        self.snapshot = None;
        self.snapshot_dirty = false;
    }

    /// A size the buffer cannot take leaves buffer and size as they were
    fn resize(&mut self, size: CanvasSize) {
        if size.is_zero() {
            self.size = size;
            tracing::debug!("Canvas unsized; raster ops deferred");
            return;
        }

        let next = match &self.buffer {
            Some(old) if (old.width(), old.height()) == (size.width, size.height) => None,
            Some(old) => Some(old.resized(size.width, size.height)),
            None => Some(RasterBuffer::new(size.width, size.height)),
        };
        match next {
            None => {}
            Some(Ok(buffer)) => self.buffer = Some(buffer),
            Some(Err(e)) => {
                tracing::error!("Failed to size raster to {}x{}: {}", size.width, size.height, e);
                return;
            }
        }
        self.size = size;
        self.snapshot_dirty = true;
        self.replay_deferred();
    }

    fn replay_deferred(&mut self) {
        let ops = std::mem::take(&mut self.deferred);
        if ops.is_empty() {
            return;
        }

        tracing::debug!(count = ops.len(), "Replaying deferred raster ops");
        for op in ops {
            match op {
                DeferredOp::Stroke { path, color } => self.stroke(path, color),
                DeferredOp::Image(image) => {
                    if let Err(e) = self.image(image) {
                        tracing::warn!("Dropping deferred image: {}", e);
                    }
                }
            }
        }
    }

    /// Cached until the next change
    fn snapshot(&mut self) -> Option<Arc<RasterImage>> {
        if self.snapshot_dirty {
            self.snapshot = self.buffer.as_ref().and_then(RasterBuffer::snapshot).map(Arc::new);
            self.snapshot_dirty = false;
        }
        self.snapshot.clone()
    }

    fn output(&mut self, live_path: Option<StrokePath>, color: Color) -> SignatureOutput {
        SignatureOutput {
            raster: self.snapshot(),
            live_path,
            color,
            size: self.size,
        }
    }
}

/// Input-side state
struct InputState {
    line: ContinuousLine,
    color: Color,
    size: CanvasSize,
}

struct Shared {
    input: Mutex<InputState>,
    raster: Mutex<RasterState>,
    /// Bumped by `reset`; tasks issued under an older value are stale
    epoch: AtomicU64,
    tracker: EmptyStateTracker,
    dispatcher: Arc<dyn CallbackDispatcher>,
}

impl Shared {
    fn input(&self) -> MutexGuard<'_, InputState> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn raster(&self) -> MutexGuard<'_, RasterState> {
        self.raster.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    fn deliver<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatcher.dispatch(Box::new(f));
    }

    /// Deliver an output built for work issued under `epoch`.
    ///
    /// A reset landing between the build and the callback replaces it with
    /// the raster as it stands after the reset.
    fn deliver_output<F>(self: &Arc<Self>, epoch: u64, output: SignatureOutput, f: F)
    where
        F: FnOnce(SignatureOutput) + Send + 'static,
    {
        let shared = Arc::downgrade(self);
        self.deliver(move || {
            let output = match shared.upgrade() {
                Some(shared) if !shared.is_current(epoch) => {
                    tracing::debug!("Output superseded by reset before delivery");
                    shared.raster().output(None, output.color)
                }
                _ => output,
            };
            f(output)
        });
    }

    /// Same as `deliver_output` for image results; a reset turns success into `Superseded`
    fn deliver_result<F>(self: &Arc<Self>, epoch: u64, result: Result<SignatureOutput, SignatureError>, f: F)
    where
        F: FnOnce(Result<SignatureOutput, SignatureError>) + Send + 'static,
    {
        let shared = Arc::downgrade(self);
        self.deliver(move || {
            let stale = shared.upgrade().is_some_and(|shared| !shared.is_current(epoch));
            let result = match result {
                Ok(_) if stale => Err(SignatureError::Superseded),
                other => other,
            };
            f(result)
        });
    }
}

/// Signature capture state.
///
/// Every method takes `&self`; share it with `Arc` across threads.
pub struct SignatureModel {
    shared: Arc<Shared>,
    queue: SerialQueue,
    config: SignatureConfig,
}

impl std::fmt::Debug for SignatureModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureModel")
            .field("size", &self.canvas_size())
            .field("color", &self.color())
            .field("is_empty", &self.is_empty())
            .field("queue", &self.queue)
            .finish()
    }
}

impl SignatureModel {
    /// Create a model whose callbacks go through `dispatcher`
    pub fn new(config: SignatureConfig, dispatcher: Arc<dyn CallbackDispatcher>) -> Result<Self, SignatureError> {
        let queue = SerialQueue::new(&config.worker_name)?;
        let input = InputState {
            line: ContinuousLine::new(config.weight, config.round_joins),
            color: config.color,
            size: CanvasSize::ZERO,
        };

        let shared = Arc::new(Shared {
            input: Mutex::new(input),
            raster: Mutex::new(RasterState::new()),
            epoch: AtomicU64::new(0),
            tracker: EmptyStateTracker::new(Arc::clone(&dispatcher)),
            dispatcher,
        });

        tracing::debug!(worker = %config.worker_name, "Signature model created");
        Ok(Self { shared, queue, config })
    }

    /// Model plus the queue the interactive thread drains
    pub fn with_main_queue(config: SignatureConfig) -> Result<(Self, MainQueue), SignatureError> {
        let main = MainQueue::new();
        let model = Self::new(config, Arc::new(main.clone()))?;
        Ok((model, main))
    }

    /// Model whose callbacks run on the worker thread
    pub fn headless(config: SignatureConfig) -> Result<Self, SignatureError> {
        Self::new(config, Arc::new(InlineDispatcher))
    }

    pub fn config(&self) -> &SignatureConfig {
        &self.config
    }

    pub fn set_empty_state_observer(&self, observer: Option<Arc<dyn EmptyStateObserver>>) {
        self.shared.tracker.set_observer(observer);
    }

    /// Append a pointer sample to the live stroke
    pub fn update(&self, point: Point) {
        let mut input = self.shared.input();
        let added = input.line.append(point);
        if added > 0 {
            self.shared.tracker.report(false);
        }
    }

    /// Finish the live stroke and merge it into the raster.
    ///
    /// `callback` always runs once, with the raster after the merge. A stroke
    /// with fewer than two samples leaves the raster unchanged.
    pub fn end_continuous_line<F>(&self, callback: F)
    where
        F: FnOnce(SignatureOutput) + Send + 'static,
    {
        let (path, color, epoch) = {
            let mut input = self.shared.input();
            (input.line.end_line(), input.color, self.shared.epoch())
        };

        let shared = Arc::clone(&self.shared);
        self.queue.submit(move || {
            let output = {
                let mut raster = shared.raster();
                match path {
                    Some(path) if shared.is_current(epoch) => {
                        raster.stroke(path, color);
                        shared.tracker.report(false);
                    }
                    Some(_) => tracing::debug!("Skipping stroke issued before reset"),
                    None => {}
                }
                raster.output(None, color)
            };
            shared.deliver_output(epoch, output, callback);
        });
    }

    /// Scale an image to fit the canvas, center it and merge it.
    ///
    /// On failure the raster is left as it was.
    pub fn add_image_to_signature<F>(&self, image: ImageSource, callback: F)
    where
        F: FnOnce(Result<SignatureOutput, SignatureError>) + Send + 'static,
    {
        let (color, epoch) = {
            let input = self.shared.input();
            (input.color, self.shared.epoch())
        };

        let shared = Arc::clone(&self.shared);
        self.queue.submit(move || {
            // Decode outside the raster lock
            let decoded = image.into_rgba();

            let result = {
                let mut raster = shared.raster();
                if !shared.is_current(epoch) {
                    tracing::debug!("Skipping image issued before reset");
                    Err(SignatureError::Superseded)
                } else {
                    match decoded.and_then(|image| raster.image(image)) {
                        Ok(()) => {
                            shared.tracker.report(false);
                            Ok(raster.output(None, color))
                        }
                        Err(e) => {
                            tracing::warn!("Image composite failed: {}", e);
                            Err(SignatureError::ImageComposite(e))
                        }
                    }
                }
            };
            shared.deliver_result(epoch, result, callback);
        });
    }

    /// Drop the live stroke and every committed pixel.
    ///
    /// Work queued before this call no longer changes the raster.
    pub fn reset(&self) {
        let mut input = self.shared.input();
        input.line.discard();

        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.raster().clear();
        self.shared.tracker.report(true);

        tracing::debug!("Signature reset");
    }

    /// Snapshot of the raster and the live stroke
    pub fn get_output<F>(&self, callback: F)
    where
        F: FnOnce(SignatureOutput) + Send + 'static,
    {
        self.submit_output(callback);
    }

    /// Raster and live stroke merged into one image
    pub fn get_flattened_image<F>(&self, callback: F)
    where
        F: FnOnce(Result<RasterImage, SignatureError>) + Send + 'static,
    {
        self.submit_output(move |output| callback(output.flatten()));
    }

    fn submit_output<F>(&self, f: F)
    where
        F: FnOnce(SignatureOutput) + Send + 'static,
    {
        let (live, color, epoch) = {
            let input = self.shared.input();
            (input.line.path().cloned(), input.color, self.shared.epoch())
        };

        let shared = Arc::clone(&self.shared);
        self.queue.submit(move || {
            let live = if shared.is_current(epoch) { live } else { None };
            let output = shared.raster().output(live, color);
            shared.deliver_output(epoch, output, f);
        });
    }

    /// Resize the canvas.
    ///
    /// Discards the live stroke. Committed pixels are rescaled uniformly and
    /// centered. While the size is zero, raster ops are held back and replayed
    /// once the canvas gets a real size.
    pub fn set_canvas_size(&self, width: u32, height: u32) {
        let size = CanvasSize::new(width, height);
        {
            let mut input = self.shared.input();
            if input.size == size {
                return;
            }
            if input.line.state() == LineState::Accumulating {
                tracing::debug!("Canvas resized mid-stroke; discarding live line");
            }
            input.line.discard();
            input.size = size;
        }
        tracing::debug!("Canvas size {}x{}", width, height);

        let shared = Arc::clone(&self.shared);
        self.queue.submit(move || {
            let has_content = {
                let mut raster = shared.raster();
                raster.resize(size);
                raster.has_content()
            };
            if !has_content {
                let input = shared.input();
                if input.line.path().is_none() {
                    shared.tracker.report(true);
                }
            }
        });
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.shared.input().size
    }

    /// Color for the live stroke and strokes ended from now on
    pub fn set_color(&self, color: Color) {
        let mut input = self.shared.input();
        input.color = color;
    }

    pub fn color(&self) -> Color {
        self.shared.input().color
    }

    /// False once a segment or image exists
    pub fn is_empty(&self) -> bool {
        self.shared.tracker.is_empty()
    }

    /// True while a gesture has samples
    pub fn is_drawing(&self) -> bool {
        self.shared.input().line.state() == LineState::Accumulating
    }

    /// Copy of the live stroke
    pub fn live_path(&self) -> Option<StrokePath> {
        self.shared.input().line.path().cloned()
    }

    /// Copy of the live stroke; later tails start after it
    pub fn sync_live_path(&self) -> Option<StrokePath> {
        let mut input = self.shared.input();
        input.line.take_tail();
        input.line.path().cloned()
    }

    /// Shapes added to the live stroke since the previous call
    pub fn take_live_tail(&self) -> Vec<SegmentShape> {
        self.shared.input().line.take_tail().to_vec()
    }

    /// Block until all work queued so far has run
    pub fn flush(&self) {
        self.queue.flush();
    }
}
