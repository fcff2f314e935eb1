//! Signature Surface
//!
//! Drives a renderer from pointer events. The live stroke is drawn as a
//! vector overlay; once a stroke is merged, the raster layer is replaced and
//! the overlay is redrawn from whatever is still live.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use sigpad_ink::{Point, SegmentShape, StrokePath};
use sigpad_raster::{Color, RasterImage};

use crate::model::SignatureModel;
use crate::output::SignatureOutput;

/// Pointer input in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Began(Point),
    Moved(Point),
    Ended(Point),
}

/// Display side of the signature
pub trait SignatureRenderer: Send + 'static {
    /// Replace the committed layer
    fn present_raster(&mut self, raster: Option<&RasterImage>);

    /// Replace the overlay; `None` clears it
    fn present_path(&mut self, path: Option<&StrokePath>, color: Color);

    /// Draw additional overlay shapes
    fn extend_path(&mut self, shapes: &[SegmentShape], color: Color);
}

/// Connects pointer input, the model and a renderer
pub struct SignatureSurface<R: SignatureRenderer> {
    model: Arc<SignatureModel>,
    renderer: Arc<Mutex<R>>,
}

impl<R: SignatureRenderer> std::fmt::Debug for SignatureSurface<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureSurface").field("model", &self.model).finish()
    }
}

fn lock<R>(renderer: &Mutex<R>) -> MutexGuard<'_, R> {
    renderer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Present an output, redrawing the overlay from the model's current live stroke
fn present<R>(renderer: &Mutex<R>, model: &Weak<SignatureModel>, output: SignatureOutput)
where
    R: SignatureRenderer,
{
    let live = model.upgrade().and_then(|model| model.sync_live_path());
    let mut renderer = lock(renderer);
    renderer.present_raster(output.raster.as_deref());
    renderer.present_path(live.as_ref(), output.color);
}

impl<R: SignatureRenderer> SignatureSurface<R> {
    pub fn new(model: Arc<SignatureModel>, renderer: R) -> Self {
        Self {
            model,
            renderer: Arc::new(Mutex::new(renderer)),
        }
    }

    pub fn model(&self) -> &Arc<SignatureModel> {
        &self.model
    }

    pub fn renderer(&self) -> MutexGuard<'_, R> {
        lock(&self.renderer)
    }

    /// Canvas bounds changed
    pub fn layout(&self, width: u32, height: u32) {
        self.model.set_canvas_size(width, height);
        let color = self.model.color();
        self.renderer().present_path(None, color);
        self.refresh();
    }

    pub fn handle(&self, event: PointerEvent) {
        match event {
            PointerEvent::Began(point) => {
                if self.model.is_drawing() {
                    tracing::debug!("Gesture began without ending the previous one");
                    self.commit();
                }
                self.model.update(point);
                self.draw_tail();
            }
            PointerEvent::Moved(point) => {
                self.model.update(point);
                self.draw_tail();
            }
            PointerEvent::Ended(point) => {
                self.model.update(point);
                self.commit();
            }
        }
    }

    /// Request a full redraw
    pub fn refresh(&self) {
        let renderer = Arc::clone(&self.renderer);
        let model = Arc::downgrade(&self.model);
        self.model.get_output(move |output| present(&renderer, &model, output));
    }

    /// Erase the signature
    pub fn clear(&self) {
        self.model.reset();
        let color = self.model.color();
        let mut renderer = self.renderer();
        renderer.present_raster(None);
        renderer.present_path(None, color);
    }

    fn draw_tail(&self) {
        let tail = self.model.take_live_tail();
        if !tail.is_empty() {
            let color = self.model.color();
            self.renderer().extend_path(&tail, color);
        }
    }

    fn commit(&self) {
        let renderer = Arc::clone(&self.renderer);
        let model = Arc::downgrade(&self.model);
        self.model.end_continuous_line(move |output| present(&renderer, &model, output));
    }
}
