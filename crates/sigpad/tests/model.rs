//! Model behavior tests for sigpad
//!
//! Ordering, reset, resize and callback guarantees of the signature model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use sigpad::surface::{PointerEvent, SignatureRenderer, SignatureSurface};
use sigpad::*;
use sigpad_ink::SegmentShape;

const TIMEOUT: Duration = Duration::from_secs(5);

fn sized_model(width: u32, height: u32) -> SignatureModel {
    let model = SignatureModel::headless(SignatureConfig::default()).unwrap();
    model.set_canvas_size(width, height);
    model
}

fn draw(model: &SignatureModel, y: f32) {
    for i in 0..10 {
        model.update(Point::new(10.0 + i as f32 * 8.0, y));
    }
}

fn end(model: &SignatureModel) -> SignatureOutput {
    let (tx, rx) = mpsc::channel();
    model.end_continuous_line(move |output| tx.send(output).unwrap());
    rx.recv_timeout(TIMEOUT).unwrap()
}

fn output(model: &SignatureModel) -> SignatureOutput {
    let (tx, rx) = mpsc::channel();
    model.get_output(move |output| tx.send(output).unwrap());
    rx.recv_timeout(TIMEOUT).unwrap()
}

fn red_square(side: u32) -> RgbaImage {
    let mut img = RgbaImage::new(side, side);
    for p in img.pixels_mut() {
        *p = image::Rgba([255, 0, 0, 255]);
    }
    img
}

// ============================================================================
// STROKES
// ============================================================================

#[test]
fn test_end_line_commits_to_raster() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);

    let out = end(&model);
    let raster = out.raster.expect("raster after commit");
    assert!(out.live_path.is_none());
    assert_eq!((raster.width(), raster.height()), (100, 50));
    assert!(raster.pixel(50, 25).unwrap().a > 0);
    assert!(!model.is_empty());
}

#[test]
fn test_output_shows_live_path_while_drawing() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);

    let out = output(&model);
    assert!(out.raster.is_none());
    assert!(out.live_path.is_some());
}

#[test]
fn test_single_sample_stroke_leaves_raster_unchanged() {
    let model = sized_model(100, 50);
    model.update(Point::new(30.0, 30.0));

    let out = end(&model);
    assert!(out.raster.is_none());
    assert!(out.live_path.is_none());
    assert!(model.is_empty());
}

#[test]
fn test_tap_leaves_a_dot() {
    let model = sized_model(40, 40);
    model.update(Point::new(20.0, 20.0));
    model.update(Point::new(20.0, 20.0));

    let raster = end(&model).raster.expect("tap commits a dot");
    assert!(raster.pixel(20, 20).unwrap().a > 0);
    assert!(raster.covered_pixels() < 100);
}

#[test]
fn test_stroke_uses_color_at_end() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);
    model.set_color(Color::BLUE);

    let raster = end(&model).raster.unwrap();
    let px = raster.pixel(50, 25).unwrap();
    assert_eq!((px.r, px.g, px.b), (0, 0, 255));
    assert_eq!(model.color(), Color::BLUE);
}

// ============================================================================
// RESET
// ============================================================================

#[test]
fn test_reset_clears_everything() {
    let model = sized_model(100, 50);
    draw(&model, 10.0);
    end(&model);
    draw(&model, 30.0);

    model.reset();
    let out = output(&model);
    assert!(out.raster.is_none());
    assert!(out.live_path.is_none());
    assert!(out.is_empty());
    assert!(model.is_empty());
}

#[test]
fn test_reset_supersedes_queued_work() {
    let model = Arc::new(sized_model(100, 50));
    let (gate_tx, gate_rx) = mpsc::channel::<()>();

    // Hold the worker inside the first callback
    draw(&model, 10.0);
    model.end_continuous_line(move |_| {
        gate_rx.recv_timeout(TIMEOUT).unwrap();
    });

    draw(&model, 30.0);
    let (stale_tx, stale_rx) = mpsc::channel();
    model.end_continuous_line(move |output| stale_tx.send(output).unwrap());

    draw(&model, 40.0);
    let (out_tx, out_rx) = mpsc::channel();
    model.get_output(move |output| out_tx.send(output).unwrap());

    model.reset();
    gate_tx.send(()).unwrap();

    let stale = stale_rx.recv_timeout(TIMEOUT).unwrap();
    assert!(stale.raster.is_none());

    let out = out_rx.recv_timeout(TIMEOUT).unwrap();
    assert!(out.raster.is_none());
    assert!(out.live_path.is_none());
}

#[test]
fn test_reset_supersedes_queued_image() {
    let model = sized_model(100, 50);
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    model.get_output(move |_| {
        gate_rx.recv_timeout(TIMEOUT).unwrap();
    });

    let (tx, rx) = mpsc::channel();
    model.add_image_to_signature(ImageSource::Rgba(red_square(8)), move |result| tx.send(result).unwrap());
    model.reset();
    gate_tx.send(()).unwrap();

    let result = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(matches!(result, Err(SignatureError::Superseded)));
    assert!(output(&model).raster.is_none());
}

#[test]
fn test_reset_supersedes_parked_main_queue_callbacks() {
    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default()).unwrap();
    model.set_canvas_size(100, 50);
    draw(&model, 25.0);

    let (end_tx, end_rx) = mpsc::channel();
    model.end_continuous_line(move |out| end_tx.send(out).unwrap());
    draw(&model, 40.0);
    let (out_tx, out_rx) = mpsc::channel();
    model.get_output(move |out| out_tx.send(out).unwrap());
    let (img_tx, img_rx) = mpsc::channel();
    model.add_image_to_signature(ImageSource::Rgba(red_square(8)), move |result| img_tx.send(result).unwrap());

    // Worker is done; every callback is parked on the main queue
    model.flush();
    model.reset();
    main.run_pending();

    let ended = end_rx.try_recv().unwrap();
    assert!(ended.raster.is_none());
    let out = out_rx.try_recv().unwrap();
    assert!(out.raster.is_none());
    assert!(out.live_path.is_none());
    assert!(matches!(img_rx.try_recv().unwrap(), Err(SignatureError::Superseded)));
}

#[test]
fn test_parked_callbacks_see_work_after_reset() {
    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default()).unwrap();
    model.set_canvas_size(100, 50);
    draw(&model, 10.0);

    let (stale_tx, stale_rx) = mpsc::channel();
    model.end_continuous_line(move |out| stale_tx.send(out).unwrap());
    model.flush();
    model.reset();

    draw(&model, 40.0);
    model.end_continuous_line(|_| {});
    model.flush();

    main.run_pending();
    let raster = stale_rx.try_recv().unwrap().raster.expect("stroke committed after reset");
    assert_eq!(raster.pixel(50, 10).unwrap().a, 0);
    assert!(raster.pixel(50, 40).unwrap().a > 0);
}

// ============================================================================
// RESIZE
// ============================================================================

#[test]
fn test_resize_mid_stroke_discards_live_path() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);
    end(&model);
    draw(&model, 40.0);
    assert!(model.live_path().is_some());

    model.set_canvas_size(200, 100);
    assert!(model.live_path().is_none());

    let out = output(&model);
    assert!(out.live_path.is_none());
    assert_eq!(out.size, CanvasSize::new(200, 100));

    let raster = out.raster.expect("committed pixels survive resize");
    assert_eq!((raster.width(), raster.height()), (200, 100));
    assert!(raster.pixel(100, 50).unwrap().a > 0);
}

#[test]
fn test_ops_deferred_while_unsized() {
    let model = SignatureModel::headless(SignatureConfig::default()).unwrap();
    draw(&model, 25.0);

    let out = end(&model);
    assert!(out.raster.is_none());
    assert!(out.size.is_zero());
    assert!(!model.is_empty());

    model.set_canvas_size(100, 50);
    let raster = output(&model).raster.expect("deferred stroke replayed");
    assert!(raster.pixel(50, 25).unwrap().a > 0);
}

#[test]
fn test_zero_size_keeps_committed_pixels() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);
    end(&model);

    model.set_canvas_size(0, 0);
    model.set_canvas_size(100, 50);
    assert!(output(&model).raster.is_some());
}

#[test]
fn test_failed_resize_keeps_committed_pixels() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);
    end(&model);

    // No pixmap of this size can be allocated
    model.set_canvas_size(u32::MAX, 1);
    model.set_canvas_size(100, 50);

    let out = output(&model);
    assert_eq!(out.size, CanvasSize::new(100, 50));
    let raster = out.raster.expect("committed pixels survive failed resize");
    assert!(raster.pixel(50, 25).unwrap().a > 0);
    assert!(!model.is_empty());
}

// ============================================================================
// IMAGES
// ============================================================================

#[test]
fn test_add_image() {
    let model = sized_model(100, 50);
    let (tx, rx) = mpsc::channel();
    model.add_image_to_signature(ImageSource::Rgba(red_square(10)), move |result| tx.send(result).unwrap());

    let out = rx.recv_timeout(TIMEOUT).unwrap().unwrap();
    let raster = out.raster.unwrap();
    assert_eq!(raster.pixel(50, 25).unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(raster.pixel(5, 25).unwrap().a, 0);
    assert!(!model.is_empty());
}

#[test]
fn test_add_encoded_image() {
    let mut bytes = Vec::new();
    red_square(4)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let model = sized_model(20, 20);
    let (tx, rx) = mpsc::channel();
    model.add_image_to_signature(ImageSource::Encoded(bytes), move |result| tx.send(result).unwrap());
    let raster = rx.recv_timeout(TIMEOUT).unwrap().unwrap().raster.unwrap();
    assert_eq!(raster.covered_pixels(), 400);
}

#[test]
fn test_image_failure_leaves_signature_unchanged() {
    let model = sized_model(100, 50);
    draw(&model, 25.0);
    let before = end(&model).raster.unwrap();

    let (tx, rx) = mpsc::channel();
    model.add_image_to_signature(ImageSource::Encoded(b"not an image".to_vec()), move |result| {
        tx.send(result).unwrap()
    });

    let result = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(matches!(result, Err(SignatureError::ImageComposite(_))));
    assert_eq!(*output(&model).raster.unwrap(), *before);
}

// ============================================================================
// FLATTENED OUTPUT
// ============================================================================

#[test]
fn test_flattened_image_includes_live_stroke() {
    let model = sized_model(100, 50);
    draw(&model, 10.0);
    end(&model);
    draw(&model, 40.0);

    let (tx, rx) = mpsc::channel();
    model.get_flattened_image(move |image| tx.send(image).unwrap());
    let flat = rx.recv_timeout(TIMEOUT).unwrap().unwrap();
    assert!(flat.pixel(50, 10).unwrap().a > 0);
    assert!(flat.pixel(50, 40).unwrap().a > 0);
}

#[test]
fn test_flattened_image_unsized() {
    let model = SignatureModel::headless(SignatureConfig::default()).unwrap();
    let (tx, rx) = mpsc::channel();
    model.get_flattened_image(move |image| tx.send(image).unwrap());
    assert!(matches!(rx.recv_timeout(TIMEOUT).unwrap(), Err(SignatureError::Unsized)));
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_updates_from_two_threads() {
    let model = Arc::new(sized_model(200, 200));

    let handles: Vec<_> = (0..2)
        .map(|t| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                for i in 0..200 {
                    model.update(Point::new((i % 190) as f32 + 5.0, 50.0 + t as f32 * 100.0));
                    if i % 25 == 0 {
                        model.get_output(|_| {});
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let raster = end(&model).raster.expect("interleaved samples commit");
    assert!(output(&model).live_path.is_none());

    // Both threads' samples landed in the one committed stroke
    for y in [50, 150] {
        assert!(raster.pixel(100, y).unwrap().a > 0, "row {} not drawn", y);
        let row = (5..195).filter(|&x| raster.pixel(x, y).unwrap().a > 0).count();
        assert!(row > 100, "row {} has {} covered pixels", y, row);
    }
}

#[test]
fn test_every_callback_runs_once() {
    let model = sized_model(100, 50);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut issued = 0;

    for round in 0..10 {
        draw(&model, 5.0 + round as f32 * 4.0);
        let c = Arc::clone(&calls);
        model.end_continuous_line(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = Arc::clone(&calls);
        model.get_output(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = Arc::clone(&calls);
        model.add_image_to_signature(ImageSource::Encoded(Vec::new()), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        issued += 3;

        if round % 3 == 0 {
            model.reset();
        }
    }

    model.flush();
    assert_eq!(calls.load(Ordering::SeqCst), issued);
}

#[test]
fn test_outputs_are_monotonic() {
    let model = sized_model(100, 100);
    let covered = Arc::new(Mutex::new(Vec::new()));

    for round in 0..6 {
        draw(&model, 10.0 + round as f32 * 15.0);
        model.end_continuous_line(|_| {});
        let covered = Arc::clone(&covered);
        model.get_output(move |out| {
            let count = out.raster.map_or(0, |r| r.covered_pixels());
            covered.lock().unwrap().push(count);
        });
    }
    model.flush();

    let covered = covered.lock().unwrap();
    assert_eq!(covered.len(), 6);
    assert!(covered.windows(2).all(|w| w[0] < w[1]));
}

// ============================================================================
// MAIN QUEUE & OBSERVER
// ============================================================================

#[test]
fn test_callbacks_wait_for_main_queue() {
    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default()).unwrap();
    model.set_canvas_size(100, 50);
    draw(&model, 25.0);

    let received = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&received);
    let main_thread = thread::current().id();
    model.end_continuous_line(move |out| {
        assert_eq!(thread::current().id(), main_thread);
        *slot.lock().unwrap() = Some(out);
    });

    model.flush();
    assert!(received.lock().unwrap().is_none());

    assert!(main.run_pending() >= 1);
    assert!(received.lock().unwrap().as_ref().unwrap().raster.is_some());
}

#[test]
fn test_observer_fires_once_per_transition() {
    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default()).unwrap();
    model.set_canvas_size(100, 50);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    model.set_empty_state_observer(Some(Arc::new(move |empty: bool| log.lock().unwrap().push(empty))));

    draw(&model, 10.0);
    model.end_continuous_line(|_| {});
    draw(&model, 30.0);
    model.end_continuous_line(|_| {});
    model.flush();
    main.run_pending();
    assert_eq!(*seen.lock().unwrap(), vec![false]);

    model.reset();
    model.reset();
    main.run_pending();
    assert_eq!(*seen.lock().unwrap(), vec![false, true]);
}

#[test]
fn test_resize_of_uncommitted_stroke_reports_empty() {
    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default()).unwrap();
    model.set_canvas_size(100, 50);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    model.set_empty_state_observer(Some(Arc::new(move |empty: bool| log.lock().unwrap().push(empty))));

    draw(&model, 25.0);
    model.set_canvas_size(120, 60);
    model.flush();
    main.run_pending();

    assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    assert!(model.is_empty());
}

// ============================================================================
// SURFACE
// ============================================================================

#[derive(Default)]
struct RecordingRenderer {
    raster: Option<RasterImage>,
    overlay: Vec<SegmentShape>,
    raster_updates: usize,
}

impl SignatureRenderer for RecordingRenderer {
    fn present_raster(&mut self, raster: Option<&RasterImage>) {
        self.raster = raster.cloned();
        self.raster_updates += 1;
    }

    fn present_path(&mut self, path: Option<&StrokePath>, _color: Color) {
        self.overlay = path.map(|p| p.shapes().to_vec()).unwrap_or_default();
    }

    fn extend_path(&mut self, shapes: &[SegmentShape], _color: Color) {
        self.overlay.extend_from_slice(shapes);
    }
}

#[test]
fn test_surface_swaps_overlay_into_raster() {
    let model = Arc::new(SignatureModel::headless(SignatureConfig::default()).unwrap());
    let surface = SignatureSurface::new(Arc::clone(&model), RecordingRenderer::default());
    surface.layout(100, 50);
    model.flush();

    surface.handle(PointerEvent::Began(Point::new(10.0, 25.0)));
    for i in 1..10 {
        surface.handle(PointerEvent::Moved(Point::new(10.0 + i as f32 * 8.0, 25.0)));
    }
    assert!(!surface.renderer().overlay.is_empty());
    assert_eq!(surface.renderer().overlay.len(), model.live_path().unwrap().len());

    surface.handle(PointerEvent::Ended(Point::new(82.0, 25.0)));
    model.flush();

    let renderer = surface.renderer();
    assert!(renderer.overlay.is_empty());
    assert!(renderer.raster.as_ref().unwrap().pixel(50, 25).unwrap().a > 0);
}

#[test]
fn test_surface_clear() {
    let model = Arc::new(sized_model(100, 50));
    let surface = SignatureSurface::new(Arc::clone(&model), RecordingRenderer::default());

    surface.handle(PointerEvent::Began(Point::new(10.0, 10.0)));
    surface.handle(PointerEvent::Moved(Point::new(60.0, 10.0)));
    surface.handle(PointerEvent::Ended(Point::new(60.0, 10.0)));
    model.flush();

    surface.clear();
    let renderer = surface.renderer();
    assert!(renderer.raster.is_none());
    assert!(renderer.overlay.is_empty());
    assert!(model.is_empty());
}

#[test]
fn test_surface_clear_before_parked_commit() {
    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default()).unwrap();
    let model = Arc::new(model);
    let surface = SignatureSurface::new(Arc::clone(&model), RecordingRenderer::default());
    surface.layout(100, 50);

    surface.handle(PointerEvent::Began(Point::new(10.0, 25.0)));
    surface.handle(PointerEvent::Moved(Point::new(60.0, 25.0)));
    surface.handle(PointerEvent::Ended(Point::new(80.0, 25.0)));
    surface.refresh();
    model.flush();

    surface.clear();
    main.run_pending();

    let renderer = surface.renderer();
    assert!(renderer.raster.is_none());
    assert!(renderer.overlay.is_empty());
}
