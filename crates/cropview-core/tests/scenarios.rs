//! End-to-end crop scenarios driven through the public API.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use approx::assert_relative_eq;
use cropview_core::bounds::pinch_scale;
use cropview_core::layout::crop_window;
use cropview_core::setup::{load_source_bytes, output_dimensions};
use cropview_core::{
    CropOptions, CropSession, Degrees, DecodedImage, EngineConfig, Point, Rect, SetupError, Size,
    TouchAction, TouchEvent,
};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgb([200, 30, 30])
        } else {
            image::Rgb([30, 30, 200])
        }
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn gray(width: u32, height: u32) -> DecodedImage {
    DecodedImage::new(width, height, vec![90; (width * height * 3) as usize])
}

fn touch(action: TouchAction, points: &[(f64, f64)], time_ms: f64) -> TouchEvent {
    TouchEvent::new(
        action,
        points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        time_ms,
    )
}

fn settle(session: &mut CropSession, mut now: f64) -> f64 {
    for _ in 0..10_000 {
        if !session.is_animating() {
            return now;
        }
        now += 16.0;
        session.tick(now);
    }
    panic!("animation never settled");
}

/// Tick until `done` reports true, giving workers real time to finish.
fn wait_for(session: &mut CropSession, done: impl Fn() -> bool) {
    let mut now = 0.0;
    for _ in 0..500 {
        now += 16.0;
        session.tick(now);
        if done() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("background task never completed");
}

fn covers(session: &CropSession) -> bool {
    let crop = session.layout().unwrap().crop;
    session.screen_placement().unwrap().contains_rect(&crop)
}

#[test]
fn scenario_a_square_crop_is_width_bound() {
    let crop = crop_window(Size::new(1000.0, 2000.0), 1.0, &EngineConfig::default()).unwrap();
    assert_relative_eq!(crop.width(), 850.0);
    assert_relative_eq!(crop.height(), 850.0);
    assert_eq!(crop, Rect::new(75.0, 575.0, 925.0, 1425.0));
}

#[test]
fn scenario_b_narrow_crop_is_height_bound() {
    let crop = crop_window(Size::new(1000.0, 2000.0), 0.3, &EngineConfig::default()).unwrap();
    assert_relative_eq!(crop.height(), 900.0);
    assert_relative_eq!(crop.width(), 270.0, epsilon = 1e-9);
    assert_relative_eq!(crop.center().x, 500.0);
    assert_relative_eq!(crop.center().y, 1000.0);
}

#[test]
fn scenario_c_minimum_source_size() {
    let options = CropOptions::new("in.png", "out.png").with_output_size(50, 50);
    options.validate().unwrap();

    let accepted = load_source_bytes(&png_bytes(100, 100), 1080, 1920).unwrap();
    assert_eq!((accepted.width, accepted.height), (100, 100));

    let rejected = load_source_bytes(&png_bytes(40, 40), 1080, 1920);
    assert!(matches!(
        rejected,
        Err(SetupError::SourceTooSmall {
            width: 40,
            height: 40
        })
    ));
}

#[test]
fn scenario_d_pinch_capped_at_max_scale() {
    let screen = Rect::new(0.0, 0.0, 1000.0, 500.0);
    let applied = pinch_scale(5.0, &screen, Size::new(2000.0, 1000.0));
    assert_eq!(applied, 2.0);
}

#[test]
fn rotation_round_trip_returns_to_zero_and_covers() {
    // A narrow crop makes quarter turns break coverage.
    let mut session = CropSession::new(0.5, EngineConfig::default()).unwrap();
    session.set_source(gray(400, 800)).unwrap();
    session.set_viewport(Size::new(1000.0, 2000.0), 0.0).unwrap();

    let mut now = 0.0;
    for target in [Degrees::D90, Degrees::D180, Degrees::D270, Degrees::D360] {
        assert!(session.rotate(target));
        now = settle(&mut session, now);
        assert_relative_eq!(session.angle(), target.as_degrees());
        assert!(covers(&session), "not covered after turning to {target:?}");
    }
    assert_relative_eq!(session.angle().rem_euclid(360.0), 0.0);

    // From a full turn, D0 is reached without spinning back.
    assert!(session.rotate(Degrees::D0));
    session.tick(now + 16.0);
    assert_eq!(session.angle(), 0.0);
    settle(&mut session, now + 16.0);
    assert!(covers(&session));
}

#[test]
fn rotate_next_cycles_targets() {
    let mut session = CropSession::new(1.0, EngineConfig::default()).unwrap();
    session.set_source(gray(300, 300)).unwrap();
    session.set_viewport(Size::new(1000.0, 2000.0), 0.0).unwrap();

    let mut now = 0.0;
    let mut seen = Vec::new();
    for _ in 0..5 {
        assert!(session.rotate_next());
        seen.push(session.degrees());
        now = settle(&mut session, now);
    }
    assert_eq!(
        seen,
        vec![
            Degrees::D90,
            Degrees::D180,
            Degrees::D270,
            Degrees::D360,
            Degrees::D0
        ]
    );
}

#[test]
fn pinch_out_then_release_stays_covered() {
    let mut session = CropSession::new(1.0, EngineConfig::default()).unwrap();
    session.set_source(gray(850, 850)).unwrap();
    session.set_viewport(Size::new(1000.0, 2000.0), 0.0).unwrap();

    // Pinch in (fingers closer): the image shrinks below the crop window.
    session.handle_touch(&touch(TouchAction::Down, &[(300.0, 1000.0)], 0.0));
    session.handle_touch(&touch(
        TouchAction::PointerDown,
        &[(300.0, 1000.0), (700.0, 1000.0)],
        1.0,
    ));
    session.handle_touch(&touch(
        TouchAction::Move,
        &[(400.0, 1000.0), (600.0, 1000.0)],
        2.0,
    ));
    assert_relative_eq!(session.placement().width(), 425.0, epsilon = 1e-9);

    // Lifting one finger ends the gesture; the other no longer pans.
    let lift = touch(TouchAction::PointerUp, &[(400.0, 1000.0), (600.0, 1000.0)], 3.0);
    session.handle_touch(&lift);
    let before = session.placement();
    session.handle_touch(&touch(TouchAction::Move, &[(450.0, 1000.0)], 4.0));
    assert_eq!(session.placement(), before);

    session.handle_touch(&touch(TouchAction::Up, &[(450.0, 1000.0)], 5.0));
    settle(&mut session, 5.0);
    assert!(covers(&session));
    assert_relative_eq!(session.placement().width(), 850.0, epsilon = 1e-6);
}

#[test]
fn crop_runs_in_background_and_ignores_later_gestures() {
    let mut session = CropSession::new(1.0, EngineConfig::default()).unwrap();
    session.set_source(gray(300, 300)).unwrap();
    session.set_viewport(Size::new(400.0, 800.0), 0.0).unwrap();

    let result: Arc<Mutex<Option<(u32, u32)>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&result);
    session
        .crop(move |_, crop| {
            let crop = crop.unwrap();
            *sink.lock().unwrap() = Some((crop.width, crop.height));
        })
        .unwrap();

    // Mutating the session after the snapshot has no effect on the crop.
    session.handle_touch(&touch(TouchAction::Down, &[(0.0, 0.0)], 0.0));
    session.handle_touch(&touch(TouchAction::Move, &[(50.0, 0.0)], 1.0));

    let done = Arc::clone(&result);
    wait_for(&mut session, move || done.lock().unwrap().is_some());
    assert_eq!(*result.lock().unwrap(), Some((340, 340)));
}

#[test]
fn background_load_waits_for_viewport() {
    let mut session = CropSession::new(1.0, EngineConfig::default()).unwrap();
    let outcome: Arc<Mutex<Option<bool>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&outcome);
    session.load_source(png_bytes(200, 100), 1080, 1920, move |_, result| {
        *sink.lock().unwrap() = Some(result.is_ok());
    });

    // Not attached yet: nothing runs however long we wait.
    std::thread::sleep(Duration::from_millis(200));
    session.tick(0.0);
    assert!(outcome.lock().unwrap().is_none());
    assert!(session.source().is_none());

    session.set_viewport(Size::new(1000.0, 2000.0), 0.0).unwrap();
    let done = Arc::clone(&outcome);
    wait_for(&mut session, move || done.lock().unwrap().is_some());
    assert_eq!(*outcome.lock().unwrap(), Some(true));
    assert!(session.layout().is_some());
}

#[test]
fn background_load_reports_small_source() {
    let mut session = CropSession::new(1.0, EngineConfig::default()).unwrap();
    session.set_viewport(Size::new(1000.0, 2000.0), 0.0).unwrap();
    let outcome: Arc<Mutex<Option<bool>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&outcome);
    session.load_source(png_bytes(40, 40), 1080, 1920, move |_, result| {
        *sink.lock().unwrap() = Some(matches!(result, Err(SetupError::SourceTooSmall { .. })));
    });
    let done = Arc::clone(&outcome);
    wait_for(&mut session, move || done.lock().unwrap().is_some());
    assert_eq!(*outcome.lock().unwrap(), Some(true));
    assert!(session.layout().is_none());
}

#[test]
fn output_is_capped_by_device_area() {
    assert_eq!(output_dimensions((50, 50), (850, 850), 1080, 1920), (50, 50));
    assert_eq!(
        output_dimensions((2160, 3840), (850, 850), 1080, 1920),
        (1080, 1920)
    );
}
