use approx::{assert_abs_diff_eq, assert_relative_eq};
use coaster_engine::parse::parse_str;
use coaster_engine::{
    Camera, CameraMode, CameraOptions, FixedClock, Movement, Point3, Track, TrackOptions, Vec3,
};

const HILLS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/hills.track"));
const VERTICAL_LOOP: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/vertical_loop.track"
));

fn track_from(text: &str) -> Track {
    let deltas = parse_str(text).expect("track file parses");
    Track::from_deltas(&deltas, &TrackOptions::default()).expect("track builds")
}

fn sunken_ring() -> Vec<Point3> {
    (0..8)
        .map(|i| {
            let a = f64::from(i) * std::f64::consts::TAU / 8.0;
            Point3::new(4.0 * a.cos(), -3.0 + 0.5 * (2.0 * a).sin(), 4.0 * a.sin())
        })
        .collect()
}

fn riding_camera(track: &Track) -> Camera {
    let mut camera = Camera::default();
    camera.bind(track);
    assert!(camera.set_on_track(true));
    camera
}

#[test]
fn single_tick_advances_by_energy_speed() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    let start = track.get_point(0.0);
    let delta = CameraOptions::default().micro_step;

    camera.tick(0.1, &track);

    let speed = (2.0 * 9.8 * (track.hmax() - start.y)).sqrt();
    assert_relative_eq!(camera.speed(), speed, max_relative = 1e-12);
    let micro_length = start.distance_to(track.get_point(delta));
    let expected_s = speed * 0.1 / micro_length * delta;
    assert_relative_eq!(camera.s(), expected_s, max_relative = 0.1);

    let s = camera.s();
    assert!((0.0..=track.period()).contains(&s));
    assert!(camera.position().y >= track.get_point(s).y);
    assert_eq!(camera.rider_frame().map(|f| f.origin), Some(track.get_point(s)));
}

#[test]
fn march_consumes_arc_length_without_overshoot() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    camera.tick(0.1, &track);

    let delta = CameraOptions::default().micro_step;
    let steps = (camera.s() / delta).round() as usize;
    let travelled: f64 = (0..steps)
        .map(|i| {
            let a = i as f64 * delta;
            track.get_point(a).distance_to(track.get_point(a + delta))
        })
        .sum();
    let budget = camera.speed() * 0.1;
    assert!(travelled <= budget + 1e-9, "travelled {travelled} > budget {budget}");
    let next = track.get_point(camera.s()).distance_to(track.get_point(camera.s() + delta));
    assert!(budget - travelled < next + 1e-9);
}

#[test]
fn thousand_ticks_complete_a_lap() {
    for text in [HILLS, VERTICAL_LOOP] {
        let track = track_from(text);
        let mut camera = riding_camera(&track);
        for _ in 0..1000 {
            camera.tick(1.0 / 60.0, &track);
            let s = camera.s();
            assert!((0.0..track.period()).contains(&s), "s = {s}");
        }
        assert!(camera.laps() >= 1, "laps = {}", camera.laps());
    }
}

#[test]
fn advance_is_monotone_modulo_wrap() {
    let track = track_from(VERTICAL_LOOP);
    let mut camera = riding_camera(&track);
    let mut prev_s = camera.s();
    let mut prev_laps = camera.laps();
    for _ in 0..600 {
        camera.tick(1.0 / 60.0, &track);
        if camera.laps() == prev_laps {
            assert!(camera.s() >= prev_s);
        } else {
            assert_eq!(camera.laps(), prev_laps + 1);
        }
        prev_s = camera.s();
        prev_laps = camera.laps();
    }
}

#[test]
fn rider_frames_stay_orthonormal() {
    let track = track_from(VERTICAL_LOOP);
    let mut camera = riding_camera(&track);
    for _ in 0..500 {
        camera.tick(1.0 / 60.0, &track);
        let frame = camera.rider_frame().expect("bound");
        assert!(frame.orthonormal_error() < 1e-9);
        assert!(frame.is_right_handed());
        assert_eq!(camera.front(), frame.front);
        assert_eq!(camera.up(), frame.up);
    }
}

#[test]
fn up_converges_to_world_up_at_the_seam() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    let period = track.period();
    let mut checked = 0;
    for _ in 0..4000 {
        camera.tick(1.0 / 240.0, &track);
        if camera.s() > period - 0.02 {
            let frame = camera.rider_frame().expect("bound");
            let target = (Vec3::Y - frame.front * frame.front.dot(Vec3::Y)).normalized_or(Vec3::Y);
            assert!(frame.up.dot(target) > 0.999, "up {:?} at s {}", frame.up, camera.s());
            checked += 1;
        }
    }
    assert!(checked > 0, "never reached the seam");
}

#[test]
fn toggling_without_ticks_restores_state() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    for _ in 0..37 {
        camera.tick(1.0 / 60.0, &track);
    }
    let before = camera.clone();
    assert!(camera.set_on_track(false));
    assert_eq!(camera.mode(), CameraMode::Free);
    assert!(camera.set_on_track(true));
    assert_eq!(camera, before);
}

#[test]
fn rider_advances_while_flying_free() {
    let track = track_from(HILLS);
    let mut camera = Camera::new(Point3::new(0.0, 20.0, 0.0), Vec3::Y, &CameraOptions::default());
    camera.bind(&track);
    for _ in 0..30 {
        camera.tick(1.0 / 60.0, &track);
    }
    assert_eq!(camera.mode(), CameraMode::Free);
    assert_eq!(camera.position(), Point3::new(0.0, 20.0, 0.0));
    assert!(camera.s() > 0.0);

    assert!(camera.set_on_track(true));
    let rider = *camera.rider().expect("bound");
    assert_eq!(camera.position(), rider.position());
}

#[test]
fn leaving_the_track_keeps_the_view() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    for _ in 0..90 {
        camera.tick(1.0 / 60.0, &track);
    }
    let eye = camera.position();
    let front = camera.front();
    camera.set_on_track(false);
    camera.tick(1.0 / 60.0, &track);
    assert_eq!(camera.position(), eye);

    // Yaw/pitch were synced from the rider, so the free front points the same way.
    camera.on_mouse(0.0, 0.0);
    assert!(camera.front().dot(front) > 0.9999);
    camera.on_key(Movement::Forward, 0.1);
    assert!((camera.position() - eye).dot(front) > 0.0);
}

#[test]
fn first_tick_binds_implicitly() {
    let track = track_from(HILLS);
    let mut camera = Camera::default();
    assert!(!camera.set_on_track(true));
    camera.tick(1.0 / 60.0, &track);
    assert!(camera.rider().is_some());
    assert!(camera.set_on_track(true));
}

#[test]
fn clock_driven_ticks_match_explicit_dt() {
    let track = track_from(VERTICAL_LOOP);
    let mut a = riding_camera(&track);
    let mut b = riding_camera(&track);
    let mut clock = FixedClock::new(1.0 / 30.0);
    for _ in 0..45 {
        a.tick(1.0 / 30.0, &track);
        b.tick_with_clock(&mut clock, &track);
    }
    assert_eq!(a, b);
}

#[test]
fn negative_dt_does_not_move_the_rider() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    camera.tick(-1.0, &track);
    camera.tick(f64::NAN, &track);
    assert_eq!(camera.s(), 0.0);
}

#[test]
fn pitch_and_zoom_clamp_while_riding() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    camera.tick(1.0 / 60.0, &track);
    camera.set_on_track(false);

    camera.on_mouse(0.0, 1000.0);
    assert_eq!(camera.pitch(), 89.0);
    let clamped = camera.clone();
    camera.on_mouse(0.0, 1000.0);
    assert_eq!(camera, clamped);

    camera.on_scroll(1000.0);
    assert_eq!(camera.zoom(), 1.0);
    let zoomed = camera.clone();
    camera.on_scroll(1000.0);
    assert_eq!(camera, zoomed);
}

#[test]
fn cart_sits_on_the_rail_ahead_of_the_eye() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    for _ in 0..20 {
        camera.tick(1.0 / 60.0, &track);
    }
    let frame = *camera.rider_frame().expect("bound");
    let cart = camera.cart_transform();
    let expected = frame.origin + frame.front * 1.5;
    let t = cart.translation();
    assert_abs_diff_eq!(t.x, expected.x, epsilon = 1e-9);
    assert_abs_diff_eq!(t.y, expected.y, epsilon = 1e-9);
    assert_abs_diff_eq!(t.z, expected.z, epsilon = 1e-9);

    let forward = cart.apply_vec(Vec3::Z);
    assert_abs_diff_eq!(forward.dot(frame.front), 1.0, epsilon = 1e-12);
}

#[test]
fn view_matrix_centres_the_rider() {
    let track = track_from(HILLS);
    let mut camera = riding_camera(&track);
    camera.tick(0.5, &track);
    let view = camera.view_matrix();
    let eye = view.apply_point(camera.position());
    assert!(eye.to_vec3().length() < 1e-9);
    let projection = camera.projection_matrix(16.0 / 9.0, 0.1, 100.0);
    assert_eq!(projection.to_cols_array_f32()[11], -1.0);
}

#[test]
fn track_below_ground_is_rideable() {
    let track = Track::from_control_points(sunken_ring(), &TrackOptions::default())
        .expect("sunken ring builds");
    assert_eq!(track.hmax(), 0.0);

    let mut camera = riding_camera(&track);
    for _ in 0..30 {
        camera.tick(1.0 / 60.0, &track);
        let s = camera.s();
        assert!(camera.speed() > 0.0);
        assert!((0.0..track.period()).contains(&s));
        assert!(camera.position().y >= track.get_point(s).y);
    }
    assert!(camera.s() > 0.0);
}

#[test]
fn huge_dt_moves_at_most_one_lap() {
    let track = track_from(VERTICAL_LOOP);
    let mut camera = riding_camera(&track);
    let period = track.period();
    let delta = CameraOptions::default().micro_step;

    camera.tick(1e9, &track);

    assert!(camera.laps() <= 1, "laps = {}", camera.laps());
    let travelled = camera.laps() as f64 * period + camera.s();
    assert!(travelled <= period + delta, "travelled {travelled}");
    assert!(travelled >= period - 2.0 * delta, "travelled {travelled}");
    assert!((0.0..period).contains(&camera.s()));
}
