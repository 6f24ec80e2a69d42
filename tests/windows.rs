use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};

use sat_overhead::gain::GaussianBeam;
use sat_overhead::overhead::{
    Coordinates, Facility, FrequencyRange, OverheadEngine, OverheadWindow, Position,
    PositionTime, Reservation, RuntimeSettings, Satellite, TimeWindow, Transmitter,
};
use sat_overhead::predict::{parse_tle_content, GeometryCache, Sgp4Retriever, TabulatedPositions};

fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap() + Duration::minutes(minute)
}

fn window(begin: i64, end: i64) -> TimeWindow {
    TimeWindow::new(at(begin), at(end)).unwrap()
}

fn reservation(minutes: i64) -> Reservation {
    Reservation {
        facility: Facility::new(
            "HCRO",
            Coordinates {
                latitude_deg: 40.8178,
                longitude_deg: -121.4695,
            },
            986.0,
            3.0,
        ),
        time: window(0, minutes),
        frequency: FrequencyRange {
            frequency_hz: Some(1.42e9),
            bandwidth_hz: None,
        },
    }
}

fn per_minute(concurrency_level: usize) -> RuntimeSettings {
    RuntimeSettings {
        time_continuity_resolution: Duration::minutes(1),
        concurrency_level,
        ..Default::default()
    }
}

fn pointing(minute: i64, altitude_deg: f64, azimuth_deg: f64) -> PositionTime {
    PositionTime::new(Position::new(altitude_deg, azimuth_deg), at(minute))
}

fn track(positions: &[(f64, f64)]) -> Vec<PositionTime> {
    positions
        .iter()
        .enumerate()
        .map(|(minute, &(alt, az))| pointing(minute as i64, alt, az))
        .collect()
}

fn windows_of(windows: &[OverheadWindow]) -> Vec<TimeWindow> {
    windows.iter().map(|w| w.overhead_time).collect()
}

#[test]
fn beam_across_north_wraps() {
    let retriever = TabulatedPositions::new().with("north", track(&[(45.0, 359.5); 5]));
    let engine = OverheadEngine::new(
        reservation(5),
        vec![Satellite::named("north")],
        vec![pointing(0, 45.0, 0.5)],
        per_minute(1),
        retriever,
    )
    .unwrap();

    let windows = engine.get_satellites_crossing_main_beam().unwrap();

    assert_eq!(windows_of(&windows), vec![window(0, 5)]);
}

#[test]
fn below_horizon_is_never_in_beam() {
    let retriever = TabulatedPositions::new().with("low", track(&[(-0.001, 120.0); 5]));
    let engine = OverheadEngine::new(
        reservation(5),
        vec![Satellite::named("low")],
        vec![pointing(0, 0.0, 120.0)],
        per_minute(1),
        retriever,
    )
    .unwrap();

    assert!(engine.get_satellites_crossing_main_beam().unwrap().is_empty());
    assert!(engine.get_satellites_above_horizon().unwrap().is_empty());
}

#[test]
fn last_sample_before_cutoff_makes_one_window() {
    let mut positions = track(&[(-10.0, 0.0); 5]);
    positions[4].position.altitude_deg = 30.0;
    let retriever = TabulatedPositions::new().with("late", positions);
    let engine = OverheadEngine::new(
        reservation(5),
        vec![Satellite::named("late")],
        vec![pointing(0, 30.0, 0.0)],
        per_minute(1),
        retriever,
    )
    .unwrap();

    let windows = engine.get_satellites_above_horizon().unwrap();

    assert_eq!(windows_of(&windows), vec![window(4, 5)]);
    assert_eq!(windows[0].positions.len(), 1);
}

#[test]
fn out_of_beam_minute_splits_pass() {
    let retriever = TabulatedPositions::new().with(
        "blinking",
        track(&[
            (60.0, 200.0),
            (60.0, 210.0),
            (60.0, 200.0),
            (60.0, 200.5),
            (60.5, 200.0),
        ]),
    );
    let engine = OverheadEngine::new(
        reservation(5),
        vec![Satellite::named("blinking")],
        vec![pointing(0, 60.0, 200.0)],
        per_minute(1),
        retriever,
    )
    .unwrap();

    let windows = engine.get_satellites_crossing_main_beam().unwrap();

    assert_eq!(windows_of(&windows), vec![window(0, 1), window(2, 5)]);
    assert_eq!(windows[1].positions.len(), 3);
}

#[test]
fn window_starts_at_first_paired_sample() {
    // Antenna only starts pointing at minute 2; earlier samples are unpaired
    let retriever = TabulatedPositions::new().with("up", track(&[(20.0, 90.0); 6]));
    let engine = OverheadEngine::new(
        reservation(6),
        vec![Satellite::named("up")],
        vec![pointing(2, 20.0, 90.0), pointing(4, 20.5, 90.5)],
        per_minute(1),
        retriever,
    )
    .unwrap();

    let windows = engine.get_satellites_crossing_main_beam().unwrap();

    assert_eq!(windows_of(&windows), vec![window(2, 6)]);
}

#[test]
fn cutoff_bounds_every_window() {
    let retriever = TabulatedPositions::new().with(
        "a",
        track(&[(5.0, 0.0), (5.0, 0.0), (-5.0, 0.0), (5.0, 0.0), (5.0, 0.0), (5.0, 0.0)]),
    );
    let engine = OverheadEngine::new(
        reservation(6),
        vec![Satellite::named("a")],
        vec![pointing(0, 45.0, 0.0)],
        per_minute(1),
        retriever,
    )
    .unwrap()
    .with_cutoff(at(4))
    .unwrap();

    let windows = engine.get_satellites_above_horizon().unwrap();

    assert_eq!(windows_of(&windows), vec![window(0, 2), window(3, 4)]);
    for w in &windows {
        assert!(w.overhead_time.begin() < w.overhead_time.end());
        assert!(w.overhead_time.begin() >= at(0));
        assert!(w.overhead_time.end() <= at(4));
    }
}

fn constellation() -> (Vec<Satellite>, TabulatedPositions) {
    let mut retriever = TabulatedPositions::new();
    let satellites: Vec<_> = (0..24)
        .map(|i| {
            let name = format!("sat-{i}");
            let samples = (0..30).map(|m| {
                // Each satellite rises and sets on its own schedule
                let phase = (m + i * 7) % 13;
                let altitude = if phase < 6 { 10.0 + phase as f64 } else { -5.0 };
                pointing(m, altitude, (i * 15) as f64)
            });
            retriever.insert(&name, samples);
            Satellite::named(name)
        })
        .collect();
    (satellites, retriever)
}

#[test]
fn pool_size_does_not_change_results() {
    let (satellites, retriever) = constellation();
    let run = |concurrency_level| {
        OverheadEngine::new(
            reservation(30),
            satellites.clone(),
            vec![pointing(0, 12.0, 90.0)],
            per_minute(concurrency_level),
            retriever.clone(),
        )
        .unwrap()
        .get_satellites_above_horizon()
        .unwrap()
    };

    let sequential = run(1);
    let parallel = run(6);

    assert!(!sequential.is_empty());
    assert_eq!(sequential, parallel);
    // Each satellite's windows are in time order
    for pair in sequential.windows(2) {
        if pair[0].satellite == pair[1].satellite {
            assert!(pair[0].overhead_time.end() <= pair[1].overhead_time.begin());
        }
    }
}

#[test]
fn power_sums_per_second() {
    let boresight = (45.0, 180.0);
    let near = |distance_km| {
        (0..3)
            .map(move |m| {
                PositionTime::new(
                    Position::new(boresight.0, boresight.1).with_distance(distance_km),
                    at(m),
                )
            })
            .collect::<Vec<_>>()
    };
    let retriever = TabulatedPositions::new()
        .with("close", near(500.0))
        .with("far", near(1000.0));
    let satellites = vec![
        Satellite::named("close").with_transmitter(Transmitter::from_dbi(2.0, 3.0)),
        Satellite::named("far"),
    ];
    let engine = OverheadEngine::new(
        reservation(3),
        satellites,
        vec![pointing(0, boresight.0, boresight.1)],
        per_minute(2),
        retriever,
    )
    .unwrap()
    .with_gain_pattern(Arc::new(GaussianBeam::from_dbi(50.0, 3.0)));

    let series = engine.get_satellite_power_series().unwrap();

    assert_eq!(series.windows.len(), 2);
    assert_eq!(series.windows[0].powertimes.len(), 3);
    assert_eq!(series.per_second.len(), 180);

    let close = series.windows[0].powertimes[0].power_watts;
    let far = series.windows[1].powertimes[0].power_watts;
    // Twice the distance is a quarter of the power; `close` also has ~4x EIRP
    let eirp = 2.0 * 10f64.powf(0.3);
    assert_relative_eq!(close / far, 4.0 * eirp, max_relative = 1e-9);

    assert_relative_eq!(series.per_second[0], close + far, max_relative = 1e-12);
    assert_relative_eq!(series.per_second[60], close + far, max_relative = 1e-12);
    assert_eq!(series.per_second[1], 0.0);
}

#[test]
fn propagated_passes_stay_inside_reservation() {
    let tle = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";
    let satellites = parse_tle_content(tle, "inline").unwrap();
    let begin = Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap();
    let mut reservation = reservation(0);
    reservation.time = TimeWindow::new(begin, begin + Duration::hours(6)).unwrap();

    let engine = OverheadEngine::new(
        reservation,
        satellites,
        vec![PositionTime::new(Position::new(90.0, 0.0), begin)],
        RuntimeSettings {
            time_continuity_resolution: Duration::seconds(10),
            concurrency_level: 2,
            ..Default::default()
        },
        Sgp4Retriever::new(GeometryCache::new()),
    )
    .unwrap();

    let windows = engine.get_satellites_above_horizon().unwrap();

    for w in &windows {
        assert!(w.overhead_time.begin() >= begin);
        assert!(w.overhead_time.end() <= begin + Duration::hours(6));
        assert!(w.overhead_time.duration() < Duration::minutes(20));
        assert!(w
            .positions
            .iter()
            .all(|p| p.position.altitude_deg >= 0.0 && p.position.distance_km.is_some()));
    }
}
