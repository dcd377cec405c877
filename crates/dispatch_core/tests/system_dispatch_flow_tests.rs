use dispatch_core::dispatch::{
    AdmitAll, DispatchConfig, DispatchEngine, Driver, DriverStatus, RideOutcome, RideRequest,
    SafetyPolicy, TripStatus,
};
use dispatch_core::geo::Coord;
use dispatch_core::pricing::MINIMUM_FARE;
use dispatch_core::test_helpers::{
    registration_at, registration_with_category, FailingRouteProvider, ScriptedRouteProvider,
};

/// Every driver registers with the same rating so safety filtering is
/// decided by category alone.
fn engine_with_rating(rating: f64) -> DispatchEngine {
    let config = DispatchConfig {
        rating_min: rating,
        rating_max: rating,
        ..DispatchConfig::default()
    };
    DispatchEngine::new(config, Some(17))
}

fn ride(pickup: Coord, dropoff: Coord, safety_mode: bool) -> RideRequest {
    RideRequest {
        pickup,
        dropoff,
        safety_mode,
    }
}

#[test]
fn single_driver_at_pickup_is_assigned() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(1));
    let driver = engine.register_driver(registration_at(Coord::new(0.0, 0.0)));

    let outcome = engine.request_ride(
        &ride(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0), false),
        0,
    );
    let assignment = outcome.assignment().expect("found");
    assert_eq!(assignment.driver_id, driver.id);
    assert_eq!(assignment.status, TripStatus::Active);
    assert_eq!(assignment.eta_secs, 0.0);
    assert!(assignment.price >= MINIMUM_FARE);
    assert!(assignment.passcode.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(assignment.route.first(), Some(&Coord::new(0.0, 0.0)));
}

#[test]
fn no_drivers_means_not_found() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(1));
    let outcome = engine.request_ride(
        &ride(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0), false),
        0,
    );
    assert_eq!(outcome, RideOutcome::NotFound);
    assert!(engine.trips().is_empty());
}

#[test]
fn safety_mode_skips_filtered_driver_even_when_closest() {
    let mut engine = engine_with_rating(4.6);
    let pickup = Coord::new(40.7128, -74.0060);
    engine.register_driver(registration_with_category(pickup, "unverified"));
    let verified = engine.register_driver(registration_with_category(
        Coord::new(40.7300, -74.0060),
        "verified",
    ));

    let request = ride(pickup, Coord::new(40.7400, -74.0000), true);
    let assignment = engine
        .request_ride(&request, 0)
        .assignment()
        .cloned()
        .expect("found");
    assert_eq!(assignment.driver_id, verified.id);
    let message = assignment.safety_message.expect("safety message");
    assert!(message.contains("10% surcharge"));
    assert!(message.contains("4.60"));
}

#[test]
fn highly_rated_driver_passes_safety_filter_regardless_of_category() {
    let mut engine = engine_with_rating(4.9);
    let pickup = Coord::new(40.7128, -74.0060);
    let driver = engine.register_driver(registration_with_category(pickup, "unverified"));

    let outcome = engine.request_ride(&ride(pickup, Coord::new(40.72, -74.0), true), 0);
    assert_eq!(outcome.assignment().map(|a| a.driver_id), Some(driver.id));
}

#[test]
fn safety_mode_with_only_filtered_drivers_is_not_found() {
    let mut engine = engine_with_rating(4.5);
    let pickup = Coord::new(40.7128, -74.0060);
    engine.register_driver(registration_with_category(pickup, "unverified"));

    let outcome = engine.request_ride(&ride(pickup, Coord::new(40.72, -74.0), true), 0);
    assert!(!outcome.is_found());
}

#[test]
fn winner_becomes_busy_and_is_not_offered_as_idle() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(4));
    let pickup = Coord::new(40.7128, -74.0060);
    let near = engine.register_driver(registration_at(pickup));
    let far = engine.register_driver(registration_at(Coord::new(40.7300, -74.0060)));

    // One degree of latitude takes far longer than the predictive horizon.
    let long_trip = ride(pickup, Coord::new(41.7128, -74.0060), false);
    let first = engine.request_ride(&long_trip, 1_000);
    assert_eq!(first.assignment().map(|a| a.driver_id), Some(near.id));

    let busy = engine.driver(near.id).expect("driver");
    assert_eq!(busy.status, DriverStatus::Busy);
    assert!(busy.trip_end_ms.expect("trip end") > 1_000);

    let second = engine.request_ride(&long_trip, 2_000);
    let assignment = second.assignment().expect("found");
    assert_eq!(assignment.driver_id, far.id);
    assert_eq!(assignment.status, TripStatus::Active);
}

#[test]
fn driver_finishing_soon_gets_a_queued_assignment() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(8));
    let pickup = Coord::new(40.7128, -74.0060);
    let driver = engine.register_driver(registration_at(pickup));

    // About 110 m: a few seconds at city speed.
    let short_trip = ride(pickup, Coord::new(40.7138, -74.0060), false);
    engine.request_ride(&short_trip, 0);
    let before = engine.driver(driver.id).cloned().expect("driver");
    assert_eq!(before.status, DriverStatus::Busy);

    let outcome = engine.request_ride(&short_trip, 0);
    let assignment = outcome.assignment().expect("predictive match");
    assert_eq!(assignment.driver_id, driver.id);
    assert_eq!(assignment.status, TripStatus::Queued);
    assert!(assignment.eta_secs > 0.0);

    // Queued matches leave the driver's own trip untouched.
    assert_eq!(engine.driver(driver.id), Some(&before));
}

#[test]
fn queued_assignment_rejects_its_passcode() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(8));
    let pickup = Coord::new(40.7128, -74.0060);
    engine.register_driver(registration_at(pickup));
    let short_trip = ride(pickup, Coord::new(40.7138, -74.0060), false);
    engine.request_ride(&short_trip, 0);

    let queued = engine
        .request_ride(&short_trip, 0)
        .assignment()
        .cloned()
        .expect("queued");
    assert!(!engine.verify_passcode(queued.ride_id, &queued.passcode));
}

#[test]
fn busy_driver_past_the_horizon_is_skipped() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(8));
    let pickup = Coord::new(40.7128, -74.0060);
    engine.register_driver(registration_at(pickup));
    let long_trip = ride(pickup, Coord::new(41.7128, -74.0060), false);
    engine.request_ride(&long_trip, 0);

    assert!(!engine.request_ride(&long_trip, 0).is_found());
}

#[test]
fn released_driver_is_matchable_again_from_dropoff() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(8));
    let pickup = Coord::new(40.7128, -74.0060);
    let dropoff = Coord::new(41.7128, -74.0060);
    let driver = engine.register_driver(registration_at(pickup));
    engine.request_ride(&ride(pickup, dropoff, false), 0);

    let end = engine
        .driver(driver.id)
        .and_then(|d| d.trip_end_ms)
        .expect("trip end");
    assert_eq!(engine.complete_due_trips(end - 1), 0);
    assert_eq!(engine.complete_due_trips(end), 1);

    let released = engine.driver(driver.id).expect("driver");
    assert_eq!(released.status, DriverStatus::Idle);
    assert_eq!(released.location, dropoff);

    let outcome = engine.request_ride(&ride(dropoff, pickup, false), end);
    assert_eq!(outcome.assignment().map(|a| a.eta_secs), Some(0.0));
}

#[test]
fn route_failures_fall_back_to_fixed_estimate() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(3))
        .with_route_provider(Box::new(FailingRouteProvider));
    engine.register_driver(registration_at(Coord::new(0.0, 0.0)));

    let outcome = engine.request_ride(
        &ride(Coord::new(0.0, 0.0), Coord::new(0.5, 0.5), false),
        0,
    );
    let assignment = outcome.assignment().expect("found despite failures");
    assert_eq!(assignment.eta_secs, 600.0);
    assert_eq!(assignment.trip_distance_m, 5_000.0);
    assert_eq!(assignment.trip_duration_secs, 600.0);
    assert!((assignment.price - 7.5).abs() < 1e-9);
}

#[test]
fn custom_provider_drives_eta_and_price() {
    let mut engine = DispatchEngine::new(DispatchConfig::default(), Some(3)).with_route_provider(
        Box::new(ScriptedRouteProvider {
            duration_secs: 42.0,
            distance_m: 10_000.0,
        }),
    );
    engine.register_driver(registration_at(Coord::new(0.0, 0.0)));

    let outcome = engine.request_ride(
        &ride(Coord::new(0.0, 0.0), Coord::new(0.1, 0.1), true),
        0,
    );
    let assignment = outcome.assignment().expect("found");
    assert_eq!(assignment.eta_secs, 42.0);
    assert!((assignment.price - 15.0 * 1.10).abs() < 1e-9);
}

/// Admits only drivers labelled `"vetted"`, whatever their rating.
struct VettedOnly;

impl SafetyPolicy for VettedOnly {
    fn admits(&self, driver: &Driver) -> bool {
        driver.attributes.trust_category.as_deref() == Some("vetted")
    }
}

#[test]
fn injected_safety_policy_decides_safety_mode_matches() {
    // Ratings of 5.0 pass the default category/rating rule for everyone.
    let mut engine = engine_with_rating(5.0).with_safety_policy(Box::new(VettedOnly));
    let pickup = Coord::new(40.7128, -74.0060);
    engine.register_driver(registration_with_category(pickup, "unverified"));
    let vetted = engine.register_driver(registration_with_category(
        Coord::new(40.7300, -74.0060),
        "vetted",
    ));

    let dropoff = Coord::new(40.7400, -74.0000);
    let outcome = engine.request_ride(&ride(pickup, dropoff, true), 0);
    assert_eq!(outcome.assignment().map(|a| a.driver_id), Some(vetted.id));

    // Outside safety mode the policy is not consulted.
    let outcome = engine.request_ride(&ride(pickup, dropoff, false), 0);
    assert_ne!(outcome.assignment().map(|a| a.driver_id), Some(vetted.id));
    assert!(outcome.is_found());
}

#[test]
fn admit_all_policy_turns_off_safety_filtering() {
    let mut engine = engine_with_rating(4.5).with_safety_policy(Box::new(AdmitAll));
    let pickup = Coord::new(40.7128, -74.0060);
    let driver = engine.register_driver(registration_with_category(pickup, "unverified"));

    let outcome = engine.request_ride(&ride(pickup, Coord::new(40.72, -74.0), true), 0);
    let assignment = outcome.assignment().expect("found");
    assert_eq!(assignment.driver_id, driver.id);
    assert!(assignment.safety_message.is_some());
}
