//! Unit tests for um-signal.

#[cfg(test)]
mod helpers {
    use crate::{AdaptiveQueueConfig, ControlStrategy, EnergySavingConfig, FixedTimeConfig};

    pub fn fixed() -> ControlStrategy {
        ControlStrategy::FixedTime(FixedTimeConfig { green_secs: 15.0, yellow_secs: 3.0 })
    }

    /// Base 10 s, threshold 2, +1 s per vehicle, green in [5, 30].
    pub fn adaptive() -> ControlStrategy {
        ControlStrategy::AdaptiveQueue(AdaptiveQueueConfig {
            base_green_secs: 10.0,
            yellow_secs:     3.0,
            min_green_secs:  5.0,
            max_green_secs:  30.0,
            queue_threshold: 2,
            increment_per_vehicle_secs: 1.0,
        })
    }

    pub fn energy() -> ControlStrategy {
        ControlStrategy::EnergySaving(EnergySavingConfig {
            base_green_secs: 12.0,
            yellow_secs:     3.0,
            min_green_secs:  5.0,
            max_green_secs:  40.0,
            low_traffic_threshold: 1,
        })
    }
}

// ── Phase cycle ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod phase {
    use um_core::Approach;
    use crate::{LightPhase, LightState};

    #[test]
    fn strict_four_cycle() {
        let mut p = LightPhase::NsGreenEwRed;
        let expected = [
            LightPhase::NsYellowEwRed,
            LightPhase::NsRedEwGreen,
            LightPhase::NsRedEwYellow,
            LightPhase::NsGreenEwRed,
        ];
        for _ in 0..3 {
            for want in expected {
                p = p.next();
                assert_eq!(p, want);
            }
        }
    }

    #[test]
    fn approach_colours() {
        let p = LightPhase::NsGreenEwRed;
        assert_eq!(p.state_for(Approach::North), LightState::Green);
        assert_eq!(p.state_for(Approach::South), LightState::Green);
        assert_eq!(p.state_for(Approach::East), LightState::Red);

        let p = LightPhase::NsYellowEwRed;
        assert_eq!(p.state_for(Approach::South), LightState::Yellow);
        assert_eq!(p.state_for(Approach::West), LightState::Red);

        let p = LightPhase::NsRedEwGreen;
        assert_eq!(p.state_for(Approach::North), LightState::Red);
        assert_eq!(p.state_for(Approach::West), LightState::Green);

        let p = LightPhase::NsRedEwYellow;
        assert_eq!(p.state_for(Approach::East), LightState::Yellow);
        assert_eq!(p.state_for(Approach::North), LightState::Red);
    }

    #[test]
    fn display_names() {
        assert_eq!(LightPhase::NsRedEwYellow.to_string(), "NS_RED_EW_YELLOW");
        assert_eq!(LightState::Yellow.to_string(), "yellow");
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod strategy {
    use super::helpers;
    use crate::{
        AdaptiveQueueConfig, ControlStrategy, EnergySavingConfig, FixedTimeConfig, LightPhase,
        SignalError, StrategyMode,
    };

    const EMPTY: [usize; 4] = [0, 0, 0, 0];

    #[test]
    fn initial_phase_from_hint() {
        let s = helpers::fixed();
        assert_eq!(s.initialize("East", false).phase, LightPhase::NsRedEwGreen);
        assert_eq!(s.initialize("north-WEST", false).phase, LightPhase::NsRedEwGreen);
        assert_eq!(s.initialize("north", false).phase, LightPhase::NsGreenEwRed);
        assert_eq!(s.initialize("", false).phase, LightPhase::NsGreenEwRed);
    }

    #[test]
    fn initial_duration_clamped() {
        let s = ControlStrategy::AdaptiveQueue(AdaptiveQueueConfig {
            base_green_secs: 28.0,
            max_green_secs:  30.0,
            ..AdaptiveQueueConfig::default()
        });
        assert_eq!(s.initialize("north", false).duration_secs, 28.0);
        assert_eq!(s.initialize("north", true).duration_secs, 30.0);

        let e = helpers::energy();
        assert_eq!(e.initialize("north", true).duration_secs, 14.0);
    }

    #[test]
    fn yellow_follows_green() {
        for s in [helpers::fixed(), helpers::adaptive(), helpers::energy()] {
            let d = s.decide(LightPhase::NsGreenEwRed, EMPTY, false).unwrap();
            assert_eq!(d.phase, LightPhase::NsYellowEwRed);
            assert_eq!(d.duration_secs, 3.0);
        }
    }

    #[test]
    fn fixed_ignores_peak_and_queues() {
        let s = helpers::fixed();
        let off = s.decide(LightPhase::NsYellowEwRed, [9, 9, 9, 9], false).unwrap();
        let on = s.decide(LightPhase::NsYellowEwRed, EMPTY, true).unwrap();
        assert_eq!(off.duration_secs, 15.0);
        assert_eq!(on.duration_secs, 15.0);
    }

    #[test]
    fn adaptive_extends_for_queued_vehicles() {
        // Five vehicles queued on east, which is about to get green:
        // min(30, 10 + (5 - 2) * 1) = 13.
        let s = helpers::adaptive();
        let d = s.decide(LightPhase::NsYellowEwRed, [0, 5, 0, 0], false).unwrap();
        assert_eq!(d.phase, LightPhase::NsRedEwGreen);
        assert_eq!(d.duration_secs, 13.0);
    }

    #[test]
    fn adaptive_uses_longest_of_pair() {
        let s = helpers::adaptive();
        let d = s.decide(LightPhase::NsRedEwYellow, [3, 50, 6, 50], false).unwrap();
        assert_eq!(d.phase, LightPhase::NsGreenEwRed);
        assert_eq!(d.duration_secs, 14.0);
    }

    #[test]
    fn adaptive_shrinks_when_idle() {
        let s = helpers::adaptive();
        let idle = s.green_secs(true, EMPTY, false);
        assert!((idle - 6.6).abs() < 1e-9, "got {idle}");
        // Peak hour skips the shrink and adds the bonus.
        assert_eq!(s.green_secs(true, EMPTY, true), 15.0);
    }

    #[test]
    fn adaptive_green_always_within_bounds() {
        let s = helpers::adaptive();
        for q in [0usize, 1, 2, 3, 10, 1_000, 1_000_000_000_000] {
            for peak in [false, true] {
                for east_west in [false, true] {
                    let g = s.green_secs(east_west, [q, q, q, q], peak);
                    assert!((5.0..=30.0).contains(&g), "q={q} peak={peak} got {g}");
                }
            }
        }
    }

    #[test]
    fn energy_min_green_on_light_traffic() {
        let s = helpers::energy();
        assert_eq!(s.green_secs(false, [1, 0, 0, 0], false), 5.0);
        assert_eq!(s.green_secs(false, [1, 0, 1, 0], false), 12.0);
        assert_eq!(s.green_secs(false, [0, 0, 0, 0], true), 14.0);
    }

    #[test]
    fn energy_capped_at_max() {
        let s = ControlStrategy::EnergySaving(EnergySavingConfig {
            base_green_secs: 50.0,
            ..EnergySavingConfig::default()
        });
        assert_eq!(s.green_secs(true, [0, 9, 0, 9], false), 40.0);
    }

    #[test]
    fn non_positive_duration_is_no_decision() {
        let s = ControlStrategy::FixedTime(FixedTimeConfig { green_secs: 15.0, yellow_secs: 0.0 });
        assert!(s.decide(LightPhase::NsGreenEwRed, EMPTY, false).is_none());
        assert!(s.decide(LightPhase::NsYellowEwRed, EMPTY, false).is_some());
    }

    #[test]
    fn validation() {
        assert!(helpers::adaptive().validate().is_ok());
        let bad = ControlStrategy::AdaptiveQueue(AdaptiveQueueConfig {
            min_green_secs: 40.0,
            max_green_secs: 30.0,
            ..AdaptiveQueueConfig::default()
        });
        assert!(matches!(bad.validate(), Err(SignalError::InvalidConfig { .. })));

        let nan = ControlStrategy::FixedTime(FixedTimeConfig { green_secs: f64::NAN, yellow_secs: 3.0 });
        assert!(nan.validate().is_err());
    }

    #[test]
    fn mode_selector() {
        assert_eq!(StrategyMode::try_from(1).unwrap(), StrategyMode::FixedTime);
        assert_eq!(StrategyMode::try_from(2).unwrap(), StrategyMode::AdaptiveQueue);
        assert_eq!(StrategyMode::try_from(3).unwrap(), StrategyMode::EnergySaving);
        assert_eq!(StrategyMode::try_from(4).unwrap_err(), SignalError::UnknownMode(4));
        assert_eq!(helpers::energy().mode(), StrategyMode::EnergySaving);
        assert_eq!(u8::from(StrategyMode::AdaptiveQueue), 2);
    }
}

// ── TrafficLight ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod light {
    use um_core::{Approach, NodeId, VehicleId};
    use super::helpers;
    use crate::{
        ControlStrategy, FALLBACK_GREEN_SECS, FixedTimeConfig, LightPhase, LightState,
        LightUpdate, TrafficLight,
    };

    #[test]
    fn holds_until_timer_expires() {
        let mut light = TrafficLight::new(NodeId(0), "north", helpers::fixed(), false);
        assert_eq!(light.phase(), LightPhase::NsGreenEwRed);
        for _ in 0..14 {
            assert_eq!(light.update(1.0, false), LightUpdate::Holding);
        }
        assert_eq!(
            light.update(1.0, false),
            LightUpdate::Changed {
                from: LightPhase::NsGreenEwRed,
                to: LightPhase::NsYellowEwRed,
                duration_secs: 3.0,
            }
        );
        assert_eq!(light.remaining_secs(), 3.0);
    }

    #[test]
    fn long_run_never_skips_a_phase() {
        let mut light = TrafficLight::new(NodeId(0), "east", helpers::adaptive(), false);
        let mut prev = light.phase();
        let mut changes = 0;
        for _ in 0..1_000 {
            if let LightUpdate::Changed { from, to, .. } = light.update(1.0, false) {
                assert_eq!(from, prev);
                assert_eq!(to, prev.next());
                prev = to;
                changes += 1;
            }
        }
        assert!(changes > 50);
    }

    #[test]
    fn adaptive_light_reads_its_own_queues() {
        let mut light = TrafficLight::new(NodeId(0), "north", helpers::adaptive(), false);
        for i in 0..5 {
            light.add_vehicle_to_queue(Approach::West, VehicleId(i));
        }
        // Run through NS green and yellow; the EW green must be 13 s.
        let mut ew_green = None;
        for _ in 0..40 {
            if let LightUpdate::Changed { to: LightPhase::NsRedEwGreen, duration_secs, .. } =
                light.update(1.0, false)
            {
                ew_green = Some(duration_secs);
                break;
            }
        }
        assert_eq!(ew_green, Some(13.0));
    }

    #[test]
    fn fallback_on_missing_decision() {
        let broken = ControlStrategy::FixedTime(FixedTimeConfig { green_secs: 2.0, yellow_secs: 0.0 });
        let mut light = TrafficLight::new(NodeId(3), "north", broken, false);
        assert_eq!(light.update(1.0, false), LightUpdate::Holding);
        assert_eq!(
            light.update(1.0, false),
            LightUpdate::Fallback { from: LightPhase::NsGreenEwRed, duration_secs: FALLBACK_GREEN_SECS }
        );
        assert_eq!(light.phase(), LightPhase::NsGreenEwRed);
        assert_eq!(light.remaining_secs(), FALLBACK_GREEN_SECS);
    }

    #[test]
    fn direction_names() {
        let light = TrafficLight::new(NodeId(0), "", helpers::fixed(), false);
        assert_eq!(light.state_for_direction("North"), LightState::Green);
        assert_eq!(light.state_for_direction("east"), LightState::Red);
        assert_eq!(light.state_for_direction("sideways"), LightState::Red);
    }

    #[test]
    fn queues_are_fifo_per_approach() {
        let mut light = TrafficLight::new(NodeId(0), "", helpers::energy(), false);
        light.add_vehicle_to_queue(Approach::North, VehicleId(1));
        light.add_vehicle_to_queue(Approach::North, VehicleId(2));
        light.add_vehicle_to_queue(Approach::South, VehicleId(3));
        light.add_vehicle_to_queue(Approach::West, VehicleId(4));

        assert_eq!(light.queue_sizes(), [2, 0, 1, 1]);
        assert_eq!(light.total_queued(), 4);
        assert_eq!(light.pop_vehicle_from_queue(Approach::North), Some(VehicleId(1)));
        assert_eq!(light.pop_vehicle_from_queue(Approach::East), None);

        assert!(light.remove_from_queue(Approach::West, VehicleId(4)));
        assert!(!light.remove_from_queue(Approach::West, VehicleId(4)));
        assert_eq!(light.queue_sizes(), [1, 0, 1, 0]);
        assert_eq!(light.queue(Approach::North).front(), Some(&VehicleId(2)));
    }
}
