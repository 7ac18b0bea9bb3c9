mod tests {
    use myrtio_matrix_composer::gcr::{
        ExtraPortState, GcrConfig, GcrController, GcrEffects, PowerSample,
    };

    const HEALTHY: PowerSample = PowerSample {
        v5: 2600,
        v5_avg: 2600,
        extra_port: ExtraPortState::Disabled,
    };

    const SAGGING: PowerSample = PowerSample {
        v5: 2450,
        v5_avg: 2450,
        extra_port: ExtraPortState::Disabled,
    };

    const CATASTROPHIC: PowerSample = PowerSample {
        v5: 2100,
        v5_avg: 2500,
        extra_port: ExtraPortState::Disabled,
    };

    fn manual(desired: u8) -> GcrController {
        let mut gcr = GcrController::new(GcrConfig {
            auto: false,
            ..GcrConfig::DEFAULT
        });
        gcr.set_desired(desired);
        gcr
    }

    fn ramp(gcr: &mut GcrController, sample: PowerSample, ticks: usize) {
        for _ in 0..ticks {
            gcr.tick(sample);
        }
    }

    #[test]
    fn test_manual_mode_steps_toward_target() {
        let mut gcr = manual(10);
        let mut seen = Vec::new();
        for _ in 0..8 {
            gcr.tick(HEALTHY);
            seen.push(gcr.actual());
        }
        assert_eq!(seen, vec![2, 4, 6, 8, 10, 10, 10, 10]);

        gcr.set_desired(4);
        ramp(&mut gcr, HEALTHY, 3);
        assert_eq!(gcr.actual(), 4);
    }

    #[test]
    fn test_manual_mode_ignores_voltage() {
        let mut gcr = manual(6);
        ramp(&mut gcr, SAGGING, 3);
        assert_eq!(gcr.actual(), 6);
    }

    #[test]
    fn test_desired_is_capped_at_max() {
        let mut gcr = manual(200);
        assert_eq!(gcr.desired(), 165);

        let mut last = gcr.actual();
        for _ in 0..200 {
            gcr.tick(HEALTHY);
            let actual = gcr.actual();
            assert!(actual <= 165);
            assert!(actual.abs_diff(last) <= 2);
            last = actual;
        }
        assert_eq!(gcr.actual(), 165);
    }

    #[test]
    fn test_auto_mode_reacts_to_average_voltage() {
        let mut gcr = GcrController::new(GcrConfig::DEFAULT);
        assert!(gcr.is_auto());
        gcr.set_desired(100);

        ramp(&mut gcr, HEALTHY, 10);
        assert_eq!(gcr.actual(), 20);

        // Inside the hysteresis band nothing changes below the target
        let steady = PowerSample {
            v5_avg: 2500,
            ..HEALTHY
        };
        ramp(&mut gcr, steady, 5);
        assert_eq!(gcr.actual(), 20);

        ramp(&mut gcr, SAGGING, 3);
        assert_eq!(gcr.actual(), 14);
    }

    #[test]
    fn test_auto_mode_drops_to_lower_target() {
        let mut gcr = GcrController::new(GcrConfig::DEFAULT);
        gcr.set_desired(20);
        ramp(&mut gcr, HEALTHY, 10);
        assert_eq!(gcr.actual(), 20);

        gcr.set_desired(16);
        let steady = PowerSample {
            v5_avg: 2500,
            ..HEALTHY
        };
        ramp(&mut gcr, steady, 5);
        assert_eq!(gcr.actual(), 16);
    }

    #[test]
    fn test_decrease_floors_at_zero() {
        let mut gcr = manual(4);
        ramp(&mut gcr, HEALTHY, 2);
        assert_eq!(gcr.actual(), 4);

        gcr.set_auto(true);
        ramp(&mut gcr, SAGGING, 1);
        assert_eq!(gcr.actual(), 2);
        ramp(&mut gcr, SAGGING, 1);
        assert_eq!(gcr.actual(), 0);
        ramp(&mut gcr, SAGGING, 5);
        assert_eq!(gcr.actual(), 0);
    }

    #[test]
    fn test_catastrophic_cutoff_and_recovery() {
        let mut gcr = manual(40);
        ramp(&mut gcr, HEALTHY, 20);
        assert_eq!(gcr.actual(), 40);

        let effects = gcr.tick(CATASTROPHIC);
        assert_eq!(effects.drivers_enabled, Some(false));
        assert_eq!(gcr.actual(), 0);
        assert!(gcr.is_auto());
        assert!(gcr.is_recovering());

        // Held off for the rest of the countdown
        for _ in 0..19 {
            assert_eq!(gcr.tick(HEALTHY), GcrEffects::default());
            assert_eq!(gcr.actual(), 0);
        }

        let effects = gcr.tick(HEALTHY);
        assert_eq!(effects.drivers_enabled, Some(true));
        assert_eq!(gcr.actual(), 0);
        assert!(!gcr.is_recovering());

        // Normal control resumes on the next tick
        gcr.tick(HEALTHY);
        assert_eq!(gcr.actual(), 2);
    }

    #[test]
    fn test_repeated_catastrophe_restarts_countdown() {
        let mut gcr = manual(40);
        gcr.tick(CATASTROPHIC);
        ramp(&mut gcr, HEALTHY, 10);

        let effects = gcr.tick(CATASTROPHIC);
        assert_eq!(effects.drivers_enabled, Some(false));

        ramp(&mut gcr, HEALTHY, 19);
        assert!(gcr.is_recovering());
        assert_eq!(gcr.tick(HEALTHY).drivers_enabled, Some(true));
    }

    #[test]
    fn test_take_changed() {
        let mut gcr = manual(4);
        assert_eq!(gcr.take_changed(), None);

        gcr.tick(HEALTHY);
        assert_eq!(gcr.take_changed(), Some(2));
        assert_eq!(gcr.take_changed(), None);

        gcr.tick(HEALTHY);
        gcr.tick(HEALTHY);
        assert_eq!(gcr.take_changed(), Some(4));
    }

    #[test]
    fn test_extra_port_shutdown_after_sustained_minimum() {
        let mut gcr = GcrController::new(GcrConfig::DEFAULT);
        let starved = PowerSample {
            extra_port: ExtraPortState::Enabled,
            ..SAGGING
        };

        for tick in 0..200 {
            let effects = gcr.tick(starved);
            assert!(!effects.disable_extra_port, "tick {}", tick);
        }
        let effects = gcr.tick(starved);
        assert!(effects.disable_extra_port);
        assert!(effects.has_effects());
    }

    #[test]
    fn test_extra_port_left_alone_when_not_enabled() {
        let mut gcr = GcrController::new(GcrConfig::DEFAULT);
        for extra_port in [ExtraPortState::Disabled, ExtraPortState::DisabledUntilReplug] {
            let sample = PowerSample {
                extra_port,
                ..SAGGING
            };
            for _ in 0..300 {
                assert!(!gcr.tick(sample).disable_extra_port);
            }
        }
    }

    #[test]
    fn test_recovering_supply_resets_minimum_counter() {
        let mut gcr = GcrController::new(GcrConfig::DEFAULT);
        let starved = PowerSample {
            extra_port: ExtraPortState::Enabled,
            ..SAGGING
        };
        let steady = PowerSample {
            v5_avg: 2500,
            extra_port: ExtraPortState::Enabled,
            ..HEALTHY
        };

        ramp(&mut gcr, starved, 150);
        gcr.tick(steady);
        for _ in 0..200 {
            assert!(!gcr.tick(starved).disable_extra_port);
        }
    }

    #[test]
    fn test_breathe_target_follows_supply() {
        let mut gcr = manual(100);
        ramp(&mut gcr, HEALTHY, 50);
        assert_eq!(gcr.actual(), 100);

        gcr.set_breathing(true);
        assert_eq!(gcr.breathe(), 100);

        gcr.set_auto(true);
        gcr.tick(SAGGING);
        assert_eq!(gcr.actual(), 98);
        assert_eq!(gcr.breathe(), 98);

        // Steady supply holds at the lowered breathe target
        let steady = PowerSample {
            v5_avg: 2500,
            ..HEALTHY
        };
        ramp(&mut gcr, steady, 5);
        assert_eq!(gcr.actual(), 98);
        assert_eq!(gcr.desired(), 100);
    }

    #[test]
    fn test_breathe_target_untouched_without_breathing() {
        let mut gcr = manual(100);
        ramp(&mut gcr, HEALTHY, 50);
        gcr.set_auto(true);
        gcr.tick(SAGGING);
        assert_eq!(gcr.actual(), 98);
        assert_eq!(gcr.breathe(), 100);
    }
}
