mod tests {
    use myrtio_matrix_composer::breathe::{BreatheConfig, BreatheEnvelope};

    fn steps(envelope: &mut BreatheEnvelope, frames: usize) -> Vec<u8> {
        (0..frames)
            .map(|_| {
                let multiplier = envelope.advance();
                assert!((0.0..=1.0).contains(&multiplier));
                envelope.current()
            })
            .collect()
    }

    #[test]
    fn test_ramp_turns_at_both_ends() {
        let mut envelope = BreatheEnvelope::new(BreatheConfig {
            min_step: 10,
            max_step: 20,
            step: 3,
        });
        assert_eq!(envelope.current(), 10);

        assert_eq!(
            steps(&mut envelope, 10),
            vec![13, 16, 19, 20, 17, 14, 11, 10, 13, 16]
        );
    }

    #[test]
    fn test_ramp_saturates_at_u8_bounds() {
        let mut envelope = BreatheEnvelope::new(BreatheConfig {
            step: 100,
            ..BreatheConfig::DEFAULT
        });
        assert_eq!(steps(&mut envelope, 7), vec![100, 200, 255, 155, 55, 0, 100]);
    }

    #[test]
    fn test_multiplier_follows_curve() {
        let mut envelope = BreatheEnvelope::new(BreatheConfig::DEFAULT);
        assert_eq!(envelope.multiplier(), 0.0);

        for _ in 0..255 {
            envelope.advance();
        }
        assert_eq!(envelope.current(), 255);
        let top = envelope.multiplier();
        assert!(top > 0.97 && top <= 1.0);
    }

    #[test]
    fn test_reset_restarts_inhale() {
        let mut envelope = BreatheEnvelope::new(BreatheConfig {
            min_step: 10,
            max_step: 20,
            step: 3,
        });
        steps(&mut envelope, 5);
        assert_eq!(envelope.current(), 17);

        envelope.reset();
        assert_eq!(envelope.current(), 10);
        assert_eq!(steps(&mut envelope, 2), vec![13, 16]);
    }
}
