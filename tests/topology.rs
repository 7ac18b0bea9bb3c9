mod tests {
    use myrtio_matrix_composer::color::Rgb;
    use myrtio_matrix_composer::topology::{
        LedAddress, LedLayout, NO_SCAN_CODE, ONOFF_PAGE_BYTES, PWM_PAGE_BYTES, Topology,
        WriteTarget, onoff_position, pwm_offset,
    };

    const ADDRESSES: [u8; 2] = [0xA0, 0xBE];

    fn layout() -> [LedLayout; 3] {
        [
            LedLayout::new(1, LedAddress::new(1, 1, 1, 2, 3), 0.0, 0.0, 0),
            LedLayout::new(2, LedAddress::new(2, 16, 10, 11, 12), 10.0, 5.0, 1),
            // No third driver on this board
            LedLayout::new(3, LedAddress::new(3, 1, 1, 2, 3), 20.0, 10.0, NO_SCAN_CODE),
        ]
    }

    #[test]
    fn test_pwm_offset() {
        assert_eq!(pwm_offset(1, 1), Some(1));
        assert_eq!(pwm_offset(1, 16), Some(16));
        assert_eq!(pwm_offset(2, 1), Some(17));
        assert_eq!(pwm_offset(12, 16), Some(PWM_PAGE_BYTES - 1));

        assert_eq!(pwm_offset(0, 1), None);
        assert_eq!(pwm_offset(1, 0), None);
        assert_eq!(pwm_offset(13, 1), None);
        assert_eq!(pwm_offset(1, 17), None);
    }

    #[test]
    fn test_onoff_position() {
        assert_eq!(onoff_position(1, 1), Some((1, 0)));
        assert_eq!(onoff_position(1, 8), Some((1, 7)));
        assert_eq!(onoff_position(1, 9), Some((2, 0)));
        assert_eq!(onoff_position(2, 1), Some((3, 0)));
        assert_eq!(onoff_position(12, 16), Some((ONOFF_PAGE_BYTES - 1, 7)));
        assert_eq!(onoff_position(0, 0), None);
    }

    #[test]
    fn test_build_resolves_write_targets() {
        let topology = Topology::build(ADDRESSES, &layout());

        let first = |offset| WriteTarget { driver: 0, offset };
        assert_eq!(
            topology.leds[0].targets,
            Some([first(1), first(17), first(33)])
        );

        let second = |offset| WriteTarget { driver: 1, offset };
        assert_eq!(
            topology.leds[1].targets,
            Some([second(160), second(176), second(192)])
        );

        assert_eq!(topology.leds[2].targets, None);
    }

    #[test]
    fn test_build_enables_used_channels() {
        let topology = Topology::build(ADDRESSES, &layout());

        assert_eq!(topology.drivers[0].address(), 0xA0);
        assert!(topology.drivers[0].is_channel_enabled(1, 1));
        assert!(topology.drivers[0].is_channel_enabled(2, 1));
        assert!(topology.drivers[0].is_channel_enabled(3, 1));
        assert!(!topology.drivers[0].is_channel_enabled(4, 1));
        assert!(!topology.drivers[0].is_channel_enabled(1, 2));

        assert_eq!(topology.drivers[1].address(), 0xBE);
        assert!(topology.drivers[1].is_channel_enabled(12, 16));
        assert!(!topology.drivers[1].is_channel_enabled(1, 1));
    }

    #[test]
    fn test_write_color() {
        let mut topology = Topology::build(ADDRESSES, &layout());
        let color = Rgb::new(1, 2, 3);

        topology.write_color(1, color);
        assert_eq!(topology.drivers[1].pwm(160), 1);
        assert_eq!(topology.drivers[1].pwm(176), 2);
        assert_eq!(topology.drivers[1].pwm(192), 3);
        assert_eq!(topology.read_color(1), Some(color));
        assert_eq!(topology.read_color(0), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_write_color_ignores_unresolved_leds() {
        let mut topology = Topology::build(ADDRESSES, &layout());
        let before = topology.drivers.clone();

        topology.write_color(2, Rgb::new(9, 9, 9));
        topology.write_color(7, Rgb::new(9, 9, 9));

        assert_eq!(topology.drivers, before);
        assert_eq!(topology.read_color(2), None);
        assert_eq!(topology.read_color(7), None);
    }

    #[test]
    fn test_led_is_key() {
        let topology = Topology::build(ADDRESSES, &layout());
        assert!(topology.leds[0].is_key());
        assert!(topology.leds[1].is_key());
        assert!(!topology.leds[2].is_key());
    }
}
