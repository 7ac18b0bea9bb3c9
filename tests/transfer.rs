mod tests {
    use myrtio_matrix_composer::LedBus;
    use myrtio_matrix_composer::topology::DriverRegisters;
    use myrtio_matrix_composer::transfer::{
        MAX_TRANSFER_RETRIES, TransferQueue, TransferRequest, TrySendError,
    };

    #[derive(Default)]
    struct RecordingBus {
        started: Vec<TransferRequest>,
    }

    impl LedBus for RecordingBus {
        fn start_transfer(&mut self, request: &TransferRequest) {
            self.started.push(request.clone());
        }
    }

    fn gcr(address: u8, value: u8) -> TransferRequest {
        TransferRequest::Gcr { address, value }
    }

    #[test]
    fn test_one_transfer_in_flight() {
        let queue: TransferQueue<4> = TransferQueue::new();
        let mut bus = RecordingBus::default();

        queue.try_enqueue(gcr(0xA0, 1)).unwrap();
        queue.try_enqueue(gcr(0xBE, 1)).unwrap();
        assert!(!queue.is_idle());

        assert!(queue.run(&mut bus));
        assert!(queue.is_busy());
        assert_eq!(queue.pending(), 1);
        assert_eq!(bus.started, vec![gcr(0xA0, 1)]);

        // Already busy
        assert!(!queue.run(&mut bus));
        assert_eq!(bus.started.len(), 1);
    }

    #[test]
    fn test_completion_drains_queue() {
        let queue: TransferQueue<4> = TransferQueue::new();
        let mut bus = RecordingBus::default();

        queue.try_enqueue(gcr(0xA0, 1)).unwrap();
        queue.try_enqueue(gcr(0xBE, 1)).unwrap();
        queue.run(&mut bus);

        queue.on_transfer_complete(&mut bus);
        assert_eq!(bus.started, vec![gcr(0xA0, 1), gcr(0xBE, 1)]);
        assert!(queue.is_busy());

        queue.on_transfer_complete(&mut bus);
        assert!(!queue.is_busy());
        assert!(queue.is_idle());
        assert_eq!(bus.started.len(), 2);
    }

    #[test]
    fn test_full_queue_rejects() {
        let queue: TransferQueue<2> = TransferQueue::new();
        queue.try_enqueue(gcr(0xA0, 1)).unwrap();
        queue.try_enqueue(gcr(0xA0, 2)).unwrap();
        assert_eq!(
            queue.try_enqueue(gcr(0xA0, 3)),
            Err(TrySendError(gcr(0xA0, 3)))
        );
    }

    #[test]
    fn test_failed_transfer_is_retried_then_dropped() {
        let queue: TransferQueue<4> = TransferQueue::new();
        let mut bus = RecordingBus::default();

        queue.try_enqueue(gcr(0xA0, 1)).unwrap();
        queue.try_enqueue(gcr(0xBE, 1)).unwrap();
        queue.run(&mut bus);

        for _ in 0..MAX_TRANSFER_RETRIES {
            queue.on_transfer_error(&mut bus);
        }
        assert_eq!(bus.started.len(), 1 + usize::from(MAX_TRANSFER_RETRIES));
        assert!(bus.started.iter().all(|request| *request == gcr(0xA0, 1)));
        assert_eq!(queue.dropped(), 0);

        // Out of retries: dropped and the next request starts
        queue.on_transfer_error(&mut bus);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(bus.started.last(), Some(&gcr(0xBE, 1)));
        assert_eq!(queue.bus_errors(), u32::from(MAX_TRANSFER_RETRIES) + 1);

        queue.on_transfer_complete(&mut bus);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_retry_counter_is_per_transfer() {
        let queue: TransferQueue<4> = TransferQueue::new();
        let mut bus = RecordingBus::default();

        queue.try_enqueue(gcr(0xA0, 1)).unwrap();
        queue.try_enqueue(gcr(0xBE, 1)).unwrap();
        queue.run(&mut bus);

        queue.on_transfer_error(&mut bus);
        queue.on_transfer_complete(&mut bus);

        for _ in 0..MAX_TRANSFER_RETRIES {
            queue.on_transfer_error(&mut bus);
        }
        assert_eq!(queue.dropped(), 0);
        assert!(queue.is_busy());
    }

    #[test]
    fn test_bus_error_only_counts() {
        let queue: TransferQueue<4> = TransferQueue::new();
        let mut bus = RecordingBus::default();
        queue.try_enqueue(gcr(0xA0, 1)).unwrap();
        queue.run(&mut bus);

        queue.on_bus_error();
        assert_eq!(queue.bus_errors(), 1);
        assert!(queue.is_busy());
        assert_eq!(bus.started.len(), 1);
    }

    #[test]
    fn test_error_without_transfer_clears_busy() {
        let queue: TransferQueue<4> = TransferQueue::new();
        let mut bus = RecordingBus::default();
        queue.on_transfer_error(&mut bus);
        assert!(queue.is_idle());
        assert!(bus.started.is_empty());
    }

    #[test]
    fn test_pwm_request_copies_page() {
        let mut driver = DriverRegisters::new(0xA0);
        driver.set_pwm(1, 9);
        driver.set_pwm(192, 7);

        let request = TransferRequest::pwm(&driver);
        driver.set_pwm(1, 0);

        assert_eq!(request.address(), 0xA0);
        let TransferRequest::Pwm { data, .. } = request else {
            panic!("expected a PWM request");
        };
        assert_eq!(data[1], 9);
        assert_eq!(data[192], 7);

        assert_eq!(TransferRequest::gcr(&driver, 5), gcr(0xA0, 5));
    }
}
