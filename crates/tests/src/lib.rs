//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract snapshots (defaults, error messages)
//! - Config file -> engine wiring
//! - Simulated, replayed and scripted end-to-end runs

#[cfg(test)]
mod contract_tests {
    use contracts::{EngineConfig, EngineError, SensorKind};

    #[test]
    fn test_default_config_snapshot() {
        let config = EngineConfig::default();
        assert_eq!(config.sensor.frequency_hz, 20);
        assert_eq!(config.sensor.min_frequency_hz, 10);
        assert_eq!(config.sensor.max_frequency_hz, 60);
        assert_eq!(config.sensor.prefer, SensorKind::Accelerometer);
        assert_eq!(config.detector.threshold, 25.0);
        assert_eq!(config.signal.shaking_window_ms, 300);
    }

    #[test]
    fn test_error_messages_name_the_sensor() {
        let kind = SensorKind::Gyroscope;
        assert!(EngineError::PermissionDenied { kind }
            .to_string()
            .contains("Gyroscope"));
        assert!(EngineError::NotReadable { kind }
            .to_string()
            .contains("Gyroscope"));
        assert!(EngineError::Other {
            kind,
            message: "boom".to_string()
        }
        .to_string()
        .ends_with("boom"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        EngineConfig, EngineError, EngineEvent, EngineState, Reading, SensorKind, ShakeCounter,
    };
    use sensor_lifecycle::{
        AlwaysOpen, QueryThenGate, ReplayConfig, ReplayPlatform, ScriptConfig, ScriptedPlatform,
        ShakeEngine, SimulatedConfig, SimulatedPlatform, StaticPermission,
    };
    use shake_detector::ShakeDetector;
    use tokio::sync::broadcast;

    async fn wait_for(
        rx: &mut broadcast::Receiver<EngineEvent>,
        pred: impl Fn(&EngineEvent) -> bool,
    ) -> Vec<EngineEvent> {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for event")
                .expect("event channel closed");
            let done = pred(&event);
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    fn running(event: &EngineEvent) -> bool {
        matches!(event, EngineEvent::StateChanged(EngineState::Running { .. }))
    }

    /// Drain events received so far into the counter
    fn drain(rx: &mut broadcast::Receiver<EngineEvent>, counter: &mut ShakeCounter) {
        while let Ok(event) = rx.try_recv() {
            counter.observe(&event);
        }
    }

    /// End-to-end: TOML config -> ShakeEngine -> simulated sensor -> shake count
    #[tokio::test]
    async fn test_e2e_simulated_sensor_counts_shakes() {
        let config = ConfigLoader::load_from_str(
            r#"
            [sensor]
            frequency_hz = 60

            [permission]
            mode = "always_open"
            "#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let platform = SimulatedPlatform::new(SimulatedConfig {
            open_delay: Duration::ZERO,
            burst_period: Duration::from_millis(200),
            burst_length: Duration::from_millis(100),
            ..Default::default()
        });
        let engine = ShakeEngine::spawn(platform, AlwaysOpen, &config);
        let mut rx = engine.subscribe();

        engine.start_default().unwrap();
        wait_for(&mut rx, running).await;

        tokio::time::sleep(Duration::from_millis(700)).await;
        let mut counter = ShakeCounter::new();
        drain(&mut rx, &mut counter);

        assert!(counter.get() >= 2, "expected shakes, got {}", counter.get());
        engine.shutdown().await;
    }

    /// End-to-end: JSONL recording -> replay platform -> exact shake count
    #[tokio::test]
    async fn test_e2e_replay_matches_offline_detector() {
        let readings = [
            [0.0, 0.0, 9.81],
            [30.0, 0.0, 9.81],
            [30.0, 0.0, 9.81],
            [0.0, 0.0, 9.81],
            [0.0, 0.0, 9.81],
            [-30.0, 0.0, 9.81],
            [-30.0, 0.0, 9.81],
            [0.0, 0.0, 9.81],
        ];

        let mut file = tempfile::NamedTempFile::new().unwrap();
        for (i, [x, y, z]) in readings.iter().enumerate() {
            writeln!(
                file,
                r#"{{"t": {}, "x": {x}, "y": {y}, "z": {z}}}"#,
                i as f64 * 0.05
            )
            .unwrap();
        }

        let mut offline = ShakeDetector::default();
        let expected = readings
            .iter()
            .filter(|r| offline.process(Reading::from(**r)))
            .count() as u64;
        assert_eq!(expected, 4);

        let platform = ReplayPlatform::load(
            file.path(),
            ReplayConfig {
                speed: 4.0,
                ..Default::default()
            },
        )
        .unwrap();
        let engine = ShakeEngine::spawn(platform, AlwaysOpen, &EngineConfig::default());
        let mut rx = engine.subscribe();
        engine.start(60).unwrap();
        wait_for(&mut rx, running).await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        let mut counter = ShakeCounter::new();
        drain(&mut rx, &mut counter);

        assert_eq!(counter.get(), expected);
        engine.shutdown().await;
    }

    /// Full lifecycle against the scripted platform: permission, shake,
    /// reconfigure, caller-side reset, stop
    #[tokio::test(start_paused = true)]
    async fn test_e2e_scripted_lifecycle() {
        let platform = ScriptedPlatform::with_config(ScriptConfig {
            open_delay: Duration::from_millis(20),
            ..Default::default()
        });
        let engine = ShakeEngine::spawn(
            platform.clone(),
            QueryThenGate::new(StaticPermission::granted()),
            &EngineConfig::default(),
        );
        let mut rx = engine.subscribe();
        let mut counter = ShakeCounter::new();

        engine.start(20).unwrap();
        wait_for(&mut rx, running).await;

        let first = platform.latest().unwrap();
        first.emit(Reading::new(0.0, 0.0, 0.0));
        first.emit(Reading::new(30.0, 0.0, 0.0));
        first.emit(Reading::new(30.0, 0.0, 0.0));
        first.emit(Reading::new(-30.0, 0.0, 0.0));
        let events = wait_for(&mut rx, |e| matches!(e, EngineEvent::ShakingEnded)).await;
        for event in &events {
            counter.observe(event);
        }
        assert_eq!(counter.get(), 2);

        // Count is caller-owned: reset does not touch the engine
        counter.reset();
        assert_eq!(counter.get(), 0);

        engine.set_frequency(50).unwrap();
        let events = wait_for(&mut rx, running).await;
        assert!(events.contains(&EngineEvent::StateChanged(EngineState::Running {
            kind: SensorKind::Accelerometer,
            frequency_hz: 50
        })));
        assert!(first.was_stopped());

        let second = platform.latest().unwrap();
        assert_eq!(second.frequency_hz(), 50);
        second.emit(Reading::new(30.0, 0.0, 0.0));
        let events = wait_for(&mut rx, |e| matches!(e, EngineEvent::Shake(_))).await;
        for event in &events {
            counter.observe(event);
        }
        assert_eq!(counter.get(), 1);

        engine.stop();
        wait_for(&mut rx, |e| {
            matches!(e, EngineEvent::StateChanged(EngineState::Stopped))
        })
        .await;
        assert!(second.was_stopped());
        assert!(!second.emit(Reading::new(-30.0, 0.0, 0.0)));
        engine.shutdown().await;
    }

    /// Unsupported device: one error, no sensor construction
    #[tokio::test(start_paused = true)]
    async fn test_e2e_unsupported_device() {
        let platform = ScriptedPlatform::with_config(ScriptConfig {
            capabilities: contracts::Capabilities::none(),
            ..Default::default()
        });
        let engine = ShakeEngine::spawn(platform.clone(), AlwaysOpen, &EngineConfig::default());
        let mut rx = engine.subscribe();

        engine.start(20).unwrap();
        let events = wait_for(&mut rx, |e| matches!(e, EngineEvent::Error(_))).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let errors = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Error(_)))
            .count();
        assert_eq!(errors, 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(
            engine.current_state(),
            EngineState::Failed(EngineError::Unsupported)
        );
        assert_eq!(platform.open_calls(), 0);
    }

    /// Config file on disk drives detector threshold and preferred sensor
    #[tokio::test(start_paused = true)]
    async fn test_e2e_config_file_drives_engine() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[sensor]\nprefer = \"gyroscope\"\n\n[detector]\nthreshold = 2.0"
        )
        .unwrap();
        let config = ConfigLoader::load_from_path(file.path()).unwrap();

        let platform = ScriptedPlatform::new();
        let engine = ShakeEngine::spawn(platform.clone(), AlwaysOpen, &config);
        let mut rx = engine.subscribe();
        engine.start(20).unwrap();
        wait_for(&mut rx, running).await;

        assert_eq!(
            engine.current_state(),
            EngineState::Running {
                kind: SensorKind::Gyroscope,
                frequency_hz: 20
            }
        );

        platform.latest().unwrap().emit(Reading::new(3.0, 0.0, 0.0));
        let events = wait_for(&mut rx, |e| matches!(e, EngineEvent::Shake(_))).await;
        match events.last() {
            Some(EngineEvent::Shake(shake)) => assert_eq!(shake.sensor_kind, SensorKind::Gyroscope),
            other => panic!("expected shake, got {other:?}"),
        }
    }
}
