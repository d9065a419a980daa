//! # Integration Tests
//!
//! 跨 crate 集成测试与端到端测试。
//!
//! 负责：
//! - 基于 mock 平台的分发器行为（路由、注册、拷贝）
//! - 并发投递与反复启停
//! - 配置 -> 平台 -> 分发器端到端，包括流式会话

#[cfg(test)]
mod contract_tests {
    use contracts::{SensorType, SessionConfig};

    #[test]
    fn test_known_types_round_trip_codes() {
        for sensor_type in SensorType::KNOWN {
            assert_eq!(SensorType::from_code(sensor_type.code()), sensor_type);
        }
    }

    #[test]
    fn test_default_session_is_valid() {
        config_loader::ConfigLoader::validate(&SessionConfig::default()).unwrap();
    }
}

#[cfg(test)]
mod dispatch_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use collector::{DispatcherConfig, SensorDispatcher, StartOutcome};
    use contracts::{MockSensorSpec, SensorType};
    use mock_provider::MockSensorProvider;

    const FIVE_TYPES: [SensorType; 5] = [
        SensorType::Accelerometer,
        SensorType::Gyroscope,
        SensorType::MagneticField,
        SensorType::Light,
        SensorType::Pressure,
    ];

    fn five_sensor_platform() -> (Arc<MockSensorProvider>, SensorDispatcher) {
        let specs = FIVE_TYPES
            .iter()
            .map(|&t| MockSensorSpec::new(t, format!("mock-{}", t.as_str()), 2))
            .collect();
        let provider = Arc::new(MockSensorProvider::new(specs));
        let dispatcher = SensorDispatcher::new(provider.clone(), DispatcherConfig::default());
        (provider, dispatcher)
    }

    /// 100 readings over 5 types (20 each) from concurrent threads land in
    /// exactly 5 batches of 20, each holding only its own type's readings.
    #[test]
    fn test_concurrent_readings_are_partitioned_by_type() {
        let (provider, dispatcher) = five_sensor_platform();
        for &t in &FIVE_TYPES {
            assert_eq!(dispatcher.start(t), StartOutcome::Registered);
        }

        std::thread::scope(|scope| {
            for (idx, &t) in FIVE_TYPES.iter().enumerate() {
                let provider = &provider;
                scope.spawn(move || {
                    for i in 0..20 {
                        assert_eq!(provider.emit(t, &[idx as f32, i as f32]), 1);
                    }
                });
            }
        });

        let snapshots = dispatcher.snapshot_all();
        assert_eq!(snapshots.len(), 5);
        for snapshot in &snapshots {
            let idx = FIVE_TYPES
                .iter()
                .position(|&t| t == snapshot.sensor_type)
                .unwrap();
            let expected_label = format!("mock-{}", snapshot.sensor_type.as_str());

            assert_eq!(snapshot.data.len(), 20);
            for (i, data) in snapshot.data.iter().enumerate() {
                assert_eq!(data.label().as_str(), expected_label);
                assert_eq!(data.values(), &[idx as f32, i as f32]);
            }
        }
        assert_eq!(dispatcher.metrics().snapshot().readings_recorded, 100);
    }

    #[test]
    fn test_many_writers_per_type_lose_nothing() {
        let (provider, dispatcher) = five_sensor_platform();
        dispatcher.start_all();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                for &t in &FIVE_TYPES {
                    let provider = &provider;
                    scope.spawn(move || {
                        for _ in 0..50 {
                            provider.emit(t, &[1.0, 2.0]);
                        }
                    });
                }
            }
        });

        for &t in &FIVE_TYPES {
            assert_eq!(dispatcher.batch(t).len(), 200);
        }
    }

    #[test]
    fn test_readings_are_stored_in_delivery_order() {
        let (provider, dispatcher) = five_sensor_platform();
        dispatcher.start(SensorType::Light);

        for i in 0..500 {
            provider.emit(SensorType::Light, &[i as f32, 0.0]);
        }

        let snapshot = dispatcher.batch(SensorType::Light).snapshot();
        let firsts: Vec<f32> = snapshot.data.iter().map(|d| d.values()[0]).collect();
        let expected: Vec<f32> = (0..500).map(|i| i as f32).collect();
        assert_eq!(firsts, expected);
    }

    #[test]
    fn test_stored_values_survive_buffer_recycling() {
        let (provider, dispatcher) = five_sensor_platform();
        dispatcher.start(SensorType::Gyroscope);

        provider.emit(SensorType::Gyroscope, &[0.25, -0.5]);
        provider.emit(SensorType::Gyroscope, &[1.0, 2.0]);

        let snapshot = dispatcher.batch(SensorType::Gyroscope).snapshot();
        assert_eq!(snapshot.data[0].values(), &[0.25, -0.5]);
        assert_eq!(snapshot.data[1].values(), &[1.0, 2.0]);
        assert!(snapshot
            .data
            .iter()
            .all(|d| d.values().iter().all(|v| v.is_finite())));
    }

    /// Concurrent start/stop churn never leaves more than one live
    /// subscription for a type, and always reuses the same listener.
    #[test]
    fn test_start_stop_churn_keeps_single_subscription() {
        let (provider, dispatcher) = five_sensor_platform();
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            let watcher = scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    assert!(provider.subscription_count(SensorType::Accelerometer) <= 1);
                    std::thread::yield_now();
                }
            });

            let workers: Vec<_> = (0..8)
                .map(|worker| {
                    let dispatcher = &dispatcher;
                    scope.spawn(move || {
                        for i in 0..200 {
                            if (i + worker) % 3 == 0 {
                                dispatcher.stop(SensorType::Accelerometer);
                            } else {
                                dispatcher.start(SensorType::Accelerometer);
                            }
                        }
                    })
                })
                .collect();

            for worker in workers {
                worker.join().unwrap();
            }
            done.store(true, Ordering::Release);
            watcher.join().unwrap();
        });

        let live = provider.subscription_count(SensorType::Accelerometer);
        let expected = usize::from(dispatcher.is_registered(SensorType::Accelerometer));
        assert_eq!(live, expected);
        assert_eq!(provider.distinct_listeners(SensorType::Accelerometer), 1);
    }

    #[test]
    fn test_readings_between_stop_and_restart_are_dropped() {
        let (provider, dispatcher) = five_sensor_platform();
        dispatcher.start(SensorType::Pressure);
        provider.emit(SensorType::Pressure, &[1013.0, 0.0]);

        assert!(dispatcher.stop(SensorType::Pressure));
        assert!(!dispatcher.stop(SensorType::Pressure));
        assert_eq!(provider.emit(SensorType::Pressure, &[999.0, 0.0]), 0);

        assert_eq!(dispatcher.start(SensorType::Pressure), StartOutcome::Registered);
        provider.emit(SensorType::Pressure, &[1000.0, 0.0]);

        let values: Vec<f32> = dispatcher
            .batch(SensorType::Pressure)
            .snapshot()
            .data
            .iter()
            .map(|d| d.values()[0])
            .collect();
        assert_eq!(values, vec![1013.0, 1000.0]);
    }

    #[test]
    fn test_absent_type_leaves_batches_untouched() {
        let (provider, dispatcher) = five_sensor_platform();

        assert_eq!(
            dispatcher.start(SensorType::HeartRate),
            StartOutcome::SourceAbsent
        );
        assert!(dispatcher.known_types().is_empty());
        assert_eq!(provider.subscribe_calls(), 0);

        let batch = dispatcher.batch(SensorType::HeartRate);
        assert!(batch.is_empty());
        assert!(batch.source_name().is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use collector::{DispatcherConfig, SensorDispatcher, StartOutcome};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::SensorType;
    use mock_provider::{MockProviderConfig, MockSensorProvider};
    use observability::BatchSummary;

    const SESSION_TOML: &str = r#"
[session]
sensors = ["accelerometer", "light", "heart_rate"]
sampling_rate = "fastest"
eager_batches = true
duration_secs = 1.0

[mock]
refuse = ["gyroscope"]

[[mock.sensors]]
sensor_type = "accelerometer"
name = "Streaming Accel"
frequency_hz = 500.0

[[mock.sensors]]
sensor_type = "gyroscope"
name = "Streaming Gyro"
frequency_hz = 500.0

[[mock.sensors]]
sensor_type = "light"
name = "Streaming Lux"
dimensions = 1
frequency_hz = 500.0
"#;

    /// End-to-end: config -> streaming mock platform -> dispatcher -> summaries
    #[tokio::test]
    async fn test_e2e_streaming_session() {
        let config = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        let provider = Arc::new(MockSensorProvider::with_config(MockProviderConfig::from(
            &config.mock,
        )));
        let dispatcher =
            SensorDispatcher::new(provider.clone(), DispatcherConfig::from(&config.session));

        // Eager batches exist and are labelled before anything starts
        assert_eq!(
            dispatcher.known_types(),
            vec![
                SensorType::Accelerometer,
                SensorType::Gyroscope,
                SensorType::Light
            ]
        );
        assert_eq!(
            dispatcher
                .batch(SensorType::Gyroscope)
                .source_name()
                .map(|n| n.as_str()),
            Some("Streaming Gyro")
        );

        let outcomes: Vec<StartOutcome> = config
            .session
            .sensors
            .iter()
            .map(|&t| dispatcher.start(t))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                StartOutcome::Registered,
                StartOutcome::Registered,
                StartOutcome::SourceAbsent
            ]
        );
        assert_eq!(dispatcher.start(SensorType::Gyroscope), StartOutcome::Rejected);

        tokio::time::sleep(Duration::from_millis(150)).await;
        let midway = dispatcher.batch(SensorType::Accelerometer).snapshot();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(dispatcher.stop_all(), 2);
        assert_eq!(provider.total_subscriptions(), 0);

        // Nothing arrives once stopped
        let final_len = dispatcher.batch(SensorType::Accelerometer).len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(dispatcher.batch(SensorType::Accelerometer).len(), final_len);

        // Incremental export picks up exactly where the first snapshot ended
        let rest = dispatcher
            .batch(SensorType::Accelerometer)
            .snapshot_since(midway.end());
        assert_eq!(rest.offset, midway.end());
        assert_eq!(midway.data.len() + rest.data.len(), final_len);

        let summaries: Vec<BatchSummary> = dispatcher
            .snapshot_all()
            .iter()
            .map(BatchSummary::from_snapshot)
            .collect();
        let accel = &summaries[0];
        assert_eq!(accel.sensor_type, SensorType::Accelerometer);
        assert!(accel.records > 0);
        assert_eq!(accel.components.len(), 3);

        let gyro = &summaries[1];
        assert_eq!(gyro.records, 0);

        let light = &summaries[2];
        assert!(light.records > 0);
        assert_eq!(light.components.len(), 1);
        assert_eq!(light.source_name.as_deref(), Some("Streaming Lux"));

        let stored_finite = dispatcher.snapshot_all().iter().all(|s| {
            s.data
                .iter()
                .all(|d| d.values().iter().all(|v| v.is_finite()))
        });
        assert!(stored_finite);
    }

    #[tokio::test]
    async fn test_dropping_dispatcher_ends_streaming() {
        let config = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        let provider = Arc::new(MockSensorProvider::with_config(MockProviderConfig::from(
            &config.mock,
        )));

        {
            let dispatcher =
                SensorDispatcher::new(provider.clone(), DispatcherConfig::from(&config.session));
            dispatcher.start_all();
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(provider.total_subscriptions(), 2);
        }

        assert_eq!(provider.total_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_code_forms_share_one_registration() {
        let toml = r#"
[session]
sensors = [{ other = 5 }]
eager_batches = true

[[mock.sensors]]
sensor_type = 5
name = "Lux"
dimensions = 1
"#;
        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.session.sensors, vec![SensorType::Light]);

        let provider = Arc::new(MockSensorProvider::with_config(MockProviderConfig::from(
            &config.mock,
        )));
        let dispatcher =
            SensorDispatcher::new(provider.clone(), DispatcherConfig::from(&config.session));

        assert_eq!(
            dispatcher.start(config.session.sensors[0]),
            StartOutcome::Registered
        );
        assert_eq!(
            dispatcher.start(SensorType::Light),
            StartOutcome::AlreadyRegistered
        );
        assert_eq!(dispatcher.known_types(), vec![SensorType::Light]);
        assert_eq!(provider.subscription_count(SensorType::Light), 1);

        assert_eq!(dispatcher.stop_all(), 1);
    }

    #[tokio::test]
    async fn test_stop_does_not_wait_for_next_slow_reading() {
        let toml = r#"
[[mock.sensors]]
sensor_type = "pressure"
name = "Slow Baro"
dimensions = 1
frequency_hz = 0.25
"#;
        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let provider = Arc::new(MockSensorProvider::with_config(MockProviderConfig::from(
            &config.mock,
        )));
        let dispatcher =
            SensorDispatcher::new(provider.clone(), DispatcherConfig::from(&config.session));

        assert_eq!(dispatcher.start(SensorType::Pressure), StartOutcome::Registered);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        assert!(dispatcher.stop(SensorType::Pressure));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(provider.total_subscriptions(), 0);
        assert!(dispatcher.batch(SensorType::Pressure).len() <= 1);
    }
}
