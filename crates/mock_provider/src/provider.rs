//! Mock 传感器平台
//!
//! 基于配置的 mock 源列表实现 `SensorProvider`。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{
    ListenerId, MockConfigSection, MockSensorSpec, ProviderError, SamplingRate, SensorListener,
    SensorProvider, SensorReading, SensorSource, SensorType,
};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::source::MockSource;

/// Mock 平台配置
#[derive(Debug, Clone, Default)]
pub struct MockProviderConfig {
    /// 平台暴露的传感器，按枚举顺序
    pub sensors: Vec<MockSensorSpec>,
    /// 拒绝订阅的类型
    pub refuse: Vec<SensorType>,
    /// 每个订阅由后台线程流式发送读数
    pub streaming: bool,
}

impl From<&MockConfigSection> for MockProviderConfig {
    fn from(section: &MockConfigSection) -> Self {
        Self {
            sensors: section.sensors.clone(),
            refuse: section.refuse.clone(),
            streaming: true,
        }
    }
}

/// 流式线程在两次读数之间等待的停止信号
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// 等待 `timeout` 或直到被停止，已停止时返回 true
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut stopped = self.stopped.lock();
        while !*stopped {
            match deadline {
                Some(deadline) => {
                    if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
                None => self.wake.wait(&mut stopped),
            }
        }
        *stopped
    }
}

struct Subscription {
    listener: SensorListener,
    source: Arc<MockSource>,
    stop: Arc<StopSignal>,
    worker: Option<JoinHandle<()>>,
}

/// 进程内传感器平台
///
/// 未开启流式时，读数只通过 [`MockSensorProvider::emit`] 在调用方线程上发送。
/// 开启流式后，每个订阅另有一个后台线程按订阅速率发送模拟读数。
pub struct MockSensorProvider {
    sources: Vec<Arc<MockSource>>,
    refuse: Vec<SensorType>,
    streaming: bool,
    subscriptions: Mutex<HashMap<ListenerId, Subscription>>,
    /// 每个类型曾订阅过的所有监听器
    history: Mutex<HashMap<SensorType, HashSet<ListenerId>>>,
    subscribe_calls: AtomicU64,
    epoch: Instant,
}

impl MockSensorProvider {
    /// 创建只在 `emit` 时发送的平台
    pub fn new(sensors: Vec<MockSensorSpec>) -> Self {
        Self::with_config(MockProviderConfig {
            sensors,
            ..Default::default()
        })
    }

    pub fn with_config(config: MockProviderConfig) -> Self {
        Self {
            sources: config
                .sensors
                .iter()
                .map(|spec| Arc::new(MockSource::new(spec)))
                .collect(),
            refuse: config.refuse,
            streaming: config.streaming,
            subscriptions: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            subscribe_calls: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    /// 向订阅了 `sensor_type` 的每个监听器发送一条读数。
    ///
    /// 回调在调用方线程上执行。每次回调返回后数值缓冲区立即被 NaN 覆盖，
    /// 模拟平台复用事件对象的行为。返回发送次数。
    pub fn emit(&self, sensor_type: SensorType, values: &[f32]) -> usize {
        let targets: Vec<(SensorListener, Arc<MockSource>)> = self
            .subscriptions
            .lock()
            .values()
            .filter(|s| s.source.sensor_type() == sensor_type)
            .map(|s| (s.listener.clone(), s.source.clone()))
            .collect();

        let mut buffer = vec![0.0f32; values.len()];
        for (listener, source) in &targets {
            buffer.copy_from_slice(values);
            listener.deliver(&SensorReading {
                source: source.name(),
                values: &buffer,
                timestamp_ns: self.timestamp_ns(),
            });
            buffer.fill(f32::NAN);
        }

        trace!(sensor_type = %sensor_type, deliveries = targets.len(), "emitted reading");
        targets.len()
    }

    /// `sensor_type` 当前的订阅数
    pub fn subscription_count(&self, sensor_type: SensorType) -> usize {
        self.subscriptions
            .lock()
            .values()
            .filter(|s| s.source.sensor_type() == sensor_type)
            .count()
    }

    /// 所有类型当前的订阅总数
    pub fn total_subscriptions(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// 曾订阅 `sensor_type` 的不同监听器个数
    pub fn distinct_listeners(&self, sensor_type: SensorType) -> usize {
        self.history
            .lock()
            .get(&sensor_type)
            .map_or(0, HashSet::len)
    }

    /// `subscribe` 调用总次数，包括被拒绝的
    pub fn subscribe_calls(&self) -> u64 {
        self.subscribe_calls.load(Ordering::Relaxed)
    }

    fn timestamp_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn find_source(&self, source: &dyn SensorSource) -> Option<Arc<MockSource>> {
        self.sources
            .iter()
            .find(|s| s.sensor_type() == source.sensor_type() && s.name() == source.name())
            .cloned()
    }

    fn spawn_worker(
        &self,
        listener: SensorListener,
        source: Arc<MockSource>,
        rate: SamplingRate,
        stop: Arc<StopSignal>,
    ) -> JoinHandle<()> {
        let interval = source.interval(rate);
        let epoch = self.epoch;

        thread::spawn(move || {
            let mut frame_id: u64 = 0;
            let mut buffer = vec![0.0f32; source.dimensions()];

            debug!(
                source = %source.name(),
                listener = %listener.id(),
                interval_us = interval.as_micros() as u64,
                "mock stream started"
            );

            while !stop.is_stopped() {
                frame_id += 1;
                source.generate(frame_id, &mut buffer);
                listener.deliver(&SensorReading {
                    source: source.name(),
                    values: &buffer,
                    timestamp_ns: epoch.elapsed().as_nanos() as u64,
                });
                if stop.wait(interval) {
                    break;
                }
            }

            debug!(source = %source.name(), frames = frame_id, "mock stream stopped");
        })
    }

    fn shutdown(&self, mut subscription: Subscription) {
        subscription.stop.stop();
        if let Some(worker) = subscription.worker.take() {
            // A listener unsubscribing itself from its own stream cannot wait for it
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!(listener = %subscription.listener.id(), "mock stream thread panicked");
            }
        }
    }
}

impl SensorProvider for MockSensorProvider {
    fn enumerate(&self) -> Vec<Arc<dyn SensorSource>> {
        self.sources
            .iter()
            .map(|s| s.clone() as Arc<dyn SensorSource>)
            .collect()
    }

    fn default_source(&self, sensor_type: SensorType) -> Option<Arc<dyn SensorSource>> {
        self.sources
            .iter()
            .find(|s| s.sensor_type() == sensor_type)
            .map(|s| s.clone() as Arc<dyn SensorSource>)
    }

    fn subscribe(
        &self,
        source: &dyn SensorSource,
        listener: &SensorListener,
        rate: SamplingRate,
    ) -> Result<(), ProviderError> {
        self.subscribe_calls.fetch_add(1, Ordering::Relaxed);

        if self.refuse.contains(&source.sensor_type()) {
            return Err(ProviderError::subscription_refused(
                source.sensor_type(),
                source.name().as_str(),
                "refused by mock configuration",
            ));
        }

        let Some(mock_source) = self.find_source(source) else {
            return Err(ProviderError::subscription_refused(
                source.sensor_type(),
                source.name().as_str(),
                "unknown source",
            ));
        };

        let mut subscriptions = self.subscriptions.lock();
        if subscriptions.contains_key(&listener.id()) {
            return Err(ProviderError::AlreadySubscribed {
                listener: listener.id(),
            });
        }

        let stop = Arc::new(StopSignal::default());
        let worker = self.streaming.then(|| {
            self.spawn_worker(
                listener.clone(),
                mock_source.clone(),
                rate,
                stop.clone(),
            )
        });

        subscriptions.insert(
            listener.id(),
            Subscription {
                listener: listener.clone(),
                source: mock_source,
                stop,
                worker,
            },
        );
        drop(subscriptions);

        self.history
            .lock()
            .entry(source.sensor_type())
            .or_default()
            .insert(listener.id());

        debug!(
            sensor_type = %source.sensor_type(),
            listener = %listener.id(),
            rate = ?rate,
            "mock subscription added"
        );
        Ok(())
    }

    fn unsubscribe(&self, listener: ListenerId) {
        let removed = self.subscriptions.lock().remove(&listener);
        if let Some(subscription) = removed {
            debug!(listener = %listener, "mock subscription removed");
            self.shutdown(subscription);
        }
    }
}

impl Drop for MockSensorProvider {
    fn drop(&mut self) {
        let remaining: Vec<Subscription> = self
            .subscriptions
            .lock()
            .drain()
            .map(|(_, s)| s)
            .collect();
        for subscription in remaining {
            self.shutdown(subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn suite() -> Vec<MockSensorSpec> {
        vec![
            MockSensorSpec::new(SensorType::Light, "light", 1),
            MockSensorSpec::new(SensorType::Gyroscope, "gyro", 3),
        ]
    }

    fn counting_listener(sensor_type: SensorType) -> (SensorListener, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let listener = SensorListener::new(
            sensor_type,
            Arc::new(move |_| {
                count_clone.fetch_add(1, Ordering::Relaxed);
            }),
        );
        (listener, count)
    }

    #[test]
    fn test_enumerate_and_default_source() {
        let provider = MockSensorProvider::new(suite());
        assert_eq!(provider.enumerate().len(), 2);
        assert_eq!(
            provider
                .default_source(SensorType::Gyroscope)
                .unwrap()
                .name()
                .as_str(),
            "gyro"
        );
        assert!(provider.default_source(SensorType::Pressure).is_none());
    }

    #[test]
    fn test_emit_reaches_only_matching_subscribers() {
        let provider = MockSensorProvider::new(suite());
        let light = provider.default_source(SensorType::Light).unwrap();
        let (listener, count) = counting_listener(SensorType::Light);

        provider
            .subscribe(light.as_ref(), &listener, SamplingRate::Normal)
            .unwrap();

        assert_eq!(provider.emit(SensorType::Light, &[1.0]), 1);
        assert_eq!(provider.emit(SensorType::Gyroscope, &[1.0, 2.0, 3.0]), 0);
        assert_eq!(count.load(Ordering::Relaxed), 1);

        provider.unsubscribe(listener.id());
        assert_eq!(provider.emit(SensorType::Light, &[1.0]), 0);
        assert_eq!(provider.total_subscriptions(), 0);
    }

    #[test]
    fn test_double_subscribe_is_rejected() {
        let provider = MockSensorProvider::new(suite());
        let light = provider.default_source(SensorType::Light).unwrap();
        let (listener, _) = counting_listener(SensorType::Light);

        provider
            .subscribe(light.as_ref(), &listener, SamplingRate::Normal)
            .unwrap();
        let err = provider
            .subscribe(light.as_ref(), &listener, SamplingRate::Normal)
            .unwrap_err();

        assert!(matches!(err, ProviderError::AlreadySubscribed { .. }));
        assert_eq!(provider.subscription_count(SensorType::Light), 1);
        assert_eq!(provider.subscribe_calls(), 2);
    }

    #[test]
    fn test_refused_type() {
        let provider = MockSensorProvider::with_config(MockProviderConfig {
            sensors: suite(),
            refuse: vec![SensorType::Gyroscope],
            streaming: false,
        });
        let gyro = provider.default_source(SensorType::Gyroscope).unwrap();
        let (listener, _) = counting_listener(SensorType::Gyroscope);

        let err = provider
            .subscribe(gyro.as_ref(), &listener, SamplingRate::Game)
            .unwrap_err();
        assert!(err.to_string().contains("refused"));
        assert_eq!(provider.total_subscriptions(), 0);
    }

    #[test]
    fn test_emit_delivers_values_and_source_name() {
        let provider = MockSensorProvider::new(suite());
        let gyro = provider.default_source(SensorType::Gyroscope).unwrap();

        let seen: Arc<Mutex<Vec<f32>>> = Arc::default();
        let seen_clone = seen.clone();
        let listener = SensorListener::new(
            SensorType::Gyroscope,
            Arc::new(move |reading| {
                assert_eq!(reading.source, "gyro");
                seen_clone.lock().extend_from_slice(reading.values);
            }),
        );
        provider
            .subscribe(gyro.as_ref(), &listener, SamplingRate::Normal)
            .unwrap();

        provider.emit(SensorType::Gyroscope, &[0.1, 0.2, 0.3]);
        assert_eq!(*seen.lock(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_streaming_delivers_until_unsubscribed() {
        let provider = MockSensorProvider::with_config(MockProviderConfig {
            sensors: vec![MockSensorSpec {
                frequency_hz: Some(500.0),
                ..MockSensorSpec::new(SensorType::Light, "light", 1)
            }],
            refuse: Vec::new(),
            streaming: true,
        });
        let light = provider.default_source(SensorType::Light).unwrap();
        let (listener, count) = counting_listener(SensorType::Light);

        provider
            .subscribe(light.as_ref(), &listener, SamplingRate::Fastest)
            .unwrap();
        thread::sleep(Duration::from_millis(50));
        provider.unsubscribe(listener.id());

        let delivered = count.load(Ordering::Relaxed);
        assert!(delivered > 0);

        // The worker is joined on unsubscribe, nothing arrives afterwards
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::Relaxed), delivered);
    }

    #[test]
    fn test_unsubscribe_interrupts_slow_stream() {
        let provider = MockSensorProvider::with_config(MockProviderConfig {
            sensors: vec![MockSensorSpec {
                frequency_hz: Some(0.25),
                ..MockSensorSpec::new(SensorType::Light, "light", 1)
            }],
            refuse: Vec::new(),
            streaming: true,
        });
        let light = provider.default_source(SensorType::Light).unwrap();
        let (listener, count) = counting_listener(SensorType::Light);

        provider
            .subscribe(light.as_ref(), &listener, SamplingRate::Normal)
            .unwrap();
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        provider.unsubscribe(listener.id());
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(count.load(Ordering::Relaxed) <= 1);
    }

    #[test]
    fn test_stop_signal_wait() {
        let signal = StopSignal::default();
        assert!(!signal.wait(Duration::from_millis(1)));

        signal.stop();
        let started = Instant::now();
        assert!(signal.wait(Duration::from_secs(60)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
