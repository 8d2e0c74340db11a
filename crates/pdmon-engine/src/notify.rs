//! Severity notification service.
//!
//! Models a GATT service with three single-byte read/notify characteristics.
//! Observers subscribe and receive one [`Notification`] per characteristic
//! for every update.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use log::{debug, info};
use pdmon_core::{SeverityLevels, SeveritySink};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SEVERITY_SERVICE_UUID: Uuid = Uuid::from_u128(0x12345678_90ab_cdef_0123_456789abcdef);
pub const TREMOR_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x12345678_90ab_cdef_0123_456700000001);
pub const DYSKINESIA_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x12345678_90ab_cdef_0123_456700000002);
pub const FREEZE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x12345678_90ab_cdef_0123_456700000003);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicProperties {
    pub read: bool,
    pub notify: bool,
}

/// One single-byte characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Characteristic {
    pub uuid: Uuid,
    pub name: &'static str,
    pub properties: CharacteristicProperties,
    value: u8,
}

impl Characteristic {
    fn new(uuid: Uuid, name: &'static str) -> Self {
        Self {
            uuid,
            name,
            properties: CharacteristicProperties {
                read: true,
                notify: true,
            },
            value: 0,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

/// Value change pushed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub characteristic: Uuid,
    pub value: u8,
}

#[derive(Debug)]
pub struct SeverityService {
    uuid: Uuid,
    characteristics: [Characteristic; 3],
    subscribers: Vec<Sender<Notification>>,
    updates: u64,
}

impl Default for SeverityService {
    fn default() -> Self {
        Self::new()
    }
}

impl SeverityService {
    pub fn new() -> Self {
        Self {
            uuid: SEVERITY_SERVICE_UUID,
            characteristics: [
                Characteristic::new(TREMOR_CHARACTERISTIC_UUID, "tremor"),
                Characteristic::new(DYSKINESIA_CHARACTERISTIC_UUID, "dyskinesia"),
                Characteristic::new(FREEZE_CHARACTERISTIC_UUID, "freeze"),
            ],
            subscribers: Vec::new(),
            updates: 0,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn characteristics(&self) -> &[Characteristic] {
        &self.characteristics
    }

    pub fn read(&self, characteristic: Uuid) -> Option<u8> {
        self.characteristics
            .iter()
            .find(|c| c.uuid == characteristic)
            .map(Characteristic::value)
    }

    /// Current values of all three characteristics.
    pub fn levels(&self) -> SeverityLevels {
        SeverityLevels::new(
            self.characteristics[0].value,
            self.characteristics[1].value,
            self.characteristics[2].value,
        )
    }

    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Writes all three characteristics and notifies every subscriber.
    /// Subscribers whose receiver was dropped are forgotten.
    pub fn update_levels(&mut self, levels: SeverityLevels) {
        for (characteristic, value) in self.characteristics.iter_mut().zip(levels.as_bytes()) {
            characteristic.value = value;
        }
        self.updates += 1;

        let notifications: Vec<Notification> = self
            .characteristics
            .iter()
            .filter(|c| c.properties.notify)
            .map(|c| Notification {
                characteristic: c.uuid,
                value: c.value,
            })
            .collect();

        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| {
            notifications
                .iter()
                .all(|notification| subscriber.send(*notification).is_ok())
        });
        if self.subscribers.len() != before {
            debug!(
                "dropped {} disconnected subscriber(s)",
                before - self.subscribers.len()
            );
        }
    }
}

impl SeveritySink for SeverityService {
    fn publish(&mut self, levels: SeverityLevels) {
        self.update_levels(levels);
    }
}

/// Keeps every published update; clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<SeverityLevels>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<SeverityLevels> {
        match self.published.lock() {
            Ok(published) => published.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SeveritySink for RecordingSink {
    fn publish(&mut self, levels: SeverityLevels) {
        match self.published.lock() {
            Ok(mut published) => published.push(levels),
            Err(poisoned) => poisoned.into_inner().push(levels),
        }
    }
}

/// Writes every update to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SeveritySink for LogSink {
    fn publish(&mut self, levels: SeverityLevels) {
        info!(
            "severity update: tremor={} dysk={} fog={}",
            levels.tremor, levels.dyskinesia, levels.freeze
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_share_the_service_prefix() {
        assert_eq!(
            SEVERITY_SERVICE_UUID.to_string(),
            "12345678-90ab-cdef-0123-456789abcdef"
        );
        assert_eq!(
            FREEZE_CHARACTERISTIC_UUID.to_string(),
            "12345678-90ab-cdef-0123-456700000003"
        );
    }

    #[test]
    fn update_writes_and_notifies_each_characteristic() {
        let mut service = SeverityService::new();
        let rx = service.subscribe();

        service.update_levels(SeverityLevels::new(64, 12, 0));

        assert_eq!(service.read(TREMOR_CHARACTERISTIC_UUID), Some(64));
        assert_eq!(service.read(DYSKINESIA_CHARACTERISTIC_UUID), Some(12));
        assert_eq!(service.read(FREEZE_CHARACTERISTIC_UUID), Some(0));
        assert_eq!(service.read(SEVERITY_SERVICE_UUID), None);

        let received: Vec<Notification> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                Notification {
                    characteristic: TREMOR_CHARACTERISTIC_UUID,
                    value: 64
                },
                Notification {
                    characteristic: DYSKINESIA_CHARACTERISTIC_UUID,
                    value: 12
                },
                Notification {
                    characteristic: FREEZE_CHARACTERISTIC_UUID,
                    value: 0
                },
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut service = SeverityService::new();
        let keep = service.subscribe();
        drop(service.subscribe());

        service.publish(SeverityLevels::new(1, 2, 80));
        assert_eq!(service.subscriber_count(), 1);
        assert_eq!(keep.try_iter().count(), 3);
        assert_eq!(service.levels(), SeverityLevels::new(1, 2, 80));
        assert_eq!(service.update_count(), 1);
    }

    #[test]
    fn recording_sink_clones_share_history() {
        let sink = RecordingSink::new();
        let mut writer = sink.clone();
        writer.publish(SeverityLevels::new(5, 6, 7));
        assert_eq!(sink.published(), vec![SeverityLevels::new(5, 6, 7)]);
    }
}
