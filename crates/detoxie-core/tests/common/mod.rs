//! Shared fixtures for tracker integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Local, TimeZone};
use detoxie_core::{
    Config, ConfigProvider, Event, KvStore, MemoryStore, OverlayKind, OverlayRequest, Presenter,
    PresenterError, StoreError, TrackerFacade,
};

pub const OTHER_APP: &str = "com.whatsapp";

/// Presenter that remembers every call and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub shown: Vec<OverlayRequest>,
    pub hides: usize,
    pub fail_show: bool,
    pub visible: Option<OverlayKind>,
}

impl RecordingPresenter {
    pub fn shown_kinds(&self) -> Vec<OverlayKind> {
        self.shown.iter().map(|r| r.kind).collect()
    }

    pub fn count(&self, kind: OverlayKind) -> usize {
        self.shown.iter().filter(|r| r.kind == kind).count()
    }
}

impl Presenter for RecordingPresenter {
    fn show(&mut self, request: &OverlayRequest) -> Result<(), PresenterError> {
        if self.fail_show {
            return Err(PresenterError::PermissionDenied);
        }
        self.shown.push(request.clone());
        self.visible = Some(request.kind);
        Ok(())
    }

    fn hide(&mut self) -> Result<(), PresenterError> {
        self.hides += 1;
        self.visible = None;
        Ok(())
    }
}

/// Config the test can change while the tracker runs.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(pub Rc<RefCell<Config>>);

impl ConfigProvider for SharedConfig {
    fn config(&self) -> Config {
        self.0.borrow().clone()
    }
}

/// Store whose every call fails.
#[derive(Debug, Default)]
pub struct BrokenStore;

impl KvStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("disk gone".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk gone".into()))
    }
}

/// In-memory store that records the keys of every batch write.
#[derive(Debug, Default)]
pub struct BatchRecordingStore {
    pub inner: MemoryStore,
    pub batches: RefCell<Vec<Vec<String>>>,
}

impl KvStore for BatchRecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.batches
            .borrow_mut()
            .push(entries.iter().map(|(k, _)| k.to_string()).collect());
        self.inner.set_many(entries)
    }
}

pub type TestTracker<'a, C = Config> = TrackerFacade<&'a MemoryStore, RecordingPresenter, C>;

pub fn tracker(store: &MemoryStore) -> TestTracker<'_> {
    tracker_with(store, Config::default())
}

pub fn tracker_with<C: ConfigProvider>(store: &MemoryStore, config: C) -> TestTracker<'_, C> {
    TrackerFacade::new(store, RecordingPresenter::default(), config)
}

/// 2026-10-14 10:00:00 local time.
pub fn base() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 14, 10, 0, 0).unwrap()
}

/// `secs` seconds after [`base`].
pub fn at(secs: i64) -> DateTime<Local> {
    base() + Duration::seconds(secs)
}

pub fn statuses(events: &[Event]) -> Vec<detoxie_core::ContentStatus> {
    events.iter().filter_map(Event::status).collect()
}
