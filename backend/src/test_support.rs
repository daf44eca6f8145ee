//! Shared test doubles for unit tests in `src/`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{SnapshotCache, SnapshotCacheError};
use crate::domain::{CachedSnapshot, Environment, ExportSnapshot, Job, Project};

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Cache double holding entries in a mutex-guarded map.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<Environment, CachedSnapshot>>,
}

impl RecordingCache {
    pub fn entry(&self, environment: Environment) -> Option<CachedSnapshot> {
        match self.entries.lock() {
            Ok(entries) => entries.get(&environment).cloned(),
            Err(_) => panic!("cache mutex"),
        }
    }
}

#[async_trait]
impl SnapshotCache for RecordingCache {
    async fn get(&self, environment: Environment) -> Result<Option<CachedSnapshot>, SnapshotCacheError> {
        Ok(self.entry(environment))
    }

    async fn put(&self, environment: Environment, entry: CachedSnapshot) -> Result<(), SnapshotCacheError> {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(environment, entry);
                Ok(())
            }
            Err(_) => panic!("cache mutex"),
        }
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single() {
        Some(time) => time,
        None => panic!("valid fixture time"),
    }
}

/// Small snapshot with two projects and three jobs.
pub fn sample_snapshot() -> ExportSnapshot {
    let project = |id: &str, name: &str, agency: &str, author: &str, updated_at: &str| Project {
        id: id.to_owned(),
        name: name.to_owned(),
        agency_id: format!("{agency}-id"),
        agency_name: agency.to_owned(),
        author_id: format!("{author}-id"),
        author_name: author.to_owned(),
        created_at: "2025-01-01T00:00:00Z".to_owned(),
        updated_at: updated_at.to_owned(),
    };
    let job = |id: &str, project_id: &str, map_id: Option<&str>| {
        let mut job = Job {
            id: id.to_owned(),
            map_id: map_id.map(str::to_owned),
            status: "completed".to_owned(),
            ..Job::default()
        };
        job.request_payload.project_id = project_id.to_owned();
        job
    };
    ExportSnapshot {
        exported_at: "2025-06-01T10:00:00Z".to_owned(),
        total_jobs: 3,
        total_unique_projects: 2,
        jobs: vec![
            job("j1", "p1", Some("m1")),
            job("j2", "p1", None),
            job("j3", "p2", Some("m2")),
        ],
        unique_projects: vec![
            project("p1", "Ferry links", "Zeta Transit", "Rui", "2025-03-01T09:00:00Z"),
            project("p2", "Bus corridor", "Alpha Buses", "Ana", "2025-04-01T09:00:00Z"),
        ],
    }
}
