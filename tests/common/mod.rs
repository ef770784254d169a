#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use apiprobe::middleware::{RequestTiming, TimingRecorder};
use apiprobe::{Clock, IdSource, Request, Response, Service};
use chrono::{DateTime, TimeZone, Utc};

/// Wall clock that moves forward one second per reading.
pub struct TickingClock {
    ticks: Mutex<i64>,
}

impl TickingClock {
    pub fn starting_at(secs: i64) -> Self {
        Self { ticks: Mutex::new(secs) }
    }
}

impl Clock for TickingClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let mut ticks = self.ticks.lock().unwrap();
        *ticks += 1;
        Utc.timestamp_opt(*ticks, 0).unwrap()
    }

    fn monotonic(&self) -> Duration {
        Duration::from_secs(*self.ticks.lock().unwrap() as u64)
    }
}

/// Always hands out the same id.
pub struct FixedIds(pub u32);

impl IdSource for FixedIds {
    fn next_id(&self, _upper: u32) -> u32 {
        self.0
    }
}

/// Keeps every timing record.
#[derive(Clone, Default)]
pub struct Recorded(pub Arc<Mutex<Vec<RequestTiming>>>);

impl Recorded {
    pub fn take(&self) -> Vec<RequestTiming> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl TimingRecorder for Recorded {
    fn record(&self, timing: RequestTiming) {
        self.0.lock().unwrap().push(timing);
    }
}

pub async fn get(svc: &Service, path: &str) -> Response {
    svc.call(Request::new(http::Method::GET, path)).await
}

pub fn json(res: &Response) -> serde_json::Value {
    serde_json::from_slice(res.body()).expect("response body is JSON")
}
