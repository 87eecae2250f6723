//! Fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ShowcaseError, ShowcaseResult};
use crate::item::Item;
use crate::source::Source;

/// Parse "YYYY-MM-DD" or "YYYY-MM-DDTHH:MM:SS" as UTC.
pub fn at(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return dt.and_utc();
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub at: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

pub fn note(id: &str, title: &str, date: Option<&str>) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        body: String::new(),
        at: date.map(at),
        end: None,
    }
}

pub fn spanning(id: &str, title: &str, start: &str, end: &str) -> Note {
    Note {
        end: Some(at(end)),
        ..note(id, title, Some(start))
    }
}

impl Item for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.at
    }

    fn end_timestamp(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.body.as_str()]
    }
}

/// A source that replays queued responses and counts calls.
pub struct FakeSource<T = Note> {
    responses: Mutex<VecDeque<Result<Vec<T>, String>>>,
    calls: AtomicUsize,
}

impl<T> FakeSource<T> {
    pub fn new() -> Self {
        FakeSource {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_items(items: Vec<T>) -> Self {
        let source = Self::new();
        source.push_ok(items);
        source
    }

    pub fn push_ok(&self, items: Vec<T>) {
        self.responses.lock().unwrap().push_back(Ok(items));
    }

    pub fn push_err(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Item> Source for FakeSource<T> {
    type Item = T;

    fn name(&self) -> &str {
        "fake source"
    }

    async fn fetch(&self) -> ShowcaseResult<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(items)) => Ok(items),
            Some(Err(message)) => Err(ShowcaseError::Http(message)),
            None => Err(ShowcaseError::Http("no queued response".to_string())),
        }
    }
}
