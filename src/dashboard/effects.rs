/// Effect phase: turns data needs into cancellable fetch tasks
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use super::render::DataNeed;
use super::runtime::Msg;
use crate::clients::ProxyClient;

/// Identifies a task so a later one for the same data is told apart from it.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Apod(NaiveDate),
    Rover(String),
}

impl From<&DataNeed> for RequestKey {
    fn from(need: &DataNeed) -> Self {
        match need {
            DataNeed::Apod { day } => RequestKey::Apod(*day),
            DataNeed::RoverPhotos(rover) => RequestKey::Rover(rover.clone()),
        }
    }
}

struct InFlight {
    ticket: Ticket,
    handle: JoinHandle<()>,
}

pub struct Effects {
    client: ProxyClient,
    tx: UnboundedSender<Msg>,
    in_flight: HashMap<RequestKey, InFlight>,
    /// Keys that completed and must not be re-requested on their own.
    settled: HashSet<RequestKey>,
    next_ticket: Ticket,
}

impl Effects {
    pub fn new(client: ProxyClient, tx: UnboundedSender<Msg>) -> Self {
        Self {
            client,
            tx,
            in_flight: HashMap::new(),
            settled: HashSet::new(),
            next_ticket: 0,
        }
    }

    /// Start a fetch for `need` unless one is running or already settled.
    ///
    /// Must be called within a Tokio runtime.
    pub fn dispatch(&mut self, need: DataNeed) -> Option<RequestKey> {
        let key = RequestKey::from(&need);
        if self.in_flight.contains_key(&key) || self.settled.contains(&key) {
            return None;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let client = self.client.clone();
        let tx = self.tx.clone();

        let handle = match need {
            DataNeed::Apod { day } => {
                debug!("Fetching APOD for {}", day);
                tokio::spawn(async move {
                    let msg = match client.fetch_apod().await {
                        Ok(apod) => Msg::ApodLoaded { ticket, day, apod },
                        Err(e) => Msg::FetchFailed {
                            ticket,
                            key: RequestKey::Apod(day),
                            reason: e.to_string(),
                        },
                    };
                    let _ = tx.send(msg);
                })
            }
            DataNeed::RoverPhotos(rover) => {
                debug!("Fetching photos for rover {}", rover);
                tokio::spawn(async move {
                    let msg = match client.fetch_rover_photos(&rover).await {
                        Ok(photos) => Msg::RoverPhotosLoaded {
                            ticket,
                            rover,
                            photos,
                        },
                        Err(e) => Msg::FetchFailed {
                            ticket,
                            key: RequestKey::Rover(rover),
                            reason: e.to_string(),
                        },
                    };
                    let _ = tx.send(msg);
                })
            }
        };

        self.in_flight
            .insert(key.clone(), InFlight { ticket, handle });
        Some(key)
    }

    /// Retire the task behind `ticket`.
    ///
    /// Returns `false` when the ticket no longer owns `key`, meaning the
    /// task was cancelled and its result must be discarded.
    pub fn complete(&mut self, key: &RequestKey, ticket: Ticket, settle: bool) -> bool {
        match self.in_flight.get(key) {
            Some(running) if running.ticket == ticket => {
                self.in_flight.remove(key);
                if settle {
                    // only the newest APOD day is worth remembering
                    if let RequestKey::Apod(_) = key {
                        self.settled
                            .retain(|settled| !matches!(settled, RequestKey::Apod(_)));
                    }
                    self.settled.insert(key.clone());
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn is_settled(&self, key: &RequestKey) -> bool {
        self.settled.contains(key)
    }

    /// Abort rover fetches for anything but `keep` and forget settled rover keys.
    pub fn cancel_rovers_except(&mut self, keep: &str) -> usize {
        let stale: Vec<RequestKey> = self
            .in_flight
            .keys()
            .filter(|key| matches!(key, RequestKey::Rover(rover) if rover != keep))
            .cloned()
            .collect();

        for key in &stale {
            if let Some(running) = self.in_flight.remove(key) {
                running.handle.abort();
                debug!("Cancelled fetch {:?}", key);
            }
        }

        self.settled
            .retain(|key| !matches!(key, RequestKey::Rover(_)));
        stale.len()
    }

    pub fn abort_all(&mut self) {
        for (_, running) in self.in_flight.drain() {
            running.handle.abort();
        }
    }
}
