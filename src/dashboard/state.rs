/// The single application snapshot and its update vocabulary
use crate::domain::{Apod, PhotoRecord};

pub const DEFAULT_ROVERS: [&str; 3] = ["Curiosity", "Opportunity", "Spirit"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub name: String,
}

/// One immutable snapshot of everything the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationState {
    pub user: User,
    /// `None` is the empty placeholder used before the first APOD arrives.
    pub apod: Option<Apod>,
    pub rovers: Vec<String>,
    /// Always a member of `rovers`.
    pub selected_rover: String,
    /// Raw photo records as returned by the proxy, never filtered by rover.
    pub rover_info: Vec<PhotoRecord>,
    /// A rover fetch for `selected_rover` is in flight.
    pub loading: bool,
}

impl ApplicationState {
    pub fn initial(user_name: impl Into<String>) -> Self {
        let rovers: Vec<String> = DEFAULT_ROVERS.iter().map(|r| r.to_string()).collect();
        Self {
            user: User {
                name: user_name.into(),
            },
            apod: None,
            selected_rover: rovers[0].clone(),
            rovers,
            rover_info: Vec::new(),
            loading: false,
        }
    }

    /// Copy-on-write: a new snapshot with exactly one top-level key replaced.
    pub fn with(&self, update: StateUpdate) -> Self {
        let mut next = self.clone();
        match update {
            StateUpdate::User(user) => next.user = user,
            StateUpdate::Apod(apod) => next.apod = apod,
            StateUpdate::Rovers(rovers) => next.rovers = rovers,
            StateUpdate::SelectedRover(name) => next.selected_rover = name,
            StateUpdate::RoverInfo(records) => next.rover_info = records,
            StateUpdate::Loading(loading) => next.loading = loading,
        }
        next
    }

    pub fn has_rover(&self, name: &str) -> bool {
        self.rovers.iter().any(|r| r == name)
    }
}

/// A top-level key paired with its replacement value.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    User(User),
    Apod(Option<Apod>),
    Rovers(Vec<String>),
    SelectedRover(String),
    RoverInfo(Vec<PhotoRecord>),
    Loading(bool),
}
