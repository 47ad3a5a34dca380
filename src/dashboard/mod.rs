/// Mars dashboard client: state store, render pipeline, selectors and fetchers
pub mod effects;
pub mod render;
pub mod runtime;
pub mod selectors;
pub mod state;
pub mod store;

pub use effects::{Effects, RequestKey, Ticket};
pub use render::{render, resolve_binding, Action, Binding, DataNeed, Frame};
pub use runtime::{Dashboard, DashboardHandle, Msg};
pub use state::{ApplicationState, StateUpdate, User};
pub use store::{Mount, Store};
