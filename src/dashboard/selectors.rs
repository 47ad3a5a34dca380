/// Read-only projections over a snapshot
use super::state::ApplicationState;
use crate::domain::{DisplayImage, RoverMeta};

/// Reshape every raw photo record into a display record, preserving order.
pub fn project_photos(state: &ApplicationState) -> Vec<DisplayImage> {
    state
        .rover_info
        .iter()
        .map(|record| DisplayImage {
            src: record.img_src.clone(),
            date: record.earth_date.clone(),
        })
        .collect()
}

/// Metadata of the first record belonging to the selected rover.
pub fn resolve_rover_metadata(state: &ApplicationState) -> Option<&RoverMeta> {
    state
        .rover_info
        .iter()
        .find(|record| record.rover.name == state.selected_rover)
        .map(|record| &record.rover)
}
