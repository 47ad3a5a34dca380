/// Pure projection of a snapshot into markup
use chrono::NaiveDate;

use super::selectors::{project_photos, resolve_rover_metadata};
use super::state::ApplicationState;
use crate::domain::{Apod, DisplayImage, RoverMeta};
use crate::utils::{escape_html, parse_day};

pub const LOADING_PLACEHOLDER: &str = r#"<p class="loading">Loading Data...</p>"#;

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub markup: String,
    pub bindings: Vec<Binding>,
    pub needs: Vec<DataNeed>,
}

/// A handler the mount point attaches to the element with id `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub target: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectRover(String),
}

/// Data the snapshot lacks or holds in a stale form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataNeed {
    RoverPhotos(String),
    Apod { day: NaiveDate },
}

/// Render a full frame.
///
/// Never performs I/O. Besides the markup it reports the element bindings the
/// mount point should attach and the data the snapshot is missing; the runtime
/// turns those needs into fetches.
pub fn render(state: &ApplicationState, today: NaiveDate) -> Frame {
    let (tabs, bindings) = tab_strip(&state.rovers, &state.selected_rover);
    let (body, rover_need) = dashboard_body(state);
    let (apod, apod_need) = image_of_the_day(state.apod.as_ref(), today);

    let markup = format!(
        r#"
<header></header>
<main>
{greeting}
<section>
{tabs}
{body}
</section>
<section class="apod">
{apod}
</section>
</main>
<footer></footer>
"#,
        greeting = greeting(&state.user.name),
    );

    Frame {
        markup,
        bindings,
        needs: rover_need.into_iter().chain(apod_need).collect(),
    }
}

pub fn greeting(name: &str) -> String {
    let banner = r#"<h1 class="title">Mars Dashboard</h1>
<p class="desc">Click on any of the rovers to view recent pictures.</p>"#;

    if name.is_empty() {
        return banner.to_string();
    }

    format!(
        r#"<h1 class="welcome">Welcome, <span class="name">{}</span></h1>
{}"#,
        escape_html(name),
        banner
    )
}

pub fn tab_id(rover: &str) -> String {
    format!("tab-{}", rover)
}

/// Find the action bound to `input`, given either an element id or a rover
/// name (case-insensitive).
pub fn resolve_binding(bindings: &[Binding], input: &str) -> Option<Action> {
    let input = input.trim();
    let tab = tab_id(input);
    bindings
        .iter()
        .find(|binding| binding.target == input || binding.target.eq_ignore_ascii_case(&tab))
        .map(|binding| binding.action.clone())
}

/// One button per rover; the exact match for `selected` is generated active.
pub fn tab_strip(rovers: &[String], selected: &str) -> (String, Vec<Binding>) {
    if rovers.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut buttons = String::new();
    let mut bindings = Vec::with_capacity(rovers.len());

    for rover in rovers {
        let id = tab_id(rover);
        let active = if rover == selected {
            r#" class="tabLink active" autofocus"#
        } else {
            r#" class="tabLink""#
        };
        buttons.push_str(&format!(
            r#"<button id="{}"{}>{}</button>"#,
            escape_html(&id),
            active,
            escape_html(rover)
        ));
        bindings.push(Binding {
            target: id,
            action: Action::SelectRover(rover.clone()),
        });
    }

    (format!(r#"<div class="tabs">{}</div>"#, buttons), bindings)
}

/// Rover details and photos, or the loading placeholder.
///
/// Requests the selected rover's photos when the loaded records do not
/// belong to it and no rover fetch is in flight.
pub fn dashboard_body(state: &ApplicationState) -> (String, Option<DataNeed>) {
    let meta = resolve_rover_metadata(state);
    let images = project_photos(state);

    let stale = meta.map_or(true, |m| m.name != state.selected_rover);
    let need = (stale && !state.loading)
        .then(|| DataNeed::RoverPhotos(state.selected_rover.clone()));

    let markup = match meta {
        Some(meta) if !images.is_empty() => rover_details(meta, &images),
        _ => LOADING_PLACEHOLDER.to_string(),
    };

    (markup, need)
}

fn rover_details(meta: &RoverMeta, images: &[DisplayImage]) -> String {
    let field = |value: &Option<String>| escape_html(value.as_deref().unwrap_or("unknown"));

    format!(
        r#"<section class="rover-info">
<h2>Details for {name} rover camera</h2>
<ul class="rover-meta">
<li><span class="bold">Name: </span>{name}</li>
<li><span class="bold">Launch date: </span>{launch}</li>
<li><span class="bold">Landing date: </span>{landing}</li>
<li><span class="bold">Status: </span>{status}</li>
</ul>
{list}
</section>"#,
        name = escape_html(&meta.name),
        launch = field(&meta.launch_date),
        landing = field(&meta.landing_date),
        status = field(&meta.status),
        list = image_list(images),
    )
}

pub fn image_list(images: &[DisplayImage]) -> String {
    let items: String = images
        .iter()
        .map(|image| format!(r#"<li class="image-list">{}</li>"#, photo_item(image)))
        .collect();
    format!("<ol>{}</ol>", items)
}

pub fn photo_item(image: &DisplayImage) -> String {
    format!(
        r#"<img src="{}">
<p class="date"><span class="bold">Date: </span>{}</p>"#,
        escape_html(&image.src),
        escape_html(&image.date)
    )
}

/// Today's picture or video, requesting a refresh when absent or not from `today`.
pub fn image_of_the_day(apod: Option<&Apod>, today: NaiveDate) -> (String, Option<DataNeed>) {
    let day = apod.and_then(|a| a.date.as_deref()).and_then(parse_day);
    let need = (day != Some(today)).then_some(DataNeed::Apod { day: today });

    let text = |value: Option<&String>| escape_html(value.map(String::as_str).unwrap_or(""));

    let markup = match apod {
        None => LOADING_PLACEHOLDER.to_string(),
        Some(apod) if apod.is_video() => format!(
            r#"<p>See today's featured video <a href="{}">here</a></p>
<p>{}</p>
<p>{}</p>"#,
            text(apod.url.as_ref()),
            text(apod.title.as_ref()),
            text(apod.explanation.as_ref()),
        ),
        Some(apod) => {
            let image = apod.image.as_ref();
            format!(
                r#"<img src="{}" height="350px" width="100%" />
<p>{}</p>"#,
                text(image.and_then(|i| i.url.as_ref())),
                text(image.and_then(|i| i.explanation.as_ref())),
            )
        }
    };

    (markup, need)
}
