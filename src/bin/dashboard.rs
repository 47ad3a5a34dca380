/// Dashboard client entry point.
///
/// Renders into an HTML file on every state change and reads tab "clicks"
/// from stdin: either a rover name or a tab element id, one per line.
use mars_dashboard::clients::ProxyClient;
use mars_dashboard::config::DashboardConfig;
use mars_dashboard::dashboard::{
    resolve_binding, ApplicationState, Binding, Dashboard, DashboardHandle, Frame, Mount,
};
use mars_dashboard::utils;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

type SharedBindings = Arc<Mutex<Vec<Binding>>>;

/// Writes each frame into a standalone page and publishes its bindings
struct FileMount {
    path: String,
    bindings: SharedBindings,
}

impl FileMount {
    fn page(frame: &Frame) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Mars Dashboard</title>
</head>
<body>
<div id="root">{}</div>
</body>
</html>
"#,
            frame.markup
        )
    }
}

impl Mount for FileMount {
    fn mount(&mut self, frame: &Frame) {
        if let Err(e) = std::fs::write(&self.path, Self::page(frame)) {
            error!("Failed to write {}: {}", self.path, e);
        }
        if let Ok(mut bindings) = self.bindings.lock() {
            *bindings = frame.bindings.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mars_dashboard::init_logging();

    let config = DashboardConfig::from_env()?;
    let client = ProxyClient::new(config.proxy_url.clone(), config.http_timeout)?;
    info!(
        "Rendering to {} via proxy {}",
        config.output_path,
        client.base_url()
    );

    let bindings: SharedBindings = Arc::new(Mutex::new(Vec::new()));
    let mount = FileMount {
        path: config.output_path.clone(),
        bindings: Arc::clone(&bindings),
    };

    let (dashboard, handle) = Dashboard::new(
        ApplicationState::initial(config.user_name.clone()),
        client,
        mount,
        utils::today,
    );
    let ui = tokio::spawn(dashboard.run());

    read_selections(&handle, &bindings).await?;
    handle.shutdown();
    ui.await?;

    Ok(())
}

/// Route stdin lines through the currently attached bindings
async fn read_selections(
    handle: &DashboardHandle,
    bindings: &SharedBindings,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") {
            break;
        }

        let action = bindings
            .lock()
            .ok()
            .and_then(|bindings| resolve_binding(&bindings, input));

        match action {
            Some(action) => {
                if !handle.dispatch(&action) {
                    break;
                }
            }
            None => warn!("No tab bound for {:?}", input),
        }
    }

    Ok(())
}
