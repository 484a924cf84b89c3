#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppChange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default)]
pub struct AppFocusTracker {
    current_app: String,
}

impl AppFocusTracker {
    pub fn new(current_app: impl Into<String>) -> Self {
        Self {
            current_app: current_app.into(),
        }
    }

    pub fn observe(&mut self, device_on: bool, foreground_app: Option<&str>) -> Option<AppChange> {
        if !device_on {
            return None;
        }

        let app = foreground_app.map(str::trim).filter(|app| !app.is_empty())?;
        if app == self.current_app {
            return None;
        }

        let from = std::mem::replace(&mut self.current_app, app.to_string());
        Some(AppChange {
            from,
            to: app.to_string(),
        })
    }

    pub fn current_app(&self) -> &str {
        &self.current_app
    }
}
