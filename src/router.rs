// src/router.rs
//! In-memory view switch: which view is active and which CV it is addressing

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Home,
    Upload,
    Auth,
    Dashboard,
    CvDetail,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Home => "home",
            View::Upload => "upload",
            View::Auth => "auth",
            View::Dashboard => "dashboard",
            View::CvDetail => "cv-detail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavState {
    pub view: View,
    pub selected_id: Option<String>,
}

impl NavState {
    /// The view that actually renders; a detail view without an id shows Home
    pub fn resolved_view(&self) -> View {
        match (self.view, &self.selected_id) {
            (View::CvDetail, None) => View::Home,
            (view, _) => view,
        }
    }

    /// The CV addressed by the detail view, if that is what renders
    pub fn cv_id(&self) -> Option<&str> {
        match self.resolved_view() {
            View::CvDetail => self.selected_id.as_deref(),
            _ => None,
        }
    }
}

/// Every navigation replaces both the view and the selected id
pub fn navigate(view: View, id: Option<&str>) -> NavState {
    NavState {
        view,
        selected_id: id.filter(|s| !s.is_empty()).map(str::to_string),
    }
}
