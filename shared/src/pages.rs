use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Dashboard views offered by the sidebar selector.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum Page {
    #[default]
    #[strum(to_string = "Home")]
    Home,
    #[strum(to_string = "About")]
    About,
    #[strum(to_string = "Disease Identification")]
    DiseaseIdentification,
}

impl Page {
    /// Local storage key remembering the last selected view.
    pub const STORAGE_KEY: &'static str = "octlens.page";

    pub fn heading(self) -> &'static str {
        match self {
            Page::Home => "OCT Retinal Analysis Platform",
            Page::About => "About the Project",
            Page::DiseaseIdentification => "Retinal OCT Disease Identification",
        }
    }

    /// Only the identification view renders the upload widget and may
    /// request a prediction.
    pub fn runs_inference(self) -> bool {
        matches!(self, Page::DiseaseIdentification)
    }
}
