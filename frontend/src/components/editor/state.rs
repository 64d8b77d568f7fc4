//! Runtime state of the content editor.
//!
//! The editable documents live in [`AppState`] from `common`; this struct adds
//! what only the browser needs: which dataset is shown, busy flags, the
//! dirty-tracking baseline and the link dialog inputs.

use std::collections::HashMap;

use common::editor::AppState;
use common::model::DatasetKey;
use yew::prelude::*;

/// A network action in flight. Its completion message clears it whatever the
/// outcome, which re-enables the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    Saving,
    SavingAndPublishing,
    Publishing,
}

impl Busy {
    pub fn label(self) -> &'static str {
        match self {
            Busy::Saving => "Saving...",
            Busy::SavingAndPublishing => "Saving and publishing...",
            Busy::Publishing => "Publishing...",
        }
    }
}

pub struct EditorComponent {
    pub app: AppState,

    /// Dataset shown in the editor.
    pub dataset: DatasetKey,

    /// Dataset whose load is in flight.
    pub loading: Option<DatasetKey>,
    pub busy: Option<Busy>,

    /// Uploads still running.
    pub uploading: usize,

    /// Bumped for every load; a `Loaded` message from an older load is dropped.
    pub load_generation: u64,

    pub load_error: Option<String>,

    /// MD5 of each dataset as last loaded or saved.
    pub original_md5: HashMap<DatasetKey, String>,

    /// Outcome of the last save or publish, shown under the toolbar.
    pub status: Option<String>,

    pub new_provider_id: String,
    pub new_provider_name: String,

    pub link_dialog_ref: NodeRef,
    pub link_url: String,
    pub link_label: String,
}

impl EditorComponent {
    pub fn new() -> Self {
        Self {
            app: AppState::new(),
            dataset: DatasetKey::AboutContent,
            loading: None,
            busy: None,
            uploading: 0,
            load_generation: 0,
            load_error: None,
            original_md5: HashMap::new(),
            status: None,
            new_provider_id: String::new(),
            new_provider_name: String::new(),
            link_dialog_ref: NodeRef::default(),
            link_url: String::new(),
            link_label: String::new(),
        }
    }

    /// Save and publish buttons are disabled while this is true.
    pub fn is_blocked(&self) -> bool {
        self.loading.is_some() || self.busy.is_some() || self.uploading > 0
    }
}
