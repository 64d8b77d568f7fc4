use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::image_ref::{self, ImageRef};

/// The `aboutContent` dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutContent {
    pub hero_title: String,
    /// Rich text.
    pub lead: String,
    pub model_title: String,
    pub model: Vec<ModelItem>,
    pub achievements_title: String,
    pub achievements: Vec<Achievement>,
    pub team: Vec<TeamMember>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelItem {
    pub title: String,
    pub desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
}

/// An achievement line. Stored either as a bare string or as `{text, href}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AchievementRepr", into = "AchievementRepr")]
pub enum Achievement {
    Text { text: String },
    Link { text: String, href: String },
}

impl Achievement {
    pub fn text(&self) -> &str {
        match self {
            Achievement::Text { text } | Achievement::Link { text, .. } => text,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Achievement::Text { .. } => None,
            Achievement::Link { href, .. } => Some(href),
        }
    }

    /// Builds the variant matching the legacy storage rule: a blank `href`
    /// collapses to the bare-string form.
    pub fn new(text: impl Into<String>, href: Option<String>) -> Self {
        let text = text.into();
        match href.filter(|href| !href.trim().is_empty()) {
            Some(href) => Achievement::Link { text, href },
            None => Achievement::Text { text },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AchievementRepr {
    Bare(String),
    Object {
        #[serde(default)]
        text: String,
        #[serde(default)]
        href: String,
    },
}

impl From<AchievementRepr> for Achievement {
    fn from(repr: AchievementRepr) -> Self {
        match repr {
            AchievementRepr::Bare(text) => Achievement::Text { text },
            AchievementRepr::Object { text, href } => Achievement::new(text, Some(href)),
        }
    }
}

impl From<Achievement> for AchievementRepr {
    fn from(achievement: Achievement) -> Self {
        match achievement {
            Achievement::Text { text } => AchievementRepr::Bare(text),
            Achievement::Link { text, href } => AchievementRepr::Object { text, href },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    #[serde(with = "image_ref::optional")]
    pub photo: Option<ImageRef>,
    pub roles: Vec<String>,
    pub motto: String,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub socials: Vec<Social>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Social {
    pub name: String,
    pub href: String,
}
