use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::image_ref::{self, ImageRef};

/// The `siteContent` dataset. Only the `index` page is edited here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteContent {
    pub index: IndexPage,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexPage {
    pub hero_title: String,
    /// Rich text.
    pub hero_subtitle: String,
    #[serde(with = "image_ref::optional")]
    pub hero_image: Option<ImageRef>,
    pub platform_intro: Vec<IntroItem>,
    pub story: Story,
    pub services_title: String,
    pub services: Vec<ServiceItem>,
    pub video: Video,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroItem {
    pub title: String,
    pub desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Story {
    pub heading: String,
    /// Rich text.
    pub body: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceItem {
    pub title: String,
    pub desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub title: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_index_page() {
        let value = json!({
            "index": {
                "heroTitle": "Welcome",
                "heroImage": "gas://image/h1/hero.png",
                "story": {"heading": "Our story", "body": "Once", "images": []},
                "services": [{"title": "Tutoring", "desc": "After school"}],
                "video": {"title": "Intro", "url": "https://youtu.be/x"}
            },
            "about": {"kept": true}
        });
        let site: SiteContent = serde_json::from_value(value).unwrap();
        assert_eq!(site.index.hero_image, Some(ImageRef::pending("h1", "hero.png")));
        assert_eq!(site.index.services[0].image, None);
        assert_eq!(site.extra["about"], json!({"kept": true}));
    }
}
