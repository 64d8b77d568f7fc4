//! Form projection of the `siteContent` document (home page only).

use serde_json::{Map, Value};

use super::list::{self, ListOp};
use super::optional;
use crate::model::{ImageRef, IndexPage, IntroItem, ServiceItem, SiteContent, Story, Video};
use crate::richtext::{html_to_plain, plain_to_html};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteForm {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_image: Option<ImageRef>,
    pub platform_intro: Vec<IntroItemForm>,
    pub story_heading: String,
    pub story_body: String,
    pub story_images: Vec<ImageRef>,
    pub services_title: String,
    pub services: Vec<ServiceItemForm>,
    pub video_title: String,
    pub video_url: String,
    page_extra: Map<String, Value>,
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntroItemForm {
    pub title: String,
    pub desc: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceItemForm {
    pub title: String,
    pub desc: String,
    pub image: Option<ImageRef>,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteField {
    HeroTitle,
    HeroSubtitle,
    StoryHeading,
    StoryBody,
    ServicesTitle,
    VideoTitle,
    VideoUrl,
    IntroTitle(usize),
    IntroDesc(usize),
    IntroIcon(usize),
    ServiceTitle(usize),
    ServiceDesc(usize),
    ServiceHref(usize),
}

impl SiteField {
    pub fn is_rich(self) -> bool {
        matches!(self, SiteField::HeroSubtitle | SiteField::StoryBody)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteList {
    PlatformIntro,
    Services,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteImage {
    HeroImage,
    StoryImages,
    ServiceImage(usize),
}

impl SiteForm {
    pub fn render(doc: &SiteContent) -> Self {
        let page = &doc.index;
        Self {
            hero_title: page.hero_title.clone(),
            hero_subtitle: html_to_plain(&page.hero_subtitle),
            hero_image: page.hero_image.clone(),
            platform_intro: page
                .platform_intro
                .iter()
                .map(|item| IntroItemForm {
                    title: item.title.clone(),
                    desc: item.desc.clone(),
                    icon: item.icon.clone().unwrap_or_default(),
                })
                .collect(),
            story_heading: page.story.heading.clone(),
            story_body: html_to_plain(&page.story.body),
            story_images: page.story.images.clone(),
            services_title: page.services_title.clone(),
            services: page
                .services
                .iter()
                .map(|item| ServiceItemForm {
                    title: item.title.clone(),
                    desc: item.desc.clone(),
                    image: item.image.clone(),
                    href: item.href.clone().unwrap_or_default(),
                })
                .collect(),
            video_title: page.video.title.clone(),
            video_url: page.video.url.clone(),
            page_extra: page.extra.clone(),
            extra: doc.extra.clone(),
        }
    }

    pub fn collect(&self) -> SiteContent {
        SiteContent {
            index: IndexPage {
                hero_title: self.hero_title.clone(),
                hero_subtitle: plain_to_html(&self.hero_subtitle),
                hero_image: self.hero_image.clone().filter(|image| !image.is_blank()),
                platform_intro: self
                    .platform_intro
                    .iter()
                    .map(|item| IntroItem {
                        title: item.title.clone(),
                        desc: item.desc.clone(),
                        icon: optional(&item.icon),
                    })
                    .collect(),
                story: Story {
                    heading: self.story_heading.clone(),
                    body: plain_to_html(&self.story_body),
                    images: self.story_images.iter().filter(|image| !image.is_blank()).cloned().collect(),
                },
                services_title: self.services_title.clone(),
                services: self
                    .services
                    .iter()
                    .map(|item| ServiceItem {
                        title: item.title.clone(),
                        desc: item.desc.clone(),
                        image: item.image.clone().filter(|image| !image.is_blank()),
                        href: optional(&item.href),
                    })
                    .collect(),
                video: Video {
                    title: self.video_title.clone(),
                    url: self.video_url.trim().to_string(),
                },
                extra: self.page_extra.clone(),
            },
            extra: self.extra.clone(),
        }
    }

    pub fn field_mut(&mut self, field: SiteField) -> Option<&mut String> {
        use SiteField::*;
        Some(match field {
            HeroTitle => &mut self.hero_title,
            HeroSubtitle => &mut self.hero_subtitle,
            StoryHeading => &mut self.story_heading,
            StoryBody => &mut self.story_body,
            ServicesTitle => &mut self.services_title,
            VideoTitle => &mut self.video_title,
            VideoUrl => &mut self.video_url,
            IntroTitle(i) => &mut self.platform_intro.get_mut(i)?.title,
            IntroDesc(i) => &mut self.platform_intro.get_mut(i)?.desc,
            IntroIcon(i) => &mut self.platform_intro.get_mut(i)?.icon,
            ServiceTitle(i) => &mut self.services.get_mut(i)?.title,
            ServiceDesc(i) => &mut self.services.get_mut(i)?.desc,
            ServiceHref(i) => &mut self.services.get_mut(i)?.href,
        })
    }

    pub fn apply(&mut self, target: SiteList, op: ListOp) -> bool {
        match target {
            SiteList::PlatformIntro => list::apply(&mut self.platform_intro, op),
            SiteList::Services => list::apply(&mut self.services, op),
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.hero_image
            .iter()
            .chain(self.story_images.iter())
            .chain(self.services.iter().filter_map(|item| item.image.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::list::Direction;
    use crate::model::Dataset;
    use serde_json::json;

    fn sample() -> SiteContent {
        SiteContent::from_value(json!({
            "index": {
                "heroTitle": "Find help near you",
                "heroSubtitle": "Free &amp; confidential<br>Call us any time",
                "heroImage": "/img/hero.jpg",
                "platformIntro": [{"title": "Search", "desc": "Find services", "icon": "search"}],
                "story": {"heading": "Our story", "body": "Started in 2015", "images": ["/img/s1.jpg", "gas://image/u9/s2.png"]},
                "servicesTitle": "Services",
                "services": [
                    {"title": "Counselling", "desc": "Talk to someone", "image": "/img/c.jpg", "href": "/counselling"},
                    {"title": "Housing", "desc": "Find shelter"}
                ],
                "video": {"title": "Intro", "url": "https://video.example/intro"},
                "footerNote": "kept"
            },
            "otherPage": {"kept": true}
        }))
        .unwrap()
    }

    #[test]
    fn round_trip_keeps_unknown_pages() {
        let doc = sample();
        let form = SiteForm::render(&doc);
        assert_eq!(form.hero_subtitle, "Free & confidential\nCall us any time");
        assert_eq!(form.collect(), doc);
    }

    #[test]
    fn images_walk_every_slot() {
        let form = SiteForm::render(&sample());
        let images: Vec<String> = form.images().map(ToString::to_string).collect();
        assert_eq!(images, vec!["/img/hero.jpg", "/img/s1.jpg", "gas://image/u9/s2.png", "/img/c.jpg"]);
    }

    #[test]
    fn services_reorder() {
        let mut form = SiteForm::render(&sample());
        assert!(form.apply(SiteList::Services, ListOp::Move(1, Direction::Up)));
        let doc = form.collect();
        assert_eq!(doc.index.services[0].title, "Housing");
        assert_eq!(doc.index.services[1].image, Some(ImageRef::parse("/img/c.jpg")));
    }
}
