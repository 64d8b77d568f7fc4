//! Form of the home page.

use common::editor::site::{SiteField, SiteForm, SiteImage, SiteList};
use common::editor::{FieldId, ImageTarget, ListTarget};
use yew::html::Scope;
use yew::prelude::*;

use super::state::EditorComponent;
use super::widgets::{add_button, image_slot, list_controls, rich_field, text_field};

fn f(field: SiteField) -> FieldId {
    FieldId::Site(field)
}

pub fn view(form: &SiteForm, component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let intro = form
        .platform_intro
        .iter()
        .enumerate()
        .map(|(i, item)| {
            html! {
                <div class="block">
                    { list_controls(ListTarget::Site(SiteList::PlatformIntro), i, form.platform_intro.len(), link) }
                    { text_field("Title", f(SiteField::IntroTitle(i)), &item.title, link) }
                    { text_field("Description", f(SiteField::IntroDesc(i)), &item.desc, link) }
                    { text_field("Icon", f(SiteField::IntroIcon(i)), &item.icon, link) }
                </div>
            }
        })
        .collect::<Html>();

    let services = form
        .services
        .iter()
        .enumerate()
        .map(|(i, item)| {
            html! {
                <div class="block">
                    { list_controls(ListTarget::Site(SiteList::Services), i, form.services.len(), link) }
                    { text_field("Title", f(SiteField::ServiceTitle(i)), &item.title, link) }
                    { text_field("Description", f(SiteField::ServiceDesc(i)), &item.desc, link) }
                    { image_slot("Image", ImageTarget::Site(SiteImage::ServiceImage(i)), item.image.as_slice(), false, component, link) }
                    { text_field("Link", f(SiteField::ServiceHref(i)), &item.href, link) }
                </div>
            }
        })
        .collect::<Html>();

    html! {
        <div class="dataset-form">
            <section>
                <h2>{"Hero"}</h2>
                { text_field("Title", f(SiteField::HeroTitle), &form.hero_title, link) }
                { rich_field("Subtitle", f(SiteField::HeroSubtitle), &form.hero_subtitle, 3, link) }
                { image_slot("Hero image", ImageTarget::Site(SiteImage::HeroImage), form.hero_image.as_slice(), false, component, link) }
            </section>
            <section>
                <h2>{"Platform introduction"}</h2>
                { intro }
                { add_button(ListTarget::Site(SiteList::PlatformIntro), "Add item", link) }
            </section>
            <section>
                <h2>{"Story"}</h2>
                { text_field("Heading", f(SiteField::StoryHeading), &form.story_heading, link) }
                { rich_field("Body", f(SiteField::StoryBody), &form.story_body, 6, link) }
                { image_slot("Images", ImageTarget::Site(SiteImage::StoryImages), &form.story_images, true, component, link) }
            </section>
            <section>
                <h2>{"Services"}</h2>
                { text_field("Section title", f(SiteField::ServicesTitle), &form.services_title, link) }
                { services }
                { add_button(ListTarget::Site(SiteList::Services), "Add service", link) }
            </section>
            <section>
                <h2>{"Video"}</h2>
                { text_field("Title", f(SiteField::VideoTitle), &form.video_title, link) }
                { text_field("URL", f(SiteField::VideoUrl), &form.video_url, link) }
            </section>
        </div>
    }
}
