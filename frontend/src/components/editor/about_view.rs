//! Form of the About page.

use common::editor::about::{AboutField, AboutForm, AboutImage, AboutList, TeamMemberForm};
use common::editor::{FieldId, ImageTarget, ListTarget};
use yew::html::Scope;
use yew::prelude::*;

use super::state::EditorComponent;
use super::widgets::{add_button, image_slot, lines_field, list_controls, rich_field, text_field};

fn f(field: AboutField) -> FieldId {
    FieldId::About(field)
}

fn l(list: AboutList) -> ListTarget {
    ListTarget::About(list)
}

pub fn view(form: &AboutForm, component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let model = form
        .model
        .iter()
        .enumerate()
        .map(|(i, item)| {
            html! {
                <div class="block">
                    { list_controls(l(AboutList::Model), i, form.model.len(), link) }
                    { text_field("Title", f(AboutField::ModelItemTitle(i)), &item.title, link) }
                    { text_field("Description", f(AboutField::ModelItemDesc(i)), &item.desc, link) }
                    { text_field("Link", f(AboutField::ModelItemHref(i)), &item.href, link) }
                    { text_field("Link text", f(AboutField::ModelItemLinkText(i)), &item.link_text, link) }
                </div>
            }
        })
        .collect::<Html>();

    let achievements = form
        .achievements
        .iter()
        .enumerate()
        .map(|(i, item)| {
            html! {
                <div class="block compact">
                    { list_controls(l(AboutList::Achievements), i, form.achievements.len(), link) }
                    { rich_field("Text", f(AboutField::AchievementText(i)), &item.text, 2, link) }
                    { text_field("Link (optional)", f(AboutField::AchievementHref(i)), &item.href, link) }
                </div>
            }
        })
        .collect::<Html>();

    let team = form
        .team
        .iter()
        .enumerate()
        .map(|(i, member)| team_member(i, member, form.team.len(), component, link))
        .collect::<Html>();

    html! {
        <div class="dataset-form">
            <section>
                <h2>{"Header"}</h2>
                { text_field("Title", f(AboutField::HeroTitle), &form.hero_title, link) }
                { rich_field("Lead", f(AboutField::Lead), &form.lead, 4, link) }
            </section>
            <section>
                <h2>{"Model"}</h2>
                { text_field("Section title", f(AboutField::ModelTitle), &form.model_title, link) }
                { model }
                { add_button(l(AboutList::Model), "Add step", link) }
            </section>
            <section>
                <h2>{"Achievements"}</h2>
                { text_field("Section title", f(AboutField::AchievementsTitle), &form.achievements_title, link) }
                { achievements }
                { add_button(l(AboutList::Achievements), "Add achievement", link) }
            </section>
            <section>
                <h2>{"Team"}</h2>
                { team }
                { add_button(l(AboutList::Team), "Add member", link) }
            </section>
        </div>
    }
}

fn team_member(
    i: usize,
    member: &TeamMemberForm,
    len: usize,
    component: &EditorComponent,
    link: &Scope<EditorComponent>,
) -> Html {
    let socials = member
        .socials
        .iter()
        .enumerate()
        .map(|(s, social)| {
            html! {
                <div class="block inline">
                    { text_field("Name", f(AboutField::SocialName(i, s)), &social.name, link) }
                    { text_field("URL", f(AboutField::SocialHref(i, s)), &social.href, link) }
                    { list_controls(l(AboutList::Socials(i)), s, member.socials.len(), link) }
                </div>
            }
        })
        .collect::<Html>();

    html! {
        <div class="block">
            { list_controls(l(AboutList::Team), i, len, link) }
            { text_field("Name", f(AboutField::MemberName(i)), &member.name, link) }
            { image_slot("Photo", ImageTarget::About(AboutImage::MemberPhoto(i)), member.photo.as_slice(), false, component, link) }
            { lines_field("Roles", f(AboutField::MemberRoles(i)), &member.roles, link) }
            { text_field("Motto", f(AboutField::MemberMotto(i)), &member.motto, link) }
            { lines_field("Education", f(AboutField::MemberEducation(i)), &member.education, link) }
            { lines_field("Experience", f(AboutField::MemberExperience(i)), &member.experience, link) }
            <div class="sub-list">
                <span class="field-label">{"Social links"}</span>
                { socials }
                { add_button(l(AboutList::Socials(i)), "Add link", link) }
            </div>
        </div>
    }
}
