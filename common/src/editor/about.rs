//! Form projection of the `aboutContent` document.

use serde_json::{Map, Value};

use super::list::{self, ListOp};
use super::{join_lines, optional, split_lines};
use crate::model::{AboutContent, Achievement, ImageRef, ModelItem, Social, TeamMember};
use crate::richtext::{html_to_plain, plain_to_html};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AboutForm {
    pub hero_title: String,
    pub lead: String,
    pub model_title: String,
    pub model: Vec<ModelItemForm>,
    pub achievements_title: String,
    pub achievements: Vec<AchievementForm>,
    pub team: Vec<TeamMemberForm>,
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelItemForm {
    pub title: String,
    pub desc: String,
    pub href: String,
    pub link_text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AchievementForm {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamMemberForm {
    pub name: String,
    pub photo: Option<ImageRef>,
    /// One role per line.
    pub roles: String,
    pub motto: String,
    pub education: String,
    pub experience: String,
    pub socials: Vec<SocialForm>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SocialForm {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AboutField {
    HeroTitle,
    Lead,
    ModelTitle,
    AchievementsTitle,
    ModelItemTitle(usize),
    ModelItemDesc(usize),
    ModelItemHref(usize),
    ModelItemLinkText(usize),
    AchievementText(usize),
    AchievementHref(usize),
    MemberName(usize),
    MemberRoles(usize),
    MemberMotto(usize),
    MemberEducation(usize),
    MemberExperience(usize),
    SocialName(usize, usize),
    SocialHref(usize, usize),
}

impl AboutField {
    pub fn is_rich(self) -> bool {
        matches!(self, AboutField::Lead | AboutField::AchievementText(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AboutList {
    Model,
    Achievements,
    Team,
    /// Social links of one team member.
    Socials(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AboutImage {
    MemberPhoto(usize),
}

impl AboutForm {
    pub fn render(doc: &AboutContent) -> Self {
        Self {
            hero_title: doc.hero_title.clone(),
            lead: html_to_plain(&doc.lead),
            model_title: doc.model_title.clone(),
            model: doc
                .model
                .iter()
                .map(|item| ModelItemForm {
                    title: item.title.clone(),
                    desc: item.desc.clone(),
                    href: item.href.clone().unwrap_or_default(),
                    link_text: item.link_text.clone().unwrap_or_default(),
                })
                .collect(),
            achievements_title: doc.achievements_title.clone(),
            achievements: doc
                .achievements
                .iter()
                .map(|achievement| AchievementForm {
                    text: html_to_plain(achievement.text()),
                    href: achievement.href().unwrap_or_default().to_string(),
                })
                .collect(),
            team: doc.team.iter().map(TeamMemberForm::render).collect(),
            extra: doc.extra.clone(),
        }
    }

    pub fn collect(&self) -> AboutContent {
        AboutContent {
            hero_title: self.hero_title.clone(),
            lead: plain_to_html(&self.lead),
            model_title: self.model_title.clone(),
            model: self
                .model
                .iter()
                .map(|item| ModelItem {
                    title: item.title.clone(),
                    desc: item.desc.clone(),
                    href: optional(&item.href),
                    link_text: optional(&item.link_text),
                })
                .collect(),
            achievements_title: self.achievements_title.clone(),
            achievements: self
                .achievements
                .iter()
                .map(|achievement| Achievement::new(plain_to_html(&achievement.text), optional(&achievement.href)))
                .collect(),
            team: self.team.iter().map(TeamMemberForm::collect).collect(),
            extra: self.extra.clone(),
        }
    }

    pub fn field_mut(&mut self, field: AboutField) -> Option<&mut String> {
        use AboutField::*;
        Some(match field {
            HeroTitle => &mut self.hero_title,
            Lead => &mut self.lead,
            ModelTitle => &mut self.model_title,
            AchievementsTitle => &mut self.achievements_title,
            ModelItemTitle(i) => &mut self.model.get_mut(i)?.title,
            ModelItemDesc(i) => &mut self.model.get_mut(i)?.desc,
            ModelItemHref(i) => &mut self.model.get_mut(i)?.href,
            ModelItemLinkText(i) => &mut self.model.get_mut(i)?.link_text,
            AchievementText(i) => &mut self.achievements.get_mut(i)?.text,
            AchievementHref(i) => &mut self.achievements.get_mut(i)?.href,
            MemberName(i) => &mut self.team.get_mut(i)?.name,
            MemberRoles(i) => &mut self.team.get_mut(i)?.roles,
            MemberMotto(i) => &mut self.team.get_mut(i)?.motto,
            MemberEducation(i) => &mut self.team.get_mut(i)?.education,
            MemberExperience(i) => &mut self.team.get_mut(i)?.experience,
            SocialName(m, s) => &mut self.team.get_mut(m)?.socials.get_mut(s)?.name,
            SocialHref(m, s) => &mut self.team.get_mut(m)?.socials.get_mut(s)?.href,
        })
    }

    pub fn apply(&mut self, target: AboutList, op: ListOp) -> bool {
        match target {
            AboutList::Model => list::apply(&mut self.model, op),
            AboutList::Achievements => list::apply(&mut self.achievements, op),
            AboutList::Team => list::apply(&mut self.team, op),
            AboutList::Socials(member) => self
                .team
                .get_mut(member)
                .is_some_and(|member| list::apply(&mut member.socials, op)),
        }
    }

    pub fn photo_mut(&mut self, image: AboutImage) -> Option<&mut Option<ImageRef>> {
        match image {
            AboutImage::MemberPhoto(i) => Some(&mut self.team.get_mut(i)?.photo),
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.team.iter().filter_map(|member| member.photo.as_ref())
    }
}

impl TeamMemberForm {
    fn render(member: &TeamMember) -> Self {
        Self {
            name: member.name.clone(),
            photo: member.photo.clone(),
            roles: join_lines(&member.roles),
            motto: member.motto.clone(),
            education: join_lines(&member.education),
            experience: join_lines(&member.experience),
            socials: member
                .socials
                .iter()
                .map(|social| SocialForm {
                    name: social.name.clone(),
                    href: social.href.clone(),
                })
                .collect(),
        }
    }

    fn collect(&self) -> TeamMember {
        TeamMember {
            name: self.name.clone(),
            photo: self.photo.clone().filter(|photo| !photo.is_blank()),
            roles: split_lines(&self.roles),
            motto: self.motto.clone(),
            education: split_lines(&self.education),
            experience: split_lines(&self.experience),
            socials: self
                .socials
                .iter()
                .map(|social| Social {
                    name: social.name.clone(),
                    href: social.href.clone(),
                })
                .collect(),
        }
    }
}
