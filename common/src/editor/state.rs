//! Editor state shared by the three dataset panels.

use std::collections::HashSet;

use log::{debug, info};
use serde_json::Value;

use super::about::{AboutField, AboutForm, AboutImage, AboutList};
use super::focus::{byte_to_utf16_idx, utf16_to_byte_idx, FocusContext};
use super::images::{self, PreviewCache, SlotMut, Thumbnail};
use super::list::ListOp;
use super::provider::{ProviderField, ProviderImage, ProviderList, ProvidersEditor};
use super::site::{SiteField, SiteForm, SiteImage, SiteList};
use crate::client::UploadedImage;
use crate::error::{CmsError, Result};
use crate::model::{AboutContent, Dataset, DatasetKey, ImageRef, Providers, SiteContent};
use crate::richtext::{escape_html, plain_to_html};

/// A text input. Provider fields address the open provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    About(AboutField),
    Provider(ProviderField),
    Site(SiteField),
}

impl FieldId {
    pub fn dataset(self) -> DatasetKey {
        match self {
            FieldId::About(_) => DatasetKey::AboutContent,
            FieldId::Provider(_) => DatasetKey::Providers,
            FieldId::Site(_) => DatasetKey::SiteContent,
        }
    }

    pub fn is_rich(self) -> bool {
        match self {
            FieldId::About(field) => field.is_rich(),
            FieldId::Provider(field) => field.is_rich(),
            FieldId::Site(field) => field.is_rich(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListTarget {
    About(AboutList),
    Provider(ProviderList),
    Site(SiteList),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    About(AboutImage),
    Provider(ProviderImage),
    Site(SiteImage),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub about: Option<AboutForm>,
    pub providers: Option<ProvidersEditor>,
    pub site: Option<SiteForm>,
    pub previews: PreviewCache,
    pub focus: FocusContext,
}

fn not_loaded(key: DatasetKey) -> CmsError {
    CmsError::validation(format!("{} is not loaded", key.label()))
}

fn is_linkable(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:") || url.starts_with('/')
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, key: DatasetKey) -> bool {
        match key {
            DatasetKey::AboutContent => self.about.is_some(),
            DatasetKey::Providers => self.providers.is_some(),
            DatasetKey::SiteContent => self.site.is_some(),
        }
    }

    /// Replaces the form of `key` with a fresh rendering of `value`.
    pub fn load(&mut self, key: DatasetKey, value: Value) -> Result<()> {
        match key {
            DatasetKey::AboutContent => self.about = Some(AboutForm::render(&AboutContent::from_value(value)?)),
            DatasetKey::Providers => self.providers = Some(ProvidersEditor::load(Providers::from_value(value)?)),
            DatasetKey::SiteContent => self.site = Some(SiteForm::render(&SiteContent::from_value(value)?)),
        }
        if self.focus.field().is_some_and(|field| field.dataset() == key) {
            self.focus.clear();
        }
        self.prune_previews();
        debug!("loaded {key} into the editor");
        Ok(())
    }

    /// Serializes the current form of `key`.
    pub fn collect(&self, key: DatasetKey) -> Result<Value> {
        match key {
            DatasetKey::AboutContent => self.about.as_ref().ok_or_else(|| not_loaded(key))?.collect().to_value(),
            DatasetKey::Providers => self.providers.as_ref().ok_or_else(|| not_loaded(key))?.collect()?.to_value(),
            DatasetKey::SiteContent => self.site.as_ref().ok_or_else(|| not_loaded(key))?.collect().to_value(),
        }
    }

    fn text_mut(&mut self, field: FieldId) -> Option<&mut String> {
        match field {
            FieldId::About(field) => self.about.as_mut()?.field_mut(field),
            FieldId::Provider(field) => self.providers.as_mut()?.form_mut()?.field_mut(field),
            FieldId::Site(field) => self.site.as_mut()?.field_mut(field),
        }
    }

    /// Returns `false` when the field does not exist (e.g. a stale index).
    pub fn set_field(&mut self, field: FieldId, value: String) -> bool {
        match self.text_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn apply_list(&mut self, target: ListTarget, op: ListOp) -> bool {
        let changed = match target {
            ListTarget::About(list) => self.about.as_mut().is_some_and(|form| form.apply(list, op)),
            ListTarget::Provider(list) => self
                .providers
                .as_mut()
                .and_then(ProvidersEditor::form_mut)
                .is_some_and(|form| form.apply(list, op)),
            ListTarget::Site(list) => self.site.as_mut().is_some_and(|form| form.apply(list, op)),
        };
        if changed && op != ListOp::Add {
            // Indices shifted under the focused field.
            self.focus.clear();
        }
        if changed && matches!(op, ListOp::Remove(_)) {
            self.prune_previews();
        }
        changed
    }

    fn slot(&mut self, target: ImageTarget) -> Option<SlotMut<'_>> {
        match target {
            ImageTarget::About(image) => self.about.as_mut()?.photo_mut(image).map(SlotMut::Single),
            ImageTarget::Provider(image) => self
                .providers
                .as_mut()?
                .form_mut()?
                .images_mut(image)
                .map(SlotMut::List),
            ImageTarget::Site(image) => {
                let form = self.site.as_mut()?;
                Some(match image {
                    SiteImage::HeroImage => SlotMut::Single(&mut form.hero_image),
                    SiteImage::StoryImages => SlotMut::List(&mut form.story_images),
                    SiteImage::ServiceImage(i) => SlotMut::Single(&mut form.services.get_mut(i)?.image),
                })
            }
        }
    }

    pub fn accepts_multiple(&mut self, target: ImageTarget) -> bool {
        self.slot(target).is_some_and(|slot| slot.accepts_multiple())
    }

    /// Inserts uploaded placeholders into a slot and caches their previews.
    pub fn attach_images(&mut self, target: ImageTarget, uploads: Vec<UploadedImage>) -> usize {
        let mut previews = std::mem::take(&mut self.previews);
        let attached = self
            .slot(target)
            .map_or(0, |slot| slot.attach(uploads, &mut previews));
        self.previews = previews;
        if attached > 0 {
            info!("attached {attached} image(s) to {target:?}");
            // A single slot may have replaced an earlier upload.
            self.prune_previews();
        }
        attached
    }

    pub fn remove_image(&mut self, target: ImageTarget, index: usize) -> Option<ImageRef> {
        let removed = self.slot(target)?.remove(index);
        if removed.is_some() {
            self.prune_previews();
        }
        removed
    }

    pub fn set_image_url(&mut self, target: ImageTarget, url: &str) -> bool {
        let Some(slot) = self.slot(target) else {
            return false;
        };
        slot.set_url(url);
        self.prune_previews();
        true
    }

    pub fn select_provider(&mut self, id: &str) -> Result<()> {
        let editor = self.providers.as_mut().ok_or_else(|| not_loaded(DatasetKey::Providers))?;
        editor.select(id)?;
        if matches!(self.focus.field(), Some(FieldId::Provider(_))) {
            self.focus.clear();
        }
        Ok(())
    }

    pub fn create_provider(&mut self, id: &str, name: &str) -> Result<()> {
        let editor = self.providers.as_mut().ok_or_else(|| not_loaded(DatasetKey::Providers))?;
        editor.create(id, name)?;
        if matches!(self.focus.field(), Some(FieldId::Provider(_))) {
            self.focus.clear();
        }
        Ok(())
    }

    /// Returns whether a provider was removed.
    pub fn delete_provider(&mut self, id: &str, confirmed: bool) -> Result<bool> {
        let editor = self.providers.as_mut().ok_or_else(|| not_loaded(DatasetKey::Providers))?;
        let removed = editor.delete(id, confirmed)?.is_some();
        if removed {
            info!("deleted provider {id}");
            if matches!(self.focus.field(), Some(FieldId::Provider(_))) {
                self.focus.clear();
            }
            self.prune_previews();
        }
        Ok(removed)
    }

    /// Every image referenced by a loaded form.
    pub fn images(&self) -> Vec<&ImageRef> {
        let mut all: Vec<&ImageRef> = Vec::new();
        if let Some(form) = &self.about {
            all.extend(form.images());
        }
        if let Some(editor) = &self.providers {
            all.extend(editor.images());
        }
        if let Some(form) = &self.site {
            all.extend(form.images());
        }
        all
    }

    /// Placeholders still waiting for publication.
    pub fn pending(&self) -> HashSet<String> {
        images::pending_set(self.images())
    }

    /// Drops previews no loaded form refers to any more.
    pub fn prune_previews(&mut self) -> usize {
        let referenced = self.pending();
        let dropped = self.previews.retain_referenced(&referenced);
        if dropped > 0 {
            debug!("dropped {dropped} unused preview(s)");
        }
        dropped
    }

    pub fn thumbnail(&self, image: &ImageRef) -> Thumbnail {
        images::thumbnail(image, &self.previews)
    }

    /// Inserts an anchor at the caret of the focused rich field and returns
    /// the caret position (UTF-16) right after it.
    ///
    /// The text around the caret is converted the same way a save would, so
    /// the field becomes stored HTML and passes through later saves intact.
    pub fn insert_link(&mut self, url: &str, label: &str) -> Result<u32> {
        let url = url.trim();
        if !is_linkable(url) {
            return Err(CmsError::validation(format!("{url:?} is not a web, mailto or site-relative link")));
        }
        let Some(field) = self.focus.field() else {
            return Err(CmsError::validation("click into a text field first"));
        };
        if !field.is_rich() {
            return Err(CmsError::validation("links can only go into rich text fields"));
        }
        let caret = self.focus.caret_utf16() as usize;
        let text = self
            .text_mut(field)
            .ok_or_else(|| CmsError::validation("the focused field no longer exists"))?;

        let split = utf16_to_byte_idx(text, caret);
        let (before, after) = text.split_at(split);
        let label = match label.trim() {
            "" => url,
            label => label,
        };
        let before = plain_to_html(before);
        let anchor = format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape_html(url),
            escape_html(label)
        );
        let updated = format!("{before}{anchor}{}", plain_to_html(after));
        let new_caret = byte_to_utf16_idx(&updated, before.len() + anchor.len());
        *text = updated;

        self.focus.update_caret(field, new_caret);
        Ok(new_caret)
    }
}
