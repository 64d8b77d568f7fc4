//! Provider forms and the selector that switches between them.

use log::debug;
use serde_json::{Map, Value};

use super::list::{self, ListOp};
use super::optional;
use crate::error::{CmsError, Result};
use crate::model::{Case, Coords, ImageRef, Provider, Providers, TimelineEntry};
use crate::richtext::{html_to_plain, plain_to_html};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderForm {
    pub id: String,
    pub name: String,
    pub category: String,
    pub schedule: String,
    pub location: String,
    pub address: String,
    pub gmap_url: String,
    pub lat: String,
    pub lng: String,
    pub description: String,
    pub cases: Vec<CaseForm>,
    pub timeline: Vec<TimelineForm>,
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseForm {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub images: Vec<ImageRef>,
    pub video: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineForm {
    pub time: String,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderField {
    Name,
    Category,
    Schedule,
    Location,
    Address,
    GmapUrl,
    Lat,
    Lng,
    Description,
    CaseId(usize),
    CaseTitle(usize),
    CaseSummary(usize),
    CaseVideo(usize),
    TimelineTime(usize),
    TimelineTitle(usize),
    TimelineDetail(usize),
}

impl ProviderField {
    pub fn is_rich(self) -> bool {
        matches!(
            self,
            ProviderField::Description | ProviderField::CaseSummary(_) | ProviderField::TimelineDetail(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderList {
    Cases,
    Timeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderImage {
    CaseImages(usize),
}

fn format_coord(value: f64) -> String {
    value.to_string()
}

fn parse_coord(label: &str, input: &str, range: f64) -> Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| CmsError::validation(format!("{label} must be a number, got {input:?}")))?;
    if !value.is_finite() || value.abs() > range {
        return Err(CmsError::validation(format!("{label} {value} is out of range")));
    }
    Ok(value)
}

impl ProviderForm {
    pub fn render(provider: &Provider) -> Self {
        let (lat, lng) = provider
            .coords
            .map(|coords| (format_coord(coords.lat), format_coord(coords.lng)))
            .unwrap_or_default();
        Self {
            id: provider.id.clone(),
            name: provider.name.clone(),
            category: provider.category.clone(),
            schedule: provider.schedule.clone(),
            location: provider.location.clone(),
            address: provider.address.clone(),
            gmap_url: provider.gmap_url.clone().unwrap_or_default(),
            lat,
            lng,
            description: html_to_plain(&provider.description),
            cases: provider
                .cases
                .iter()
                .map(|case| CaseForm {
                    id: case.id.clone(),
                    title: case.title.clone(),
                    summary: html_to_plain(&case.summary),
                    images: case.images.clone(),
                    video: case.video.clone().unwrap_or_default(),
                })
                .collect(),
            timeline: provider
                .timeline
                .iter()
                .map(|entry| TimelineForm {
                    time: entry.time.clone(),
                    title: entry.title.clone(),
                    detail: html_to_plain(&entry.detail),
                })
                .collect(),
            extra: provider.extra.clone(),
        }
    }

    /// Fails only on malformed coordinates. Both blank means "no coordinates".
    pub fn collect(&self) -> Result<Provider> {
        let coords = match (self.lat.trim(), self.lng.trim()) {
            ("", "") => None,
            (lat, lng) => Some(Coords {
                lat: parse_coord("latitude", lat, 90.0)?,
                lng: parse_coord("longitude", lng, 180.0)?,
            }),
        };
        Ok(Provider {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            schedule: self.schedule.clone(),
            location: self.location.clone(),
            address: self.address.clone(),
            gmap_url: optional(&self.gmap_url),
            coords,
            description: plain_to_html(&self.description),
            cases: self
                .cases
                .iter()
                .map(|case| Case {
                    id: case.id.clone(),
                    title: case.title.clone(),
                    summary: plain_to_html(&case.summary),
                    images: case.images.iter().filter(|image| !image.is_blank()).cloned().collect(),
                    video: optional(&case.video),
                })
                .collect(),
            timeline: self
                .timeline
                .iter()
                .map(|entry| TimelineEntry {
                    time: entry.time.clone(),
                    title: entry.title.clone(),
                    detail: plain_to_html(&entry.detail),
                })
                .collect(),
            extra: self.extra.clone(),
        })
    }

    pub fn field_mut(&mut self, field: ProviderField) -> Option<&mut String> {
        use ProviderField::*;
        Some(match field {
            Name => &mut self.name,
            Category => &mut self.category,
            Schedule => &mut self.schedule,
            Location => &mut self.location,
            Address => &mut self.address,
            GmapUrl => &mut self.gmap_url,
            Lat => &mut self.lat,
            Lng => &mut self.lng,
            Description => &mut self.description,
            CaseId(i) => &mut self.cases.get_mut(i)?.id,
            CaseTitle(i) => &mut self.cases.get_mut(i)?.title,
            CaseSummary(i) => &mut self.cases.get_mut(i)?.summary,
            CaseVideo(i) => &mut self.cases.get_mut(i)?.video,
            TimelineTime(i) => &mut self.timeline.get_mut(i)?.time,
            TimelineTitle(i) => &mut self.timeline.get_mut(i)?.title,
            TimelineDetail(i) => &mut self.timeline.get_mut(i)?.detail,
        })
    }

    pub fn apply(&mut self, target: ProviderList, op: ListOp) -> bool {
        match target {
            ProviderList::Cases => list::apply(&mut self.cases, op),
            ProviderList::Timeline => list::apply(&mut self.timeline, op),
        }
    }

    pub fn images_mut(&mut self, image: ProviderImage) -> Option<&mut Vec<ImageRef>> {
        match image {
            ProviderImage::CaseImages(i) => Some(&mut self.cases.get_mut(i)?.images),
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.cases.iter().flat_map(|case| case.images.iter())
    }
}

/// Keeps the whole provider map and one open form.
///
/// Switching providers flushes the open form into the map first, so unsaved
/// edits are never lost by navigating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProvidersEditor {
    providers: Providers,
    selected: Option<String>,
    form: Option<ProviderForm>,
}

impl ProvidersEditor {
    /// Opens the first provider (by id) if there is one.
    pub fn load(providers: Providers) -> Self {
        let mut editor = Self {
            providers,
            selected: None,
            form: None,
        };
        if let Some(first) = editor.providers.keys().next().cloned() {
            editor.open(&first);
        }
        editor
    }

    fn open(&mut self, id: &str) {
        self.form = self.providers.get(id).map(ProviderForm::render);
        self.selected = self.form.as_ref().map(|_| id.to_string());
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        match (&self.selected, &self.form) {
            (Some(selected), Some(form)) if selected == id => Some(form.name.as_str()),
            _ => self.providers.get(id).map(|provider| provider.name.as_str()),
        }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn form(&self) -> Option<&ProviderForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ProviderForm> {
        self.form.as_mut()
    }

    /// Writes the open form back into the map.
    pub fn flush(&mut self) -> Result<()> {
        let (Some(id), Some(form)) = (&self.selected, &self.form) else {
            return Ok(());
        };
        let mut provider = form.collect()?;
        provider.id = id.clone();
        self.providers.insert(id.clone(), provider);
        Ok(())
    }

    /// Flushes the current form, then opens `id`. On a flush error the
    /// current form stays open.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.providers.contains_key(id) {
            return Err(CmsError::validation(format!("unknown provider {id:?}")));
        }
        self.flush()?;
        debug!("editing provider {id}");
        self.open(id);
        Ok(())
    }

    /// Adds an empty provider and opens it.
    pub fn create(&mut self, id: &str, name: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CmsError::validation("provider id is required"));
        }
        if self.providers.contains_key(id) {
            return Err(CmsError::validation(format!("provider id {id:?} already exists")));
        }
        self.flush()?;
        self.providers.insert(id.to_string(), Provider::new(id, name.trim()));
        self.open(id);
        Ok(())
    }

    /// Removes a provider. Nothing happens unless `confirmed` is true.
    /// Returns the removed provider.
    pub fn delete(&mut self, id: &str, confirmed: bool) -> Result<Option<Provider>> {
        if !confirmed {
            return Ok(None);
        }
        let removed = self.providers.remove(id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
            self.form = None;
            if let Some(first) = self.providers.keys().next().cloned() {
                self.open(&first);
            }
        }
        Ok(removed)
    }

    /// Every provider with the open form applied.
    pub fn collect(&self) -> Result<Providers> {
        let mut providers = self.providers.clone();
        if let (Some(id), Some(form)) = (&self.selected, &self.form) {
            let mut provider = form.collect()?;
            provider.id = id.clone();
            providers.insert(id.clone(), provider);
        }
        Ok(providers)
    }

    /// Images of every provider, the open form included.
    pub fn images(&self) -> Vec<&ImageRef> {
        let mut images: Vec<&ImageRef> = self
            .providers
            .iter()
            .filter(|(id, _)| self.selected.as_deref() != Some(id.as_str()))
            .flat_map(|(_, provider)| provider.images())
            .collect();
        if let Some(form) = &self.form {
            images.extend(form.images());
        }
        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dataset;
    use serde_json::json;

    fn providers() -> Providers {
        Providers::from_value(json!({
            "b-center": {"name": "B Center", "description": "Open daily", "cases": []},
            "a-house": {
                "name": "A House",
                "coords": {"lat": 25.0, "lng": 121.5},
                "description": "Shelter &amp; food",
                "cases": [{"id": "c1", "title": "Camp", "summary": "Summer", "images": ["/a.jpg"]}],
                "timeline": [{"time": "2020", "title": "Founded", "detail": "Opened"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn load_selects_first_id() {
        let editor = ProvidersEditor::load(providers());
        assert_eq!(editor.selected(), Some("a-house"));
        assert_eq!(editor.ids().collect::<Vec<_>>(), vec!["a-house", "b-center"]);
        assert_eq!(editor.form().unwrap().lat, "25");
    }

    #[test]
    fn round_trip_is_lossless() {
        let original = providers();
        let editor = ProvidersEditor::load(original.clone());
        assert_eq!(editor.collect().unwrap(), original);
    }

    #[test]
    fn switching_flushes_edits() {
        let mut editor = ProvidersEditor::load(providers());
        editor.form_mut().unwrap().name = "A House (renamed)".into();
        editor.select("b-center").unwrap();
        editor.form_mut().unwrap().schedule = "Mon-Fri".into();

        let collected = editor.collect().unwrap();
        assert_eq!(collected["a-house"].name, "A House (renamed)");
        assert_eq!(collected["b-center"].schedule, "Mon-Fri");
    }

    #[test]
    fn bad_coordinates_block_switching() {
        let mut editor = ProvidersEditor::load(providers());
        editor.form_mut().unwrap().lat = "north".into();
        let err = editor.select("b-center").unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
        assert_eq!(editor.selected(), Some("a-house"));

        editor.form_mut().unwrap().lat = String::new();
        editor.form_mut().unwrap().lng = String::new();
        editor.select("b-center").unwrap();
        assert_eq!(editor.collect().unwrap()["a-house"].coords, None);
    }

    #[test]
    fn create_rejects_empty_and_duplicate_ids() {
        let mut editor = ProvidersEditor::load(providers());
        assert!(editor.create("  ", "Nameless").is_err());
        assert!(editor.create("a-house", "Again").is_err());

        editor.create("c-clinic", "C Clinic").unwrap();
        assert_eq!(editor.selected(), Some("c-clinic"));
        assert_eq!(editor.len(), 3);
        assert_eq!(editor.collect().unwrap()["c-clinic"].id, "c-clinic");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut editor = ProvidersEditor::load(providers());
        assert_eq!(editor.delete("a-house", false).unwrap(), None);
        assert_eq!(editor.len(), 2);

        let removed = editor.delete("a-house", true).unwrap();
        assert_eq!(removed.map(|provider| provider.name), Some("A House".to_string()));
        assert_eq!(editor.selected(), Some("b-center"));
        assert!(!editor.collect().unwrap().contains_key("a-house"));
    }
}
