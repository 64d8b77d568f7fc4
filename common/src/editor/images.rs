//! Image slots and the local preview cache.
//!
//! An upload yields a pending placeholder that is inserted into the document
//! right away. The preview cache maps that placeholder to the data URI of the
//! uploaded bytes so the editor can show a thumbnail before the backend
//! publishes a durable URL. The cache lives in memory only, and an entry is
//! removed only when its image no longer appears anywhere in the document
//! (a duplicated block may share a placeholder with its source).

use std::collections::{HashMap, HashSet};

use crate::client::UploadedImage;
use crate::model::ImageRef;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewCache {
    entries: HashMap<String, String>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: &ImageRef, data_url: String) {
        self.entries.insert(image.to_string(), data_url);
    }

    pub fn get(&self, image: &ImageRef) -> Option<&str> {
        self.entries.get(&image.to_string()).map(String::as_str)
    }

    /// Lookup by the placeholder string as stored in documents.
    pub fn get_raw(&self, placeholder: &str) -> Option<&str> {
        self.entries.get(placeholder).map(String::as_str)
    }

    pub fn remove(&mut self, image: &ImageRef) -> Option<String> {
        self.entries.remove(&image.to_string())
    }

    /// Drops every entry whose placeholder is not in `referenced`.
    pub fn retain_referenced(&mut self, referenced: &HashSet<String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|placeholder, _| referenced.contains(placeholder));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the editor shows for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// `None` when a pending image has no local preview (e.g. after a reload).
    pub src: Option<String>,
    pub pending: bool,
}

pub fn thumbnail(image: &ImageRef, previews: &PreviewCache) -> Thumbnail {
    match image {
        ImageRef::Durable(url) => Thumbnail {
            src: (!url.trim().is_empty()).then(|| url.clone()),
            pending: false,
        },
        ImageRef::Pending { .. } => Thumbnail {
            src: previews.get(image).map(str::to_string),
            pending: true,
        },
    }
}

/// Mutable view of an image field inside a form.
pub enum SlotMut<'a> {
    /// Hero image, team photo, service image.
    Single(&'a mut Option<ImageRef>),
    /// Case images, story images.
    List(&'a mut Vec<ImageRef>),
}

impl SlotMut<'_> {
    pub fn accepts_multiple(&self) -> bool {
        matches!(self, SlotMut::List(_))
    }

    /// Inserts uploaded images: all of them for a list, the first one for a
    /// single slot (replacing what was there).
    pub fn attach(self, uploads: Vec<UploadedImage>, previews: &mut PreviewCache) -> usize {
        match self {
            SlotMut::Single(slot) => {
                let Some(upload) = uploads.into_iter().next() else {
                    return 0;
                };
                previews.insert(&upload.placeholder, upload.preview_data_url);
                *slot = Some(upload.placeholder);
                1
            }
            SlotMut::List(list) => {
                let count = uploads.len();
                for upload in uploads {
                    previews.insert(&upload.placeholder, upload.preview_data_url);
                    list.push(upload.placeholder);
                }
                count
            }
        }
    }

    /// Removes one image. `index` is ignored for single slots.
    pub fn remove(self, index: usize) -> Option<ImageRef> {
        match self {
            SlotMut::Single(slot) => slot.take(),
            SlotMut::List(list) => (index < list.len()).then(|| list.remove(index)),
        }
    }

    /// Sets a durable URL typed by hand. Blank input clears a single slot.
    pub fn set_url(self, url: &str) {
        let url = url.trim();
        match self {
            SlotMut::Single(slot) => {
                *slot = (!url.is_empty()).then(|| ImageRef::parse(url));
            }
            SlotMut::List(list) => {
                if !url.is_empty() {
                    list.push(ImageRef::parse(url));
                }
            }
        }
    }
}

/// Collects the placeholder strings of pending images.
pub fn pending_set<'a>(images: impl IntoIterator<Item = &'a ImageRef>) -> HashSet<String> {
    images
        .into_iter()
        .filter(|image| image.is_pending())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(id: &str) -> UploadedImage {
        UploadedImage {
            placeholder: ImageRef::pending(id, format!("{id}.png")),
            preview_data_url: format!("data:image/png;base64,{id}"),
        }
    }

    #[test]
    fn list_slot_takes_every_upload() {
        let mut images = vec![ImageRef::Durable("/a.png".into())];
        let mut previews = PreviewCache::new();

        let added = SlotMut::List(&mut images).attach(vec![upload("u1"), upload("u2")], &mut previews);

        assert_eq!(added, 2);
        assert_eq!(images.len(), 3);
        assert!(images[1].to_string().starts_with("gas://image/u1/"));
        assert_eq!(previews.get_raw("gas://image/u2/u2.png"), Some("data:image/png;base64,u2"));
    }

    #[test]
    fn single_slot_keeps_first_upload() {
        let mut hero = None;
        let mut previews = PreviewCache::new();
        SlotMut::Single(&mut hero).attach(vec![upload("a")], &mut previews);
        SlotMut::Single(&mut hero).attach(vec![upload("b"), upload("c")], &mut previews);

        assert_eq!(hero, Some(ImageRef::pending("b", "b.png")));
        assert!(previews.get_raw("gas://image/c/c.png").is_none());
    }

    #[test]
    fn pruning_keeps_only_referenced_previews() {
        let mut images = Vec::new();
        let mut previews = PreviewCache::new();
        SlotMut::List(&mut images).attach(vec![upload("x"), upload("y")], &mut previews);

        let removed = SlotMut::List(&mut images).remove(0);
        let dropped = previews.retain_referenced(&pending_set(&images));

        assert_eq!(removed, Some(ImageRef::pending("x", "x.png")));
        assert_eq!(dropped, 1);
        assert!(previews.get_raw("gas://image/y/y.png").is_some());
    }

    #[test]
    fn thumbnails_mark_pending_images() {
        let mut previews = PreviewCache::new();
        let pending = ImageRef::pending("p", "p.png");
        previews.insert(&pending, "data:x".into());

        assert_eq!(thumbnail(&pending, &previews), Thumbnail { src: Some("data:x".into()), pending: true });
        let durable = thumbnail(&ImageRef::Durable("/d.png".into()), &previews);
        assert!(!durable.pending);
        assert!(thumbnail(&ImageRef::pending("gone", "g.png"), &previews).src.is_none());
    }
}
