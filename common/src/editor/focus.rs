//! Tracks which text field the link dialog inserts into.

use super::state::FieldId;

/// The last focused field and caret position.
///
/// Browsers report caret offsets in UTF-16 code units; they are kept that way
/// here and converted when the field text is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusContext {
    field: Option<FieldId>,
    caret_utf16: u32,
}

impl FocusContext {
    pub fn focus(&mut self, field: FieldId, caret_utf16: u32) {
        self.field = Some(field);
        self.caret_utf16 = caret_utf16;
    }

    /// Ignored unless `field` is the focused one.
    pub fn update_caret(&mut self, field: FieldId, caret_utf16: u32) {
        if self.field == Some(field) {
            self.caret_utf16 = caret_utf16;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn field(&self) -> Option<FieldId> {
        self.field
    }

    pub fn caret_utf16(&self) -> u32 {
        self.caret_utf16
    }
}

/// UTF-16 offset to a byte offset on a char boundary. Offsets past the end
/// (or inside a surrogate pair) clamp forward.
pub fn utf16_to_byte_idx(s: &str, utf16_idx: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        if units >= utf16_idx {
            return byte_idx;
        }
        units += ch.len_utf16();
    }
    s.len()
}

pub fn byte_to_utf16_idx(s: &str, byte_idx: usize) -> u32 {
    s[..byte_idx.min(s.len())].encode_utf16().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::about::AboutField;

    #[test]
    fn caret_conversions_handle_wide_chars() {
        let text = "a😀b中c";
        assert_eq!(utf16_to_byte_idx(text, 0), 0);
        assert_eq!(utf16_to_byte_idx(text, 1), 1);
        assert_eq!(utf16_to_byte_idx(text, 3), 5);
        assert_eq!(utf16_to_byte_idx(text, 4), 6);
        assert_eq!(utf16_to_byte_idx(text, 99), text.len());
        assert_eq!(byte_to_utf16_idx(text, 5), 3);
        assert_eq!(byte_to_utf16_idx(text, text.len()), 6);
    }

    #[test]
    fn caret_updates_only_follow_focused_field() {
        let mut focus = FocusContext::default();
        focus.focus(FieldId::About(AboutField::Lead), 3);
        focus.update_caret(FieldId::About(AboutField::HeroTitle), 9);
        assert_eq!(focus.caret_utf16(), 3);
        focus.update_caret(FieldId::About(AboutField::Lead), 5);
        assert_eq!(focus.caret_utf16(), 5);
        focus.clear();
        assert_eq!(focus.field(), None);
    }
}
