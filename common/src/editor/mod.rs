//! Editable projections of the three datasets.
//!
//! Each form is rendered from a typed document and collected back into one.
//! Rich fields are shown as plain text and converted on collect; list-valued
//! text (roles, education) is edited one entry per line.

pub mod about;
pub mod focus;
pub mod images;
pub mod list;
pub mod provider;
pub mod site;
pub mod state;

pub use about::{AboutField, AboutForm, AboutImage, AboutList};
pub use focus::FocusContext;
pub use images::{PreviewCache, SlotMut, Thumbnail};
pub use list::{Direction, ListOp};
pub use provider::{ProviderField, ProviderForm, ProviderImage, ProviderList, ProvidersEditor};
pub use site::{SiteField, SiteForm, SiteImage, SiteList};
pub use state::{AppState, FieldId, ImageTarget, ListTarget};

/// Blank (after trimming) input means "not set".
pub(crate) fn optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn join_lines(items: &[String]) -> String {
    items.join("\n")
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_skip_blanks() {
        assert_eq!(split_lines(" a \n\n b\r\n"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(join_lines(&split_lines("x\ny")), "x\ny");
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" /x "), Some("/x".to_string()));
    }
}
