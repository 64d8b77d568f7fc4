pub mod editor;
pub mod login;
pub mod members;
pub mod top_sheet;
