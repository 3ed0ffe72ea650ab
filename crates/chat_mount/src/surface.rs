//! The page elements the controller drives: status indicator, panel, widget slot.

pub const CONNECTING_TEXT: &str = "Connecting to agent…";
pub const UNAVAILABLE_TEXT: &str =
    "The service is unavailable at the moment, please try again later";

pub trait MountSurface {
    fn show_panel(&self);
    fn hide_panel(&self);
    fn show_status(&self);
    fn hide_status(&self);
    fn set_status_text(&self, text: &str);
    /// Insert the configured widget into the panel, replacing any previous one.
    fn attach_widget(&self);
}

pub fn unavailable_text(note: Option<&str>) -> String {
    match note {
        Some(note) if !note.is_empty() => format!("{} ({})", UNAVAILABLE_TEXT, note),
        _ => UNAVAILABLE_TEXT.to_string(),
    }
}
