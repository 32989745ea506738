use smartstring::alias::String as SmartString;

pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-lantern-id";
pub const DEFAULT_TEXT_TAG: &str = "span";

/// Runtime settings shared by the builder and the binding engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    /// Attribute that carries a mounted node's id
    pub marker_attribute: SmartString,
    /// Tag of the element generated around text and state children
    pub text_tag: SmartString,
}

impl UiConfig {
    pub fn with_marker_attribute(mut self, name: impl Into<SmartString>) -> Self {
        self.marker_attribute = name.into();
        self
    }

    pub fn with_text_tag(mut self, tag: impl Into<SmartString>) -> Self {
        self.text_tag = tag.into();
        self
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.into(),
            text_tag: DEFAULT_TEXT_TAG.into(),
        }
    }
}
