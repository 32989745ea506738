use smartstring::alias::String as SmartString;

/// How a prop is written to its element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    Event,
    Property,
    Attribute,
}

/// DOM properties that must be assigned rather than set as attributes.
const PROPERTY_PROPS: &[&str] = &[
    "srcObject",
    "muted",
    "defaultMuted",
    "volume",
    "currentTime",
    "playbackRate",
    "checked",
    "indeterminate",
];

impl PropKind {
    /// Static prop-name classification shared by the builder and refresh.
    ///
    /// `on` followed by a lowercase event name is an event, names in the
    /// property allow-list are properties, anything else is an attribute.
    pub fn classify(name: &str) -> Self {
        if event_name(name).is_some() {
            PropKind::Event
        } else if PROPERTY_PROPS.contains(&name) {
            PropKind::Property
        } else {
            PropKind::Attribute
        }
    }
}

/// Event type for an event prop: `onclick` -> `click`
pub fn event_name(prop: &str) -> Option<&str> {
    let event = prop.strip_prefix("on")?;
    if !event.is_empty() && event.bytes().all(|b| b.is_ascii_lowercase()) {
        Some(event)
    } else {
        None
    }
}

/// Effect re-applied when a bound state key changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Event,
    Property,
    Attribute,
    Text,
}

impl From<PropKind> for BindingKind {
    fn from(kind: PropKind) -> Self {
        match kind {
            PropKind::Event => BindingKind::Event,
            PropKind::Property => BindingKind::Property,
            PropKind::Attribute => BindingKind::Attribute,
        }
    }
}

/// One state dependency of a node: which key, and what to write when it changes.
///
/// `target` is the prop name for prop bindings and empty for text bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub kind: BindingKind,
    pub target: SmartString,
    pub state_key: SmartString,
}

impl Binding {
    pub fn new(kind: BindingKind, target: impl Into<SmartString>, state_key: impl Into<SmartString>) -> Self {
        Self {
            kind,
            target: target.into(),
            state_key: state_key.into(),
        }
    }

    pub fn text(state_key: impl Into<SmartString>) -> Self {
        Self::new(BindingKind::Text, "", state_key)
    }

    /// Reason this binding cannot be mounted, if any
    pub(crate) fn shape_error(&self) -> Option<String> {
        if self.state_key.is_empty() {
            return Some(format!("{:?} binding has an empty state key", self.kind));
        }
        match (self.kind, self.target.is_empty()) {
            (BindingKind::Text, false) => Some(format!(
                "text binding for '{}' must not name a target, got '{}'",
                self.state_key, self.target
            )),
            (BindingKind::Event | BindingKind::Property | BindingKind::Attribute, true) => Some(
                format!("{:?} binding for '{}' has no target", self.kind, self.state_key),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PropKind::classify("onclick"), PropKind::Event);
        assert_eq!(PropKind::classify("onfullscreenchange"), PropKind::Event);
        assert_eq!(PropKind::classify("srcObject"), PropKind::Property);
        assert_eq!(PropKind::classify("muted"), PropKind::Property);
        assert_eq!(PropKind::classify("class"), PropKind::Attribute);
        assert_eq!(PropKind::classify("style"), PropKind::Attribute);
        assert_eq!(PropKind::classify("dataName"), PropKind::Attribute);
    }

    #[test]
    fn test_event_name_needs_lowercase_suffix() {
        assert_eq!(event_name("onkeydown"), Some("keydown"));
        assert_eq!(event_name("on"), None);
        assert_eq!(event_name("onClick"), None);
        assert_eq!(event_name("online-status"), None);
    }

    #[test]
    fn test_shape() {
        assert!(Binding::text("firstName").shape_error().is_none());
        assert!(Binding::new(BindingKind::Property, "muted", "muted").shape_error().is_none());
        assert!(Binding::new(BindingKind::Text, "x", "firstName").shape_error().is_some());
        assert!(Binding::new(BindingKind::Attribute, "", "style").shape_error().is_some());
        assert!(Binding::text("").shape_error().is_some());
    }
}
