/// Default tag name of the elements that mark dynamic child slots within a template.
pub const DEFAULT_PLACEHOLDER_TAG: &str = "block-child";

/// The kind of node used for insertion markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerKind {
    /// An empty text node. Invisible, and serializes to nothing.
    #[default]
    Text,

    /// An empty comment. Serializes to `<!---->`, which makes markers visible in snapshots.
    Comment,
}

/// Host level configuration, shared by every template and block rendered into that host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tag name of slot placeholders in compiled templates. Always lower case.
    pub placeholder_tag: String,

    /// Node kind created for insertion markers.
    pub marker: MarkerKind,
}

impl Config {
    /// Use a different tag name for slot placeholders.
    pub fn with_placeholder_tag<S>(mut self, tag: S) -> Self
    where
        S: AsRef<str>,
    {
        self.placeholder_tag = tag.as_ref().to_ascii_lowercase();
        self
    }

    /// Use a different node kind for insertion markers.
    pub fn with_marker(mut self, marker: MarkerKind) -> Self {
        self.marker = marker;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder_tag: DEFAULT_PLACEHOLDER_TAG.to_string(),
            marker: MarkerKind::default(),
        }
    }
}
