/// Value that forces the root namespace.
pub const ROOT_SENTINEL: &str = "/";
const ROOT_NAME: &str = "root";

/// Namespace scope of a single Vault call.
///
/// `Ambient` leaves the client's configured default namespace in place, `Root`
/// clears it even when the client has one, and `Named` overrides it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Namespace {
    #[default]
    Ambient,
    Root,
    Named(String),
}

impl Namespace {
    /// Interprets a user supplied override.
    ///
    /// Unset and blank both mean `Ambient`; only the explicit sentinel means `Root`.
    pub fn from_override(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Ambient,
            Some(ROOT_SENTINEL) | Some(ROOT_NAME) => Self::Root,
            Some(name) => Self::Named(name.to_string()),
        }
    }

    /// Namespace header value to send, given the client's ambient default.
    pub fn resolve<'a>(&'a self, ambient: Option<&'a str>) -> Option<&'a str> {
        match self {
            Self::Ambient => ambient,
            Self::Root => None,
            Self::Named(name) => Some(name),
        }
    }
}
