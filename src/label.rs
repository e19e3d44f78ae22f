use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;

/// Label shown when a timer has no tag, or an empty one.
pub const DEFAULT_LABEL: &str = "ScopeTimer";

/// The display tag of a timer with its ownership already decided.
///
/// Borrowed labels point into memory the caller keeps alive for at least as
/// long as the timer (literals, call-site strings, views the borrow checker
/// can see outliving the timer). Owned labels hold a private copy, used for
/// strings built at runtime.
///
/// Which variant a tag becomes depends only on its static type, through
/// [`IntoLabel`], so the common literal case never allocates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label<'a> {
    Borrowed(&'a str),
    Owned(String),
}

impl<'a> Label<'a> {
    /// The `"ScopeTimer"` sentinel. Never owns storage.
    #[inline]
    pub const fn sentinel() -> Self {
        Label::Borrowed(DEFAULT_LABEL)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Label::Borrowed(s) => s,
            Label::Owned(s) => s.as_str(),
        }
    }

    /// Whether the text lives in storage owned by this value.
    #[inline]
    pub fn owns_storage(&self) -> bool {
        matches!(self, Label::Owned(_))
    }

    fn borrowed_or_sentinel(s: &'a str) -> Self {
        if s.is_empty() {
            Self::sentinel()
        } else {
            Label::Borrowed(s)
        }
    }

    fn owned_or_sentinel(s: String) -> Self {
        if s.is_empty() {
            Self::sentinel()
        } else {
            Label::Owned(s)
        }
    }
}

impl Default for Label<'_> {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion of a timer tag into a [`Label`].
///
/// | Input                      | Result                       |
/// |----------------------------|------------------------------|
/// | `()`, `None`, empty input  | sentinel, not owned          |
/// | `&str` (literal or view)   | borrowed                     |
/// | `String`                   | moved into owned storage     |
/// | `&String`                  | copied into owned storage    |
/// | `&CStr`, `Option<&CStr>`   | copied into owned storage    |
/// | `Cow<str>`                 | keeps the `Cow`'s ownership  |
pub trait IntoLabel<'a> {
    fn into_label(self) -> Label<'a>;
}

impl<'a> IntoLabel<'a> for Label<'a> {
    #[inline]
    fn into_label(self) -> Label<'a> {
        match self {
            Label::Borrowed(s) => Label::borrowed_or_sentinel(s),
            Label::Owned(s) => Label::owned_or_sentinel(s),
        }
    }
}

impl<'a> IntoLabel<'a> for () {
    #[inline]
    fn into_label(self) -> Label<'a> {
        Label::sentinel()
    }
}

impl<'a> IntoLabel<'a> for &'a str {
    #[inline]
    fn into_label(self) -> Label<'a> {
        Label::borrowed_or_sentinel(self)
    }
}

impl<'a> IntoLabel<'a> for Option<&'a str> {
    #[inline]
    fn into_label(self) -> Label<'a> {
        self.map_or_else(Label::sentinel, Label::borrowed_or_sentinel)
    }
}

impl<'a> IntoLabel<'a> for String {
    #[inline]
    fn into_label(self) -> Label<'a> {
        Label::owned_or_sentinel(self)
    }
}

impl<'a> IntoLabel<'a> for &String {
    #[inline]
    fn into_label(self) -> Label<'a> {
        Label::owned_or_sentinel(self.clone())
    }
}

impl<'a> IntoLabel<'a> for Cow<'a, str> {
    #[inline]
    fn into_label(self) -> Label<'a> {
        match self {
            Cow::Borrowed(s) => Label::borrowed_or_sentinel(s),
            Cow::Owned(s) => Label::owned_or_sentinel(s),
        }
    }
}

// C strings carry no lifetime guarantee worth trusting, so they are copied.
impl<'a> IntoLabel<'a> for &CStr {
    fn into_label(self) -> Label<'a> {
        Label::owned_or_sentinel(self.to_string_lossy().into_owned())
    }
}

impl<'a> IntoLabel<'a> for Option<&CStr> {
    fn into_label(self) -> Label<'a> {
        self.map_or_else(Label::sentinel, |s| s.into_label())
    }
}
