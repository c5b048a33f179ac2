//! Page visibility capability detection.
//!
//! Browsers shipped the page visibility API behind vendor prefixes before
//! standardization, so the hidden-flag property and its change event go by
//! four possible name pairs. See
//! <https://developer.mozilla.org/en-US/docs/Web/API/Page_Visibility_API>.

use crate::host::DocumentHost;

pub(crate) const STANDARD_HIDDEN_FLAG: &str = "hidden";
pub(crate) const STANDARD_CHANGE_EVENT: &str = "visibilitychange";

/// Which flavor of the page visibility API the host supports, if any.
///
/// Detected once per tracker and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityApi {
    Standard,
    Webkit,
    Mozilla,
    Ms,
    Unsupported,
}

/// Probe order is fixed: the unprefixed standard name wins over any prefix.
const PROBE_ORDER: [VisibilityApi; 4] = [
    VisibilityApi::Standard,
    VisibilityApi::Webkit,
    VisibilityApi::Mozilla,
    VisibilityApi::Ms,
];

impl VisibilityApi {
    /// Select the first variant whose hidden-flag property is present on
    /// the host. Presence of the key decides, not the value: a flag that
    /// currently reads `false` still selects its variant.
    ///
    /// An environment with none of the properties yields `Unsupported`,
    /// which is a normal state rather than an error.
    pub fn detect(host: &dyn DocumentHost) -> Self {
        PROBE_ORDER
            .iter()
            .copied()
            .find(|api| {
                api.hidden_flag()
                    .is_some_and(|flag| host.flag(flag).is_some())
            })
            .unwrap_or(Self::Unsupported)
    }

    pub fn is_supported(self) -> bool {
        self.hidden_flag().is_some()
    }

    /// Name of the boolean property holding the hidden state.
    pub fn hidden_flag(self) -> Option<&'static str> {
        match self {
            Self::Standard => Some(STANDARD_HIDDEN_FLAG),
            Self::Webkit => Some("webkitHidden"),
            Self::Mozilla => Some("mozHidden"),
            Self::Ms => Some("msHidden"),
            Self::Unsupported => None,
        }
    }

    /// Name of the event dispatched when the hidden state changes.
    pub fn event_name(self) -> Option<&'static str> {
        match self {
            Self::Standard => Some(STANDARD_CHANGE_EVENT),
            Self::Webkit => Some("webkitvisibilitychange"),
            Self::Mozilla => Some("mozvisibilitychange"),
            Self::Ms => Some("msvisibilitychange"),
            Self::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;

    #[test]
    fn test_detect_standard() {
        let doc = MemoryDocument::with_flag("hidden", false).unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Standard);
    }

    #[test]
    fn test_detect_webkit() {
        let doc = MemoryDocument::with_flag("webkitHidden", false).unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Webkit);
    }

    #[test]
    fn test_detect_mozilla() {
        let doc = MemoryDocument::with_flag("mozHidden", false).unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Mozilla);
    }

    #[test]
    fn test_detect_ms() {
        let doc = MemoryDocument::with_flag("msHidden", false).unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Ms);
    }

    #[test]
    fn test_detect_unsupported_when_no_flags() {
        let doc = MemoryDocument::new();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Unsupported);
        assert!(!VisibilityApi::detect(&doc).is_supported());
    }

    #[test]
    fn test_detect_prefers_standard_over_prefixed() {
        let doc = MemoryDocument::new();
        doc.define_flag("msHidden", true).unwrap();
        doc.define_flag("webkitHidden", true).unwrap();
        doc.define_flag("hidden", false).unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Standard);
    }

    #[test]
    fn test_detect_prefers_webkit_over_later_prefixes() {
        let doc = MemoryDocument::new();
        doc.define_flag("mozHidden", false).unwrap();
        doc.define_flag("webkitHidden", false).unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Webkit);
    }

    #[test]
    fn test_presence_counts_even_when_value_is_false() {
        // A defined flag with value `false` must still select its variant.
        let doc = MemoryDocument::with_flag("mozHidden", false).unwrap();
        let api = VisibilityApi::detect(&doc);
        assert_eq!(api, VisibilityApi::Mozilla);
        assert_eq!(api.hidden_flag(), Some("mozHidden"));
        assert_eq!(api.event_name(), Some("mozvisibilitychange"));
    }

    #[test]
    fn test_unsupported_has_no_names() {
        assert_eq!(VisibilityApi::Unsupported.hidden_flag(), None);
        assert_eq!(VisibilityApi::Unsupported.event_name(), None);
    }
}
