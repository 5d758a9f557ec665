//! Highlighting of cloud layer tokens (e.g. `BKN020`) in report text.
//! See [`highlight()`].

use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// Cloud layer amount followed by the three digit layer base.
static CLOUD_LAYER: Lazy<Regex> =
    Lazy::new(|| Regex::new("(FEW|BKN|SCT)([0-9]{3})").expect("Invalid cloud layer pattern"));

/// Layer bases strictly above this value are highlighted as [`CloudLayerSeverity::High`]. The
/// comparison uses the literal three digit value, without scaling to feet.
pub const HIGH_LAYER_THRESHOLD: u16 = 30;

/// Text which is safe to embed in an HTML document.
///
/// Only constructed by escaping arbitrary text ([`Markup::escape()`]) or by [`highlight()`],
/// which escapes its input before inserting its own fixed tags. Has no `Deserialize` or
/// `From<String>` implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Escape `text` so it is displayed verbatim.
    pub fn escape(text: &str) -> Self {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                c => escaped.push(c),
            }
        }
        Self(escaped)
    }

    /// The escaped HTML.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Colour class of a cloud layer, decided by its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudLayerSeverity {
    /// Base at or below [`HIGH_LAYER_THRESHOLD`], shown in blue.
    Low,
    /// Base above [`HIGH_LAYER_THRESHOLD`], shown in red.
    High,
}

impl CloudLayerSeverity {
    /// Severity for a layer with the three digit `base` value.
    pub fn from_base(base: u16) -> Self {
        if base > HIGH_LAYER_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }

    /// CSS color used to highlight the layer.
    pub fn color(&self) -> &'static str {
        match self {
            CloudLayerSeverity::Low => "blue",
            CloudLayerSeverity::High => "red",
        }
    }
}

/// Escape `text` and wrap the amount of every cloud layer token in bold, colored according to
/// [`CloudLayerSeverity`]. The layer base digits are kept after the wrapped amount, so `BKN045`
/// becomes `<b style="color:red">BKN</b>045`.
pub fn highlight(text: &str) -> Markup {
    let escaped = Markup::escape(text);
    let highlighted = CLOUD_LAYER.replace_all(escaped.as_str(), |captures: &Captures| {
        // Always three ascii digits.
        let base: u16 = captures[2].parse().unwrap_or_default();
        format!(
            r#"<b style="color:{}">{}</b>{}"#,
            CloudLayerSeverity::from_base(base).color(),
            &captures[1],
            &captures[2]
        )
    });
    Markup(highlighted.into_owned())
}
