//! Vendor/style selector.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

/// File name of the entry template inside a template set.
pub const ROUTER_TEMPLATE_FILE: &str = "router.hbs";

/// Device family + syntax dialect choosing a template set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleSelector {
    vendor: String,
    style: String,
}

fn valid_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl StyleSelector {
    /// Build a selector; tokens are restricted to `[A-Za-z0-9_]+`.
    pub fn new(vendor: &str, style: &str) -> ApiResult<Self> {
        if !valid_token(vendor) || !valid_token(style) {
            return Err(ApiError::BadRequest(format!(
                "invalid vendor/style selector `{}/{}`",
                vendor, style
            )));
        }
        Ok(Self {
            vendor: vendor.to_string(),
            style: style.to_string(),
        })
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// Styles carrying "json" produce JSON documents.
    pub fn wants_json(&self) -> bool {
        self.style.contains("json")
    }

    /// Response content type for output of this selector.
    pub fn content_type(&self) -> &'static str {
        if self.wants_json() {
            "application/json"
        } else {
            "text/plain; charset=utf-8"
        }
    }

    /// Entry template of this selector's set under `root`.
    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.vendor)
            .join(&self.style)
            .join(ROUTER_TEMPLATE_FILE)
    }
}

impl FromStr for StyleSelector {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((vendor, style)) => Self::new(vendor, style),
            None => Err(ApiError::BadRequest(format!(
                "selector `{}` is not of the form vendor/style",
                s
            ))),
        }
    }
}

impl std::fmt::Display for StyleSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.vendor, self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let selector: StyleSelector = "brocade/netiron".parse().unwrap();
        assert_eq!(selector.vendor(), "brocade");
        assert_eq!(selector.style(), "netiron");
        assert_eq!(selector.to_string(), "brocade/netiron");
        assert_eq!(
            selector.template_path(Path::new("/t")),
            PathBuf::from("/t/brocade/netiron/router.hbs")
        );
    }

    #[test]
    fn test_rejects_path_tricks() {
        assert!(StyleSelector::new("..", "netiron").is_err());
        assert!(StyleSelector::new("brocade", "net/iron").is_err());
        assert!(StyleSelector::new("", "set").is_err());
        assert!("juniper".parse::<StyleSelector>().is_err());
        assert!("a/b/c".parse::<StyleSelector>().is_err());
    }

    #[test]
    fn test_content_negotiation() {
        let text = StyleSelector::new("juniper", "set").unwrap();
        assert!(!text.wants_json());
        assert_eq!(text.content_type(), "text/plain; charset=utf-8");

        let json = StyleSelector::new("native", "json").unwrap();
        assert!(json.wants_json());
        assert_eq!(json.content_type(), "application/json");
    }
}
