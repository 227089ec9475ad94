// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image alt text check - WCAG 1.1.1 Non-text Content (Level A)
//!
//! Every `<img>` lands in exactly one bucket:
//! - no `alt` attribute: missing
//! - `alt=""`: empty (fine for decorative images, still counted)
//! - a low-information word such as "image": counted as missing
//! - anything else: valid

use crate::analyzers::{Check, ProblemElement};
use crate::page::{PageError, PageQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Alt values that say nothing about the image
const GENERIC_ALT_VALUES: &[&str] = &["image", "photo", "picture", "img"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAltTextResult {
    pub total_images: usize,
    /// Missing attribute plus generic text
    pub missing_alt: usize,
    pub empty_alt: usize,
    pub valid_alt: usize,
    pub problem_images: Vec<ProblemElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How an image's alt attribute was judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltClass {
    Missing,
    Empty,
    Generic(String),
    Valid,
}

impl AltClass {
    /// Reason recorded for problem images; `None` for acceptable ones
    pub fn issue(&self) -> Option<String> {
        match self {
            AltClass::Missing => Some("Missing alt attribute".to_string()),
            AltClass::Generic(text) => Some(format!("Generic alt text: {}", text)),
            AltClass::Empty | AltClass::Valid => None,
        }
    }
}

/// Classify a raw `alt` attribute value
pub fn classify_alt(alt: Option<&str>) -> AltClass {
    match alt {
        None => AltClass::Missing,
        Some("") => AltClass::Empty,
        Some(text) => {
            let lower = text.to_lowercase();
            if GENERIC_ALT_VALUES.contains(&lower.as_str()) {
                AltClass::Generic(lower)
            } else {
                AltClass::Valid
            }
        }
    }
}

/// Image alternative text check
pub struct AltTextCheck;

impl Check for AltTextCheck {
    type Output = ImageAltTextResult;

    fn name(&self) -> &str {
        "Image Alt Text"
    }

    fn description(&self) -> &str {
        "Checks <img> elements for missing or uninformative alt text"
    }

    fn wcag_criterion(&self) -> &str {
        "1.1.1"
    }

    fn run(&self, page: &dyn PageQuery) -> ImageAltTextResult {
        let mut result = ImageAltTextResult::default();

        if let Err(e) = check_images(page, &mut result) {
            warn!("Alt text check incomplete: {}", e);
            result.error = Some(format!("Error checking alt text: {}", e));
        }

        result
    }
}

fn check_images(page: &dyn PageQuery, result: &mut ImageAltTextResult) -> Result<(), PageError> {
    let images = page.find_all("img")?;
    result.total_images = images.len();

    for img in images {
        let class = classify_alt(page.attribute(img, "alt")?.as_deref());
        debug!("Image {} classified as {:?}", img, class);

        match &class {
            AltClass::Missing | AltClass::Generic(_) => result.missing_alt += 1,
            AltClass::Empty => result.empty_alt += 1,
            AltClass::Valid => result.valid_alt += 1,
        }

        if let Some(issue) = class.issue() {
            result
                .problem_images
                .push(ProblemElement::new(issue, page.outer_html(img)?));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::static_page::StaticPage;

    #[test]
    fn test_classify_alt() {
        assert_eq!(classify_alt(None), AltClass::Missing);
        assert_eq!(classify_alt(Some("")), AltClass::Empty);
        assert_eq!(classify_alt(Some("Photo")), AltClass::Generic("photo".into()));
        assert_eq!(classify_alt(Some("Bar chart of Q4 revenue")), AltClass::Valid);
        // whitespace is not empty, and is not a generic word either
        assert_eq!(classify_alt(Some(" ")), AltClass::Valid);
    }

    #[test]
    fn test_five_image_mix() {
        let page = StaticPage::parse(
            r#"<html><body>
                <img src="a.png">
                <img src="b.png" alt="">
                <img src="c.png" alt="image">
                <img src="d.png" alt="photo">
                <img src="e.png" alt="Blue square placeholder image">
            </body></html>"#,
        );
        let result = AltTextCheck.run(&page);

        assert_eq!(result.total_images, 5);
        assert_eq!(result.missing_alt, 3);
        assert_eq!(result.empty_alt, 1);
        assert_eq!(result.valid_alt, 1);
        assert_eq!(result.problem_images.len(), 3);
        assert_eq!(result.problem_images[0].issue, "Missing alt attribute");
        assert_eq!(result.problem_images[1].issue, "Generic alt text: image");
        assert!(result.problem_images[2].html.contains("d.png"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_accessible_images() {
        let page = StaticPage::parse(
            r#"<html><body>
                <img src="logo.png" alt="Company logo">
                <img src="divider.png" alt="">
            </body></html>"#,
        );
        let result = AltTextCheck.run(&page);
        assert!(result.problem_images.is_empty());
        assert_eq!(result.valid_alt, 1);
        assert_eq!(result.empty_alt, 1);
    }

    #[test]
    fn test_no_images() {
        let page = StaticPage::parse("<html><body><p>Text only</p></body></html>");
        assert_eq!(AltTextCheck.run(&page), ImageAltTextResult::default());
    }
}
