// SPDX-License-Identifier: PMPL-1.0-or-later
//! WCAG reference glossary.
//!
//! A fixed table of accessibility terms, success criteria, conformance
//! levels, common axe-core rule ids and assistive technologies. Used by the
//! report renderers to annotate violations and by the `glossary` subcommand.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const ENTRIES: &[(&str, &str)] = &[
    // Core principles
    ("POUR", "The four principles of accessibility: Perceivable, Operable, Understandable, Robust"),
    ("Perceivable", "Information and user interface components must be presentable to users in ways they can perceive"),
    ("Operable", "User interface components and navigation must be operable"),
    ("Understandable", "Information and the operation of user interface must be understandable"),
    ("Robust", "Content must be robust enough that it can be interpreted by a wide variety of user agents, including assistive technologies"),
    // Common terms
    ("a11y", "Accessibility (11 letters between 'a' and 'y')"),
    ("assistive technology", "Software or hardware that helps users with disabilities interact with digital content"),
    ("screen reader", "Software that reads digital content aloud for blind or visually impaired users"),
    ("alt text", "Text alternative for images, used by screen readers and when images don't load"),
    ("ARIA", "Accessible Rich Internet Applications - a set of attributes to enhance accessibility"),
    ("color contrast", "The difference in brightness and color between foreground and background elements"),
    ("focus trap", "Sequential keyboard focus revisits an already-seen element without reaching new ones"),
    ("heading order", "Heading levels must not skip ahead (e.g. h1 directly to h3) within a document"),
    // Success criteria
    ("1.1.1", "Non-text Content: All non-text content has a text alternative (Level A)"),
    ("1.3.1", "Info and Relationships: Information, structure, and relationships can be programmatically determined (Level A)"),
    ("1.4.3", "Contrast: Text has a contrast ratio of at least 4.5:1 (Level AA)"),
    ("2.1.1", "Keyboard: All functionality is available from a keyboard (Level A)"),
    ("2.1.2", "No Keyboard Trap: Keyboard focus can be moved away from any component using only a keyboard (Level A)"),
    ("2.4.1", "Bypass Blocks: Provide way to bypass blocks of content that are repeated (Level A)"),
    ("2.4.3", "Focus Order: Components receive focus in a meaningful order (Level A)"),
    ("2.4.4", "Link Purpose: The purpose of each link can be determined from the link text (Level A)"),
    ("3.1.1", "Language of Page: The default human language can be programmatically determined (Level A)"),
    ("3.2.1", "On Focus: When a component receives focus, it does not initiate a change of context (Level A)"),
    ("3.3.2", "Labels or Instructions: Labels or instructions are provided for user input (Level A)"),
    ("4.1.1", "Parsing: Content is well-formed and contains no markup errors (Level A)"),
    ("4.1.2", "Name, Role, Value: For all user interface components, the name, role, and value can be programmatically determined (Level A)"),
    // Conformance levels
    ("Level A", "Minimum level of conformance"),
    ("Level AA", "Mid-range level of conformance, addressing the major barriers"),
    ("Level AAA", "Highest level of conformance"),
    // axe-core rules
    ("image-alt", "Images must have alternate text"),
    ("color-contrast", "Elements must have sufficient color contrast"),
    ("keyboard", "Elements must be accessible by keyboard"),
    ("label", "Form elements must have labels"),
    ("heading-order", "Headings must be in ascending order"),
    ("link-name", "Links must have discernible text"),
    ("aria-roles", "ARIA roles must be valid"),
    ("region", "All page content should be contained by landmarks"),
    // Assistive technologies
    ("NVDA", "NonVisual Desktop Access - free screen reader for Windows"),
    ("JAWS", "Job Access With Speech - commercial screen reader for Windows"),
    ("VoiceOver", "Built-in screen reader for Apple devices"),
    ("TalkBack", "Built-in screen reader for Android devices"),
];

static GLOSSARY: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| ENTRIES.iter().copied().collect());

/// axe compact criterion tags: wcag111 -> 1.1.1, wcag1411 -> 1.4.11
static COMPACT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^wcag(\d)(\d)(\d{1,2})$").expect("valid regex"));

static CRITERION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));

/// Explanation for a term or criterion number
pub fn explain(term: &str) -> Option<&'static str> {
    GLOSSARY.get(term).copied()
}

/// All entries whose key starts with `prefix` (e.g. "1." for principle 1)
pub fn terms_with_prefix(prefix: &str) -> Vec<(&'static str, &'static str)> {
    GLOSSARY
        .iter()
        .filter(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (*k, *v))
        .collect()
}

/// Every WCAG success criterion in the glossary
pub fn guidelines() -> Vec<(&'static str, &'static str)> {
    GLOSSARY
        .iter()
        .filter(|(k, _)| k.starts_with(|c: char| c.is_ascii_digit()) && k.contains('.'))
        .map(|(k, v)| (*k, *v))
        .collect()
}

/// All glossary entries, sorted by key
pub fn all_terms() -> Vec<(&'static str, &'static str)> {
    GLOSSARY.iter().map(|(k, v)| (*k, *v)).collect()
}

/// Best-effort extraction of a WCAG criterion number from a rule tag.
///
/// Accepts both `wcag2a-1.1.1` and axe's compact `wcag111` forms; level tags
/// such as `wcag2aa` yield `None`.
pub fn criterion_from_tag(tag: &str) -> Option<String> {
    if !tag.starts_with("wcag") || tag.len() <= 5 {
        return None;
    }

    if let Some((_, tail)) = tag.rsplit_once('-') {
        return CRITERION.is_match(tail).then(|| tail.to_string());
    }

    COMPACT_TAG
        .captures(tag)
        .map(|caps| format!("{}.{}.{}", &caps[1], &caps[2], &caps[3]))
}
