// SPDX-License-Identifier: PMPL-1.0-or-later
//! a11ybot - browser-driven WCAG accessibility testing
//!
//! Drives a Chromium-family browser over the DevTools protocol, injects
//! axe-core into each page, and complements the engine's findings with
//! structural checks it does not cover well. Results are merged into one
//! report per page visit and rendered as text, JSON, HTML or SARIF, with an
//! HTML dashboard linking every report in the output directory.
//!
//! ## Structural checks
//!
//! - **Keyboard** (2.1.1/2.1.2): Tab-order walk with focus trap detection
//! - **Alt Text** (1.1.1): Missing and generic image alternative text
//! - **Form Labels** (3.3.2): Explicit `<label for>` association
//! - **Headings** (1.3.1): First heading is h1, no skipped levels
//!
//! ## Pages
//!
//! Checks and the scanner talk to a page through [`page::PageQuery`] and
//! [`scanner::RuleEngine`]. [`page::browser::BrowserSession`] implements both
//! against a live browser; [`page::static_page::StaticPage`] implements the
//! query side for local HTML files.

pub mod analyzers;
pub mod config;
pub mod error;
pub mod glossary;
pub mod model;
pub mod page;
pub mod report;
pub mod runner;
pub mod scanner;
