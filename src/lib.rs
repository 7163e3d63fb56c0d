//! The library code for `unheralded`, the publisher behind a personal blog.
//! A run is a fixed sequence of named steps ([`crate::build`]) over one
//! [`crate::context::PublishingContext`]:
//!
//! 1. Install plugins ([`crate::plugin`]), e.g. syntax highlighting
//! 2. Copy static resources and the theme's stylesheet ([`crate::resources`])
//! 3. Parse the Markdown content into sections, items and pages
//!    ([`crate::parser`])
//! 4. Sort items newest first
//! 5. Render every page with the theme ([`crate::theme`]) and write it to
//!    disk ([`crate::write`])
//! 6. Move the 404 page to where GitHub Pages expects it
//! 7. Write the RSS feed ([`crate::feed`]) and the sitemap
//!    ([`crate::sitemap`])
//! 8. Optionally commit and push the output ([`crate::deploy`])
//!
//! Rendering is a pure function of the content, the configuration and a
//! [`crate::classifier::TagClassifier`] built from the content's tags, which
//! gives every tag a stable color class.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod classifier;
pub mod config;
pub mod content;
pub mod context;
pub mod deploy;
pub mod feed;
pub mod highlight;
pub mod item;
pub mod markdown;
pub mod minify;
pub mod parser;
pub mod plugin;
pub mod resources;
pub mod sitemap;
pub mod steps;
pub mod tag;
pub mod theme;
pub mod write;

#[cfg(test)]
mod test_helpers;
