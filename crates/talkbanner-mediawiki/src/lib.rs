//! MediaWiki backend for talkbanner
//!
//! [`MediaWikiClient`] speaks the Action API and implements
//! [`talkbanner_core::WikiApi`], so a [`talkbanner_core::BannerBot`] can run
//! against a live wiki.

pub mod client;
pub mod config;
mod response;

pub use client::MediaWikiClient;
pub use config::ClientConfig;
