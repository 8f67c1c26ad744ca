//! talkbanner core
//!
//! The decision pipeline of a banner-adding wiki agent:
//! - Resolves the pages reachable from seed categories
//! - Recognises templates under any of their redirect aliases
//! - Gates every edit on banner, kill switch, opt-out and redirect checks
//! - Extracts an existing assessment and prepends the banner
//!
//! The remote wiki is an explicit capability ([`WikiApi`]); the core holds
//! no global session and performs no HTTP itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use talkbanner_core::{BannerBot, BotConfig};
//! use std::sync::Arc;
//!
//! # async fn example(wiki: Arc<dyn talkbanner_core::WikiApi>) -> Result<(), Box<dyn std::error::Error>> {
//! let bot = BannerBot::new(wiki, BotConfig::new().with_dry_run(true))?;
//! let report = bot.run().await?;
//!
//! println!("Edited {} pages", report.total_edited());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod api;
pub mod bot;
pub mod classification;
pub mod closure;
pub mod config;
pub mod edit;
pub mod eligibility;
pub mod error;
pub mod pool;
pub mod redirects;
pub mod templates;
pub mod types;

// Re-exports for convenience
pub use api::{SharedWiki, WikiApi};
pub use bot::BannerBot;
pub use classification::{parse_classification, ClassificationExtractor};
pub use closure::CategoryClosureResolver;
pub use config::BotConfig;
pub use edit::EditApplier;
pub use eligibility::{EligibilityEngine, RunContext};
pub use error::{BotError, BotResult, ConfigError, PoolError, WikiError};
pub use pool::{PagePool, PoolStats};
pub use redirects::RedirectResolver;
pub use templates::TemplateMembershipChecker;
pub use types::{
    AliasSet, CategoryReport, CategoryTitle, ClassificationValue, IneligibleReason, PageInfo,
    PageOutcome, PageTitle, PlannedEdit, RunReport, Stage, TemplateTitle, Verdict,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with talkbanner
    pub use crate::{
        BannerBot, BotConfig, BotError, CategoryTitle, ClassificationValue, PageInfo, PageOutcome,
        PageTitle, RunReport, WikiApi, WikiError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
