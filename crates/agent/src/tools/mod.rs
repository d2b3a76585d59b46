//! BUILT-IN ACTIONS

pub mod search;
pub mod wiki;

pub use search::{SearchSettings, WebSearch};
pub use wiki::{WikiSearch, WikiSettings};

use automind_config::Config;

use crate::registry::ActionRegistry;
use crate::Result;

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

pub(crate) const QUERY_DESCRIPTION: &str = "The search string. be simple";

/// Register the built-in actions with settings from config
pub fn register_default_actions(registry: &mut ActionRegistry, config: &Config) -> Result<()> {
    registry.register_with::<WikiSearch>(WikiSettings::from_config(&config.toolkit.wiki))?;
    registry.register_with::<WebSearch>(SearchSettings::from_config(&config.toolkit.search))?;
    Ok(())
}
