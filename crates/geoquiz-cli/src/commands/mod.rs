pub mod categories;
pub mod init;
pub mod play;
pub mod preview;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use geoquiz_content::config::load_config_from;
use geoquiz_content::create_source;
use geoquiz_content::GeoquizConfig;
use geoquiz_core::controller::QuizController;

/// Load configuration and build a controller over the configured source.
pub fn controller_from_config(
    config_path: Option<PathBuf>,
) -> Result<(QuizController, GeoquizConfig)> {
    let config = load_config_from(config_path.as_deref())?;
    tracing::debug!(contentful = ?config.contentful, "configuration loaded");
    let source = create_source(&config.contentful)?;
    Ok((QuizController::new(Arc::from(source)), config))
}
