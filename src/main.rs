use std::path::PathBuf;

use pyrite::app::{self, AppConfig};
use pyrite::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig {
        model_path: std::env::args().nth(1).map(PathBuf::from),
        ..AppConfig::default()
    };
    app::run(config)
}
