use std::path::Path;
use weekend_core::config::Config;

pub fn run(root: &Path, port: Option<u16>, open_browser: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(weekend_server::serve(root.to_path_buf(), port, open_browser))
}
