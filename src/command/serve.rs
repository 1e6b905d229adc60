use anyhow::Result;

use crate::config::GatewayConfig;
use crate::gateway;

pub fn serve() -> Result<()> {
    let config = GatewayConfig::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(gateway::serve(config))
}
