use anyhow::{Context, bail};
use tracing::info;

use kosmos_infra::AppConfig;

fn main() -> anyhow::Result<()> {
    kosmos_observability::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let boot = kosmos_app::bootstrap(&config);
    let snapshot = boot.snapshot().context("reading the permission registry")?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    info!(
        roles = snapshot.roles.len(),
        permissions = snapshot.permission_count(),
        "registry seeded"
    );

    let failed = boot.failed_modules();
    if failed > 0 {
        bail!("{failed} module(s) failed to seed");
    }
    Ok(())
}
