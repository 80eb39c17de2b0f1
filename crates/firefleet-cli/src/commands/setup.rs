use tracing::info;

use firefleet_script::{Script, ScriptStore};

/// Release tag the prerequisite scripts are pinned to.
const SCRIPT_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

pub async fn install(force: bool) -> anyhow::Result<()> {
    info!("Installing prerequisites ({})", SCRIPT_VERSION);

    let store = ScriptStore::new();
    store
        .download(Script::InstallPrerequisites, SCRIPT_VERSION, force)
        .await?;
    store.run(Script::InstallPrerequisites, SCRIPT_VERSION).await?;
    println!("✓ Prerequisites installed");
    Ok(())
}

pub async fn uninstall() -> anyhow::Result<()> {
    info!("Uninstalling prerequisites ({})", SCRIPT_VERSION);

    let store = ScriptStore::new();
    store
        .download(Script::UninstallPrerequisites, SCRIPT_VERSION, false)
        .await?;
    store
        .run(Script::UninstallPrerequisites, SCRIPT_VERSION)
        .await?;
    println!("✓ Prerequisites uninstalled");
    Ok(())
}
