//! Files the chief prepares for the distributed runtime on multi-node runs.
use std::{fs, path::Path};

use dtrain_model::{ClusterDescriptor, LaunchEnv};
use tracing::debug;

use crate::{LaunchError, env::is_forwarded};

/// One `<addr> slots=<n>` line per container, in rank order.
pub fn render_hostfile(descriptor: &ClusterDescriptor) -> String {
    let slots = descriptor.slot_count();
    descriptor
        .container_addrs()
        .iter()
        .map(|addr| format!("{addr} slots={slots}\n"))
        .collect()
}

pub fn write_hostfile(path: &Path, descriptor: &ClusterDescriptor) -> Result<(), LaunchError> {
    write(path, &render_hostfile(descriptor))?;
    debug!(target: "dtrain.core.files", path = %path.display(), "hostfile written");
    Ok(())
}

/// `KEY=VALUE` lines re-exported by the runtime on every peer.
///
/// Forwarded variables come first, filtered through [`is_forwarded`] so container-local
/// identifiers never reach peers; `published` follows and wins on conflict.
/// Values spanning lines cannot be expressed and are skipped.
pub fn render_runtime_env(published: &LaunchEnv, forwarded: &LaunchEnv) -> String {
    forwarded
        .iter()
        .filter(|kv| is_forwarded(kv.key()))
        .map(|kv| (kv.key(), kv.value()))
        .collect::<LaunchEnv>()
        .merged(published)
        .resolved()
        .into_iter()
        .filter(|(_, v)| !v.contains('\n'))
        .map(|(k, v)| format!("{k}={v}\n"))
        .collect()
}

pub fn write_runtime_env(
    path: &Path,
    published: &LaunchEnv,
    forwarded: &LaunchEnv,
) -> Result<(), LaunchError> {
    write(path, &render_runtime_env(published, forwarded))?;
    debug!(target: "dtrain.core.files", path = %path.display(), "runtime env file written");
    Ok(())
}

fn write(path: &Path, contents: &str) -> Result<(), LaunchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| LaunchError::Io(format!("{}: {e}", parent.display())))?;
    }
    fs::write(path, contents).map_err(|e| LaunchError::Io(format!("{}: {e}", path.display())))
}
