//! Environment lifecycle messages (up, destroy, restart, snapshot, prune, pull, ssh, kubesync)

pub struct EnvMessages {
    // ============================================================================
    // General
    // ============================================================================
    pub is_running: &'static str,
    pub not_running: &'static str,

    // ============================================================================
    // Up
    // ============================================================================
    pub up_already_running: &'static str,
    pub up_cancelled: &'static str,
    pub up_created: &'static str,
    pub up_creating: &'static str,
    pub up_deleting: &'static str,
    pub up_exited_prompt: &'static str,
    pub up_restarted: &'static str,
    pub up_restarting: &'static str,

    // ============================================================================
    // Destroy
    // ============================================================================
    pub destroy_cancelled: &'static str,
    pub destroy_confirm: &'static str,
    pub destroy_none: &'static str,
    pub destroy_progress: &'static str,
    pub destroy_success: &'static str,

    // ============================================================================
    // Snapshot / Restart
    // ============================================================================
    pub restart_progress: &'static str,
    pub restart_success: &'static str,
    pub snapshot_progress: &'static str,
    pub snapshot_success: &'static str,

    // ============================================================================
    // Prune
    // ============================================================================
    pub prune_cancelled: &'static str,
    pub prune_confirm: &'static str,
    pub prune_none: &'static str,
    pub prune_success: &'static str,

    // ============================================================================
    // Pull / Provision
    // ============================================================================
    pub provision_progress: &'static str,
    pub pull_already_present: &'static str,
    pub pull_progress: &'static str,
    pub pull_success: &'static str,

    // ============================================================================
    // SSH / Kubesync / Mirror
    // ============================================================================
    pub kubesync_progress: &'static str,
    pub kubesync_success: &'static str,
    pub mirror_running: &'static str,
    pub mirror_starting: &'static str,
    pub ssh_connecting: &'static str,
    pub ssh_not_ready: &'static str,
}

pub const ENV_MESSAGES: EnvMessages = EnvMessages {
    // General
    is_running: "✅ KDK '{name}' is running",
    not_running: "🔴 KDK '{name}' is not running\n💡 Start it with: kdk up",

    // Up
    up_already_running: "✅ KDK '{name}' is already running",
    up_cancelled: "❌ No valid choice given; KDK '{name}' left untouched",
    up_created: "✅ KDK '{name}' is up\n  Image:      {image}\n  SSH port:   {port}",
    up_creating: "🚀 Creating KDK '{name}' from {image}...",
    up_deleting: "🗑️  Deleting stopped KDK '{name}'...",
    up_exited_prompt: "KDK '{name}' exists but is stopped. [r]estart it or [d]elete and recreate it?",
    up_restarted: "✅ KDK '{name}' restarted",
    up_restarting: "🔄 Starting stopped KDK '{name}'...",

    // Destroy
    destroy_cancelled: "\n❌ Destruction cancelled",
    destroy_confirm: "🗑️  Destroy container {container} ({names}, {state})?",
    destroy_none: "🔍 No KDK container named '{name}' found",
    destroy_progress: "🗑️  Removing container {container}...",
    destroy_success: "✅ KDK destroy complete",

    // Snapshot / Restart
    restart_progress: "🔄 Recreating KDK '{name}' from {snapshot}...",
    restart_success: "✅ KDK '{name}' restarted from snapshot {snapshot}",
    snapshot_progress: "📸 Snapshotting KDK '{name}'...",
    snapshot_success: "✅ Snapshot saved as {snapshot}",

    // Prune
    prune_cancelled: "❌ Prune stopped after removing {count} image(s)",
    prune_confirm: "🗑️  Remove stale KDK image {image} ({tags})?",
    prune_none: "✅ No stale KDK images",
    prune_success: "✅ Removed {count} stale image(s)",

    // Pull / Provision
    provision_progress: "🔧 Provisioning user in KDK '{name}'...",
    pull_already_present: "✅ Image {image} already present",
    pull_progress: "⬇️  Pulling {image} (this can take a while)...",
    pull_success: "✅ Pulled {image}",

    // SSH / Kubesync / Mirror
    kubesync_progress: "☸️  Syncing kube config into KDK '{name}'...",
    kubesync_success: "✅ Kube config synced to ~/.kube/docker-for-desktop.example.org",
    mirror_running: "✅ Keybase mirror already running",
    mirror_starting: "🔗 Starting Keybase mirror...",
    ssh_connecting: "🔗 Connecting to KDK '{name}' on port {port}...",
    ssh_not_ready: "❌ KDK '{name}' could not be started; nothing to connect to",
};
