//! Release check and self-update messages

pub struct UpdateMessages {
    // ============================================================================
    // Advisory
    // ============================================================================
    pub binary_outdated: &'static str,
    pub config_outdated: &'static str,

    // ============================================================================
    // Update Command
    // ============================================================================
    pub binary_prompt: &'static str,
    pub binary_success: &'static str,
    pub config_prompt: &'static str,
    pub config_success: &'static str,
    pub image_prompt: &'static str,
    pub header: &'static str,
    pub latest_unknown: &'static str,
    pub stage_declined: &'static str,
    pub stage_failed: &'static str,
    pub stages_failed: &'static str,
    pub up_to_date: &'static str,
}

pub const UPDATE_MESSAGES: UpdateMessages = UpdateMessages {
    // Advisory
    binary_outdated: "⚠️  kdk {installed} is out of date (latest is {latest})\n💡 Run: kdk update",
    config_outdated: "⚠️  KDK '{name}' uses image tag {current} (latest is {latest})\n💡 Run: kdk update",

    // Update Command
    binary_prompt: "Replace kdk {installed} with {latest}?",
    binary_success: "✅ kdk updated to {latest}",
    config_prompt: "Update KDK '{name}' image tag from {current} to {latest}?",
    config_success: "✅ Configuration now uses {image}",
    image_prompt: "Pull image {image}?",
    header: "🔄 Checking for updates (installed {installed}, latest {latest})",
    latest_unknown: "⚠️  Could not determine the latest release; nothing to update",
    stage_declined: "ℹ️  Skipped {stage} update",
    stage_failed: "❌ {stage} update failed: {error}",
    stages_failed: "{count} update stage(s) failed",
    up_to_date: "✅ Everything is up to date ({latest})",
};
