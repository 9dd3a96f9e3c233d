//! Common/shared messages across commands

pub struct CommonMessages {
    // ============================================================================
    // Error Messages
    // ============================================================================
    pub error_command_failed: &'static str,
    pub error_debug_info: &'static str,
    pub error_generic: &'static str,
    pub error_rebuild_hint: &'static str,

    // ============================================================================
    // Generic Messages
    // ============================================================================
    pub failed: &'static str,
    pub success: &'static str,
    pub warning_generic: &'static str,
}

pub const COMMON_MESSAGES: CommonMessages = CommonMessages {
    // Error Messages
    error_command_failed: "❌ Command failed: {command}",
    error_debug_info: "🔍 Debug info: {details}",
    error_generic: "❌ Error: {error}",
    error_rebuild_hint: "💡 Rebuild the configuration with: kdk init",

    // Generic Messages
    failed: "❌ Failed!",
    success: "✅ Success!",
    warning_generic: "⚠️  Warning: {warning}",
};
