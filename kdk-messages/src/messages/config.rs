//! Configuration messages (init, keypair, mounts)

pub struct ConfigMessages {
    // ============================================================================
    // Init
    // ============================================================================
    pub init_header: &'static str,
    pub init_missing: &'static str,
    pub init_not_overwritten: &'static str,
    pub init_overwrite_prompt: &'static str,
    pub init_success: &'static str,

    // ============================================================================
    // Init Questions
    // ============================================================================
    pub ask_dotfiles_repo: &'static str,
    pub ask_image_repository: &'static str,
    pub ask_image_tag: &'static str,
    pub ask_port: &'static str,
    pub ask_shell: &'static str,
    pub ask_socks_enable: &'static str,
    pub ask_socks_port: &'static str,

    // ============================================================================
    // Keypair
    // ============================================================================
    pub keypair_generated: &'static str,
    pub keypair_generating: &'static str,

    // ============================================================================
    // Mounts
    // ============================================================================
    pub mount_added: &'static str,
    pub mount_container_path: &'static str,
    pub mount_host_path: &'static str,
    pub mount_skipped: &'static str,
    pub mount_more: &'static str,
    pub mount_shared_fs: &'static str,
}

pub const CONFIG_MESSAGES: ConfigMessages = ConfigMessages {
    // Init
    init_header: "🔧 Initializing KDK '{name}'",
    init_missing: "ℹ️  No configuration for KDK '{name}' yet; running init first",
    init_not_overwritten: "ℹ️  Kept existing configuration at {path}",
    init_overwrite_prompt: "Configuration {path} already exists. Overwrite it?",
    init_success: "✅ Configuration written to {path}",

    // Init Questions
    ask_dotfiles_repo: "Dotfiles repository",
    ask_image_repository: "Image repository",
    ask_image_tag: "Image tag",
    ask_port: "SSH port on localhost",
    ask_shell: "Login shell",
    ask_socks_enable: "Enable a SOCKS proxy through the KDK?",
    ask_socks_port: "SOCKS proxy port",

    // Keypair
    keypair_generated: "✅ SSH keypair written to {path}",
    keypair_generating: "🔑 Generating SSH keypair (RSA 4096)...",

    // Mounts
    mount_added: "  ✓ {source} -> {target}",
    mount_container_path: "Path inside the KDK",
    mount_host_path: "Host directory to mount",
    mount_skipped: "⚠️  No valid path given; skipping this mount",
    mount_more: "Mount additional directories into the KDK?",
    mount_shared_fs: "Keybase found at {source}. Mount it into the KDK at {target}?",
};
