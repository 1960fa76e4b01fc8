pub const APP_NAME: &str = "txbuild";

pub const CONFIG_FILENAME: &str = "txbuild.json";

pub const DEFAULT_TOOL: &str = "scons";
pub const DEFAULT_JOBS: u32 = 8;
pub const DEFAULT_BIN_DIR: &str = "bin";
pub const DEFAULT_EXPORT_DIR: &str = "bin/export";
pub const DEFAULT_EDITOR_NAME: &str = "Tekisasu-Engine";
pub const DEFAULT_OVERRIDE_TEMPLATE: &str = ".tekisasu-custom.py";
pub const DEFAULT_OVERRIDE_TARGET: &str = "custom.py";

pub const ENV_TOOL: &str = "TXBUILD_TOOL";
pub const ENV_JOBS: &str = "TXBUILD_JOBS";
pub const ENV_SCRIPT_KEY: &str = "TXBUILD_SCRIPT_KEY";
pub const ENV_TIMEOUT: &str = "TXBUILD_TIMEOUT";

/// Variable the build tool reads the script encryption key from.
pub const TOOL_SCRIPT_KEY_VAR: &str = "SCRIPT_AES256_ENCRYPTION_KEY";
