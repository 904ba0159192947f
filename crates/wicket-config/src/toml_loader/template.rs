//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Wicket Configuration
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "127.0.0.1"
# port = 0               # asset server, 0 = pick a free port
# ws_port = 0            # channel transport, 0 = pick a free port
# public = false         # listen on all interfaces

[browser]
# default = "any"        # none, any, chrome, firefox, edge, safari, chromium,
#                        # opera, brave, vivaldi, epic, yandex, chromium-based
# startup_timeout = 30   # seconds, 1-600
# kiosk = false
# hidden = false

[windows]
# max_windows = 256      # 2-4096
# width = 0
# height = 0
# default_root_folder = ""

[tls]
# certificate_path = ""
# private_key_path = ""

[logging]
# level = "info"         # trace, debug, info, warn, error
"##
    .to_string()
}
