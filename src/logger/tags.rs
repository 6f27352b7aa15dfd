/// Log tags identify the module a message originates from
///
/// Tags drive per-module debug gating: `--debug-<tag>` on the command line
/// enables Debug-level output for that tag only.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Wallet,
    Rpc,
    Swap,
    Quote,
    Transaction,
    Bundle,
    Webserver,
}

impl LogTag {
    /// Fixed-width display name for aligned console output
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Wallet => "WALLET",
            LogTag::Rpc => "RPC",
            LogTag::Swap => "SWAP",
            LogTag::Quote => "QUOTE",
            LogTag::Transaction => "TX",
            LogTag::Bundle => "BUNDLE",
            LogTag::Webserver => "WEB",
        }
    }

    /// Key used for `--debug-<key>` command-line matching
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Wallet => "wallet",
            LogTag::Rpc => "rpc",
            LogTag::Swap => "swap",
            LogTag::Quote => "quote",
            LogTag::Transaction => "transaction",
            LogTag::Bundle => "bundle",
            LogTag::Webserver => "webserver",
        }
    }

    /// All tags, used when expanding a bare `--debug` flag
    pub fn all() -> &'static [LogTag] {
        &[
            LogTag::System,
            LogTag::Config,
            LogTag::Wallet,
            LogTag::Rpc,
            LogTag::Swap,
            LogTag::Quote,
            LogTag::Transaction,
            LogTag::Bundle,
            LogTag::Webserver,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
