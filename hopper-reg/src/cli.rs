use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[clap(name = "hopper-reg", version, author)]
pub(crate) struct Cli {
    /// Print debug info
    #[clap(long, action, help = "If given, shows additional logging information.", env = "DEBUG")]
    pub(crate) debug: bool,
    /// Print as much info as possible
    #[clap(long, action, help = "If given, shows the largest amount of logging information possible.", env = "TRACE")]
    pub(crate) trace: bool,

    /// Node environment metadata store.
    #[clap(
        short,
        long,
        default_value = "/node.yml",
        help = "The path to the node environment configuration. This defines things such as where the work-element snapshot lives, as well as \
                this service's bind address.",
        env = "NODE_CONFIG_PATH"
    )]
    pub(crate) node_config_path: PathBuf,
}
