//  NODE.rs
//    by Lut99
//
//  Created:
//    04 Feb 2025, 14:31:26
//  Last edited:
//    22 May 2025, 09:48:12
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the `node.yml` file, which describes the environment of a
//!   Hopper node: where its services bind and where its element
//!   snapshot lives.
//

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use specifications::constants::HOPPER_REG_PORT;

use crate::info::YamlInfo;


/***** LIBRARY *****/
/// The contents of a `node.yml` file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NodeConfig {
    /// A human-friendly name for this node.
    pub name:     String,
    /// Where this node keeps its files.
    pub paths:    NodePaths,
    /// Where this node's services live.
    pub services: NodeServices,
}
impl YamlInfo for NodeConfig {}

/// Defines the paths used by a node.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NodePaths {
    /// The work-element snapshot served by the registry.
    pub elements: PathBuf,
}

/// Defines where the services of a node may be found.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NodeServices {
    /// The registry service.
    pub reg: ServiceAddress,
}

/// Defines how to reach (or host) a single service.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServiceAddress {
    /// The address the service binds to.
    pub bind: SocketAddr,
}
impl Default for ServiceAddress {
    #[inline]
    fn default() -> Self { Self { bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), HOPPER_REG_PORT) } }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_node_config_parses() {
        let raw: &str = r#"
name: umbrella-global
paths:
  elements: /var/lib/hopper/elements.json
services:
  reg:
    bind: "0.0.0.0:50250"
"#;

        let cfg: NodeConfig = NodeConfig::from_string(raw).unwrap();
        assert_eq!(cfg.name, "umbrella-global");
        assert_eq!(cfg.paths.elements, PathBuf::from("/var/lib/hopper/elements.json"));
        assert_eq!(cfg.services.reg.bind.port(), 50250);
    }

    #[test]
    fn test_node_config_round_trip() {
        let cfg: NodeConfig = NodeConfig {
            name:     "testnode".into(),
            paths:    NodePaths { elements: PathBuf::from("./elements.json") },
            services: NodeServices { reg: ServiceAddress::default() },
        };

        let raw: String = cfg.to_string().unwrap();
        let cfg2: NodeConfig = NodeConfig::from_string(raw).unwrap();
        assert_eq!(cfg2.name, cfg.name);
        assert_eq!(cfg2.paths.elements, cfg.paths.elements);
        assert_eq!(cfg2.services.reg.bind, cfg.services.reg.bind);
    }

    #[test]
    fn test_node_config_missing_file() {
        assert!(NodeConfig::from_path("/definitely/not/there/node.yml").is_err());
    }
}
