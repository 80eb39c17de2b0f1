//! firefleet-node — VM node lifecycle management.
//!
//! Creates, deletes, inspects, and lists the microVMs that back cluster
//! nodes by invoking an external `ignite`-compatible hypervisor CLI. The
//! hypervisor is the only source of truth; nothing is cached between calls.
//!
//! # Architecture
//!
//! ```text
//! NodeManager
//!   ├── create_nodes() → bounded concurrent `run` invocations
//!   ├── delete_nodes() → sequential forced `rm`, fail-fast
//!   ├── get_node()     → presence check + one `ps` query per field
//!   └── list_nodes()   → name listing, then get_node() per name
//!
//! HypervisorCli (command)   — renders structured invocations
//! exec                      — runs invocations, streaming or captured
//! output                    — coerces captured text into NodeRecord fields
//! ```

pub mod command;
pub mod error;
pub mod exec;
pub mod manager;
pub mod output;

pub use command::{HypervisorCli, Invocation};
pub use error::{NodeError, NodeResult};
pub use manager::NodeManager;
pub use output::NodeField;
