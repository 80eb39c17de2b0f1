//! Invocation rendering for the hypervisor CLI.
//!
//! Argument lists are built structurally, one argv entry per token, so
//! parameter values can never smuggle extra arguments in. Parameters that
//! would still corrupt the list (embedded whitespace in an identifier,
//! control characters) are rejected up front as [`NodeError::Template`].

use firefleet_core::NodeSpec;

use crate::error::{NodeError, NodeResult};

/// Field path selecting a node object's name in `ps` output.
pub(crate) const NAME_PATH: &str = "{{.ObjectMeta.Name}}";

/// One external command request: executable plus ordered argument list.
///
/// Produced by [`HypervisorCli`] and consumed immediately by [`crate::exec`];
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// The invocation as a single display string, for logging only.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Renders invocations against a concrete hypervisor binary.
///
/// The binary defaults to `ignite` run through `sudo`; both are
/// configurable so tests can point at a stub executable.
#[derive(Debug, Clone)]
pub struct HypervisorCli {
    pub binary: String,
    pub sudo: bool,
}

impl Default for HypervisorCli {
    fn default() -> Self {
        Self {
            binary: "ignite".to_string(),
            sudo: true,
        }
    }
}

impl HypervisorCli {
    pub fn new(binary: impl Into<String>, sudo: bool) -> Self {
        Self {
            binary: binary.into(),
            sudo,
        }
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        if self.sudo {
            let mut wrapped = Vec::with_capacity(args.len() + 1);
            wrapped.push(self.binary.clone());
            wrapped.extend(args);
            Invocation {
                program: "sudo".to_string(),
                args: wrapped,
            }
        } else {
            Invocation {
                program: self.binary.clone(),
                args,
            }
        }
    }

    /// Render a `run` invocation creating the node `name` from `spec`.
    pub fn create(&self, spec: &NodeSpec, name: &str) -> NodeResult<Invocation> {
        identifier("name", name)?;
        identifier("image", &spec.image)?;
        identifier("kernel image", &spec.kernel_image)?;
        identifier("memory", &spec.memory)?;
        identifier("disk size", &spec.disk_size)?;
        printable("kernel args", &spec.kernel_args)?;

        let mut args = vec![
            "run".to_string(),
            spec.image.clone(),
            format!("--name={name}"),
            "--ssh".to_string(),
            format!("--kernel-image={}", spec.kernel_image),
        ];
        if !spec.kernel_args.is_empty() {
            args.push(format!("--kernel-args={}", spec.kernel_args));
        }
        args.push(format!("--cpus={}", spec.cpus));
        args.push(format!("--memory={}", spec.memory));
        args.push(format!("--size={}", spec.disk_size));
        Ok(self.invocation(args))
    }

    /// Render a forced `rm` invocation for `name`. Forced because this is
    /// fleet automation; nothing is around to answer a confirmation prompt.
    pub fn delete(&self, name: &str) -> NodeResult<Invocation> {
        identifier("name", name)?;
        Ok(self.invocation(vec![
            "rm".to_string(),
            name.to_string(),
            "--force".to_string(),
        ]))
    }

    /// Render a `ps` invocation checking that a node named `name` exists.
    pub fn query_presence(&self, name: &str) -> NodeResult<Invocation> {
        identifier("name", name)?;
        Ok(self.invocation(vec![
            "ps".to_string(),
            "--all".to_string(),
            "-f".to_string(),
            format!("{NAME_PATH}={name}"),
        ]))
    }

    /// Render a `ps` invocation fetching one output field of node `name`.
    pub fn query_field(&self, name: &str, selector: &str) -> NodeResult<Invocation> {
        identifier("name", name)?;
        Ok(self.invocation(vec![
            "ps".to_string(),
            "--all".to_string(),
            "-f".to_string(),
            format!("{NAME_PATH}={name}"),
            "-t".to_string(),
            selector.to_string(),
        ]))
    }

    /// Render a `ps` invocation listing node names, optionally restricted
    /// to names matching `pattern`.
    pub fn list_names(&self, pattern: Option<&str>) -> NodeResult<Invocation> {
        let mut args = vec!["ps".to_string(), "--all".to_string()];
        if let Some(pattern) = pattern {
            identifier("filter", pattern)?;
            args.push("-f".to_string());
            args.push(format!("{NAME_PATH}=~{pattern}"));
        }
        args.push("-t".to_string());
        args.push(NAME_PATH.to_string());
        Ok(self.invocation(args))
    }
}

/// A non-empty single-token parameter.
fn identifier(parameter: &'static str, value: &str) -> NodeResult<()> {
    if value.is_empty() {
        return Err(NodeError::Template {
            parameter,
            reason: "is empty".to_string(),
        });
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(NodeError::Template {
            parameter,
            reason: format!("{value:?} contains whitespace or control characters"),
        });
    }
    Ok(())
}

/// Kernel boot args legitimately contain spaces; only reject values that
/// cannot be passed through an argv entry at all.
fn printable(parameter: &'static str, value: &str) -> NodeResult<()> {
    if value.chars().any(char::is_control) {
        return Err(NodeError::Template {
            parameter,
            reason: format!("{value:?} contains control characters"),
        });
    }
    Ok(())
}
