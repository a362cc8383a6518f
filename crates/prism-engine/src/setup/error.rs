use std::path::PathBuf;

use thiserror::Error;

use super::ShaderKind;

/// Failure of a resource-setup step.
///
/// Every variant is terminal for the setup sequence: callers propagate with `?`
/// and never continue with a partially-initialized program.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unsupported shader kind `{0}`")]
    UnsupportedShaderKind(String),

    #[error("no shader source named `{0}`")]
    MissingSource(String),

    #[error("failed to read shader source {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} shader `{id}` failed to compile:\n{log}")]
    ShaderCompile {
        id: String,
        kind: ShaderKind,
        log: String,
    },

    #[error("program `{vertex}` + `{fragment}` failed to link:\n{log}")]
    ProgramLink {
        vertex: String,
        fragment: String,
        log: String,
    },

    #[error("program does not declare an attribute named `{0}`")]
    UnknownAttribute(String),

    #[error("program does not declare a uniform named `{0}`")]
    UnknownUniform(String),

    #[error("attribute `{name}` declared with {components} components (expected 1..=4)")]
    InvalidComponents { name: String, components: u32 },

    #[error("{buffers} buffers supplied for {slots} attribute slots")]
    AttributeCountMismatch { buffers: usize, slots: usize },

    #[error("rotation axis {0:?} has no direction")]
    DegenerateAxis([f32; 3]),
}
