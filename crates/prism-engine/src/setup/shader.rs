use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::context::{RenderContext, ShaderId};

use super::SetupError;

/// Pipeline stage a shader source targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// Resolves a declared kind string.
    ///
    /// Accepts the script-type spellings (`x-shader/x-vertex`,
    /// `x-shader/x-fragment`), the long names and the usual file suffixes
    /// (`vert`, `frag`). Anything else is rejected before any compilation.
    pub fn from_declared(declared: &str) -> Result<Self, SetupError> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "x-shader/x-vertex" | "vertex" | "vert" | "vs" => Ok(Self::Vertex),
            "x-shader/x-fragment" | "fragment" | "frag" | "fs" => Ok(Self::Fragment),
            _ => Err(SetupError::UnsupportedShaderKind(declared.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shader text keyed by an identifier and a declared kind. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    id: String,
    kind: ShaderKind,
    text: String,
}

impl ShaderSource {
    pub fn new(id: impl Into<String>, kind: ShaderKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
        }
    }

    /// Builds a source from a declared kind string (see [`ShaderKind::from_declared`]).
    pub fn declared(
        id: impl Into<String>,
        declared_kind: &str,
        text: impl Into<String>,
    ) -> Result<Self, SetupError> {
        Ok(Self::new(id, ShaderKind::from_declared(declared_kind)?, text))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Named collection of shader sources.
///
/// Looking up an identifier that was never registered is the
/// [`SetupError::MissingSource`] condition.
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    sources: HashMap<String, ShaderSource>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source`, replacing any previous source with the same id.
    pub fn insert(&mut self, source: ShaderSource) -> &mut Self {
        self.sources.insert(source.id.clone(), source);
        self
    }

    pub fn with(mut self, source: ShaderSource) -> Self {
        self.insert(source);
        self
    }

    pub fn get(&self, id: &str) -> Result<&ShaderSource, SetupError> {
        self.sources
            .get(id)
            .ok_or_else(|| SetupError::MissingSource(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Loads every `<name>.<kind>.wgsl` file in `dir`.
    ///
    /// The id is the file name without the `.wgsl` extension (`basic.vert`),
    /// the kind comes from the inner extension. Files without the `.wgsl`
    /// extension are skipped; an unknown inner extension is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, SetupError> {
        let io_err = |source| SetupError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut library = Self::new();
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_err)?;
        paths.sort();

        for path in paths {
            if path.extension().and_then(|e| e.to_str()) != Some("wgsl") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let declared = Path::new(id)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            let kind = ShaderKind::from_declared(declared)?;

            let text = std::fs::read_to_string(&path).map_err(|source| SetupError::Io {
                path: path.clone(),
                source,
            })?;

            log::debug!("loaded {kind} shader `{id}` from {}", path.display());
            library.insert(ShaderSource::new(id, kind, text));
        }

        Ok(library)
    }
}

/// A shader that compiled successfully.
///
/// There is no "failed" state: compilation failure produces a
/// [`SetupError`] instead of a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    handle: ShaderId,
    source_id: String,
    kind: ShaderKind,
}

impl CompiledShader {
    pub fn handle(&self) -> ShaderId {
        self.handle
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }
}

/// Compiles `source` on `ctx`.
///
/// On failure the compiler's info log is reported through the logger and
/// returned inside [`SetupError::ShaderCompile`].
pub fn compile_shader<C>(ctx: &mut C, source: &ShaderSource) -> Result<CompiledShader, SetupError>
where
    C: RenderContext + ?Sized,
{
    match ctx.compile_shader(source.kind, &source.text) {
        Ok(handle) => {
            log::debug!("compiled {} shader `{}`", source.kind, source.id);
            Ok(CompiledShader {
                handle,
                source_id: source.id.clone(),
                kind: source.kind,
            })
        }
        Err(info_log) => {
            log::error!("{} shader `{}` failed to compile:\n{info_log}", source.kind, source.id);
            Err(SetupError::ShaderCompile {
                id: source.id.clone(),
                kind: source.kind,
                log: info_log,
            })
        }
    }
}

/// Looks `id` up in `library` and compiles it.
pub fn compile_named<C>(
    ctx: &mut C,
    library: &ShaderLibrary,
    id: &str,
) -> Result<CompiledShader, SetupError>
where
    C: RenderContext + ?Sized,
{
    compile_shader(ctx, library.get(id)?)
}
