mod app;
mod rotating_quad;
mod scene;
mod triangle;
mod two_triangles;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::setup::ShaderLibrary;
use prism_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

use crate::app::SampleApp;
use crate::scene::{builtin_shaders, Sample};

/// Step-by-step GPU rendering samples.
#[derive(Debug, Parser)]
#[command(name = "prism-samples", version)]
struct Cli {
    /// Sample to run.
    #[arg(value_enum, default_value_t = Sample::RotatingQuad)]
    sample: Sample,

    /// Window title; defaults to the sample name.
    #[arg(long)]
    title: Option<String>,

    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Load `<name>.vert.wgsl` / `<name>.frag.wgsl` from this directory
    /// instead of the built-in shaders.
    #[arg(long, value_name = "DIR")]
    shaders: Option<PathBuf>,

    /// Log filter (env_logger syntax); overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

impl Cli {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| format!("prism: {}", self.sample.name())),
            initial_size: LogicalSize::new(self.width, self.height),
        }
    }

    fn shader_library(&self) -> anyhow::Result<ShaderLibrary> {
        match &self.shaders {
            Some(dir) => ShaderLibrary::load_dir(dir)
                .with_context(|| format!("failed to load shaders from {}", dir.display())),
            None => builtin_shaders().context("built-in shaders are malformed"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let shaders = cli.shader_library()?;
    log::info!("running `{}` with {} shaders", cli.sample.name(), shaders.len());

    Runtime::run(
        cli.runtime_config(),
        GpuInit::default(),
        SampleApp::new(cli.sample, shaders),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_rotating_quad() {
        let cli = Cli::try_parse_from(["prism-samples"]).unwrap();
        assert_eq!(cli.sample, Sample::RotatingQuad);
        assert_eq!(cli.runtime_config().title, "prism: rotating-quad");
    }

    #[test]
    fn parses_sample_and_overrides() {
        let cli = Cli::try_parse_from(["prism-samples", "two-triangles", "--width", "300", "--title", "demo"]).unwrap();
        assert_eq!(cli.sample, Sample::TwoTriangles);

        let config = cli.runtime_config();
        assert_eq!(config.title, "demo");
        assert_eq!(config.initial_size.width, 300.0);
        assert_eq!(config.initial_size.height, 600.0);
    }
}
