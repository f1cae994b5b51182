//! Generation driver: loads the model and configuration, runs the
//! generator over modules and writes the artifacts.

use miette::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use trellis_codegen::{Generator, ModuleArtifacts};
use trellis_config::GeneratorConfig;
use trellis_model::ClassRegistry;

pub use trellis_codegen::Skipped;

/// Orchestrates a generation run.
pub struct Driver {
    config: GeneratorConfig,
}

impl Driver {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Build a driver from an optional `trellis.toml`.
    pub fn from_config_file(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => GeneratorConfig::from_file(path)
                .map_err(|e| miette::miette!("Failed to load {}: {}", path.display(), e))?,
            None => GeneratorConfig::default(),
        };
        Ok(Self::new(config))
    }

    /// Load the JSON class model.
    pub fn load_model(&self, path: impl AsRef<Path>) -> Result<ClassRegistry> {
        let path = path.as_ref();
        let registry = ClassRegistry::from_file(path)
            .map_err(|e| miette::miette!("Failed to load model {}: {}", path.display(), e))?;
        debug!(classes = registry.len(), path = %path.display(), "loaded model");
        Ok(registry)
    }

    pub fn generate_module(&self, registry: &ClassRegistry, module: &str) -> Result<ModuleArtifacts> {
        Ok(Generator::new(registry, &self.config).generate(module)?)
    }

    /// Generate every module of the model, in parallel. Results are sorted
    /// by module name.
    pub fn generate_all(&self, registry: &ClassRegistry) -> Result<Vec<ModuleArtifacts>> {
        let modules = registry.modules();
        let artifacts: Vec<ModuleArtifacts> = modules
            .par_iter()
            .map(|module| self.generate_module(registry, module))
            .collect::<Result<_>>()?;
        Ok(artifacts)
    }

    /// Generate the named modules, or every module when `modules` is empty.
    pub fn generate_selected(
        &self,
        registry: &ClassRegistry,
        modules: &[String],
    ) -> Result<Vec<ModuleArtifacts>> {
        if modules.is_empty() {
            return self.generate_all(registry);
        }
        let mut modules = modules.to_vec();
        modules.sort();
        modules.dedup();
        modules
            .par_iter()
            .map(|module| self.generate_module(registry, module))
            .collect()
    }

    pub fn signatures(&self, registry: &ClassRegistry, module: &str) -> Result<Vec<String>> {
        Ok(Generator::new(registry, &self.config).signatures(module)?)
    }

    /// Write `<stem>.<header_extension>` and `<stem>.<source_extension>`
    /// into `dir`, creating it if needed. Returns the written paths.
    pub fn write_artifacts(&self, artifacts: &ModuleArtifacts, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .map_err(|e| miette::miette!("Failed to create {}: {}", dir.display(), e))?;

        let output = &self.config.output;
        let files = [
            (
                dir.join(format!("{}.{}", artifacts.stem, output.header_extension)),
                &artifacts.header,
            ),
            (
                dir.join(format!("{}.{}", artifacts.stem, output.source_extension)),
                &artifacts.implementation,
            ),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (path, content) in files {
            std::fs::write(&path, content)
                .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;
            written.push(path);
        }

        info!(
            module = %artifacts.module,
            dir = %dir.display(),
            skipped = artifacts.skipped.len(),
            "wrote artifacts"
        );
        Ok(written)
    }

    /// Output directory: `override_dir` if given, else the configured one.
    pub fn output_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.output_dir())
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}
