//! Module list to document: one page, one artboard, one group per module

use crate::modules::{default_height, lookup, placeholder, ModuleContext};
use crate::{AssemblyConfig, Colors, ModuleSpec, Palette, Result, Typography};
use rand::rngs::StdRng;
use rand::RngCore;
use sketch_model::{Document, Group, Layer, NodeFactory, Rect, StyleSpec};

/// Name of the fill rectangle behind each module's content
pub const SECTION_LAYER_NAME: &str = "Section";

/// Builds documents from module lists
pub struct Assembler<R: RngCore = StdRng> {
    factory: NodeFactory<R>,
    config: AssemblyConfig,
    colors: Colors,
    typography: Typography,
}

impl Assembler<StdRng> {
    pub fn new(config: AssemblyConfig, palette: &Palette, typography: Typography) -> Result<Self> {
        Self::with_factory(NodeFactory::new(), config, palette, typography)
    }
}

impl<R: RngCore> Assembler<R> {
    /// Assembler drawing IDs from `factory`. Fails on a bad palette entry or
    /// an invalid canvas size.
    pub fn with_factory(
        factory: NodeFactory<R>,
        config: AssemblyConfig,
        palette: &Palette,
        typography: Typography,
    ) -> Result<Self> {
        let colors = palette.resolve()?;
        Rect::from_size(config.width, config.height)?;
        Ok(Self {
            factory,
            config,
            colors,
            typography,
        })
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Build a complete document. Modules stack top to bottom in input
    /// order; the artboard grows past its configured height if they do not
    /// fit.
    pub fn assemble(&mut self, modules: &[ModuleSpec]) -> Result<Document> {
        let mut sections = Vec::with_capacity(modules.len());
        let mut cursor = 0.0;
        for (index, spec) in modules.iter().enumerate() {
            let group = self.build_module(index, spec, cursor)?;
            cursor += group.base.frame.height;
            sections.push(Layer::from(group));
        }

        let height = self.config.height.max(cursor);
        let mut artboard = self.factory.new_artboard(
            self.config.artboard_name.clone(),
            self.config.width,
            height,
            self.colors.background,
        )?;
        for section in sections {
            artboard.push_layer(section);
        }

        let page = self
            .factory
            .new_page(self.config.page_name.clone(), vec![artboard.into()])?;
        let document = self.factory.new_document(vec![page])?;
        tracing::debug!(
            "Assembled {} modules onto a {}x{} artboard",
            modules.len(),
            self.config.width,
            height
        );
        Ok(document)
    }

    fn build_module(&mut self, index: usize, spec: &ModuleSpec, cursor: f64) -> Result<Group> {
        let height = spec
            .height
            .filter(|h| *h > 0.0 && (cursor + h).is_finite())
            .unwrap_or_else(|| default_height(spec));
        let width = self.config.width;
        let frame = Rect::new(0.0, cursor, width, height)?;

        let mut ctx = ModuleContext {
            factory: &mut self.factory,
            colors: &self.colors,
            typography: &self.typography,
            width,
            height,
            padding: self.config.padding,
        };

        let section_style = StyleSpec::fill(self.colors.surface);
        let section = ctx
            .factory
            .new_rectangle(Rect::from_size(width, height)?, &section_style, SECTION_LAYER_NAME)?;

        let content = match lookup::<R>(&spec.kind) {
            Some(build) => {
                tracing::debug!("Building {} module at y={}", spec.kind, cursor);
                match build(&mut ctx, spec) {
                    Ok(layers) => layers,
                    Err(e) => {
                        tracing::warn!("{} module failed, using placeholder: {}", spec.kind, e);
                        placeholder(&mut ctx, spec)?
                    }
                }
            }
            None => {
                tracing::warn!("Unknown module type {:?}, using placeholder", spec.kind);
                placeholder(&mut ctx, spec)?
            }
        };

        let mut layers = Vec::with_capacity(content.len() + 1);
        layers.push(section.into());
        layers.extend(content);
        Ok(self.factory.new_group(module_name(index, spec), frame, layers)?)
    }
}

fn module_name(index: usize, spec: &ModuleSpec) -> String {
    match spec.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None if spec.kind.is_empty() => format!("Module {}", index + 1),
        None => spec.kind.clone(),
    }
}

/// Assemble with a fresh entropy-seeded factory
pub fn assemble(
    modules: &[ModuleSpec],
    config: &AssemblyConfig,
    palette: &Palette,
    typography: &Typography,
) -> Result<Document> {
    Assembler::new(config.clone(), palette, typography.clone())?.assemble(modules)
}
