use thiserror::Error;

use crate::engine::config::config_loader::CONFIG_PATH;
use crate::engine::core::session::session_seed;
use crate::page::document::PageDocument;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no page document was provided")]
    MissingDocument,
}

/// Everything the app needs from its surroundings, built once in `main`.
pub struct VisualsContext {
    pub document: Box<dyn PageDocument>,
    /// Canvas the scene renders into; `None` disables the scene.
    pub canvas_selector: Option<String>,
    /// Asset path of the config file; `None` keeps the compiled defaults.
    pub config_path: Option<String>,
    pub seed: u64,
}

impl VisualsContext {
    pub fn builder() -> VisualsContextBuilder {
        VisualsContextBuilder::default()
    }

    pub fn scene_enabled(&self) -> bool {
        self.canvas_selector.is_some()
    }
}

#[derive(Default)]
pub struct VisualsContextBuilder {
    document: Option<Box<dyn PageDocument>>,
    canvas_selector: Option<String>,
    skip_config_file: bool,
    seed: Option<u64>,
}

impl VisualsContextBuilder {
    pub fn document(mut self, document: impl PageDocument + 'static) -> Self {
        self.document = Some(Box::new(document));
        self
    }

    pub fn canvas(mut self, selector: impl Into<String>) -> Self {
        self.canvas_selector = Some(selector.into());
        self
    }

    pub fn skip_config_file(mut self) -> Self {
        self.skip_config_file = true;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<VisualsContext, ContextError> {
        let document = self.document.ok_or(ContextError::MissingDocument)?;
        Ok(VisualsContext {
            document,
            canvas_selector: self.canvas_selector,
            config_path: (!self.skip_config_file).then(|| CONFIG_PATH.to_string()),
            seed: self.seed.unwrap_or_else(session_seed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::headless::HeadlessDocument;

    #[test]
    fn building_without_a_document_fails() {
        let result = VisualsContext::builder().canvas("#hero-canvas").build();
        assert!(matches!(result, Err(ContextError::MissingDocument)));
    }

    #[test]
    fn canvas_enables_the_scene() {
        let context = VisualsContext::builder()
            .document(HeadlessDocument::default())
            .seed(9)
            .build()
            .unwrap();
        assert!(!context.scene_enabled());
        assert_eq!(context.seed, 9);
        assert_eq!(context.config_path.as_deref(), Some(CONFIG_PATH));

        let context = VisualsContext::builder()
            .document(HeadlessDocument::default())
            .canvas("#hero-canvas")
            .skip_config_file()
            .build()
            .unwrap();
        assert!(context.scene_enabled());
        assert!(context.config_path.is_none());
    }
}
