use std::path::Path;

use tracing::debug;

use crate::constants::TEMPLATE_INIT_KEY;
use crate::constants::TEMPLATE_INPUTS_KEY;
use crate::constants::TEMPLATE_OUTPUTS_KEY;
use crate::TemplateError;

/// Static collector configuration template.
///
/// `init` and `outputs` are emitted once per artifact; `inputs` is emitted
/// once per instance with its placeholder tokens replaced. Loaded once and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTemplate {
    init: String,
    outputs: String,
    inputs: String,
}

impl ConfigTemplate {
    pub fn new(
        init: impl Into<String>,
        outputs: impl Into<String>,
        inputs: impl Into<String>,
    ) -> std::result::Result<Self, TemplateError> {
        let template = Self {
            init: init.into(),
            outputs: outputs.into(),
            inputs: inputs.into(),
        };
        if template.inputs.trim().is_empty() {
            return Err(TemplateError::EmptySection(TEMPLATE_INPUTS_KEY));
        }
        Ok(template)
    }

    /// Loads the three sections from a mounted config map directory, one file per key.
    pub fn load_from_dir(dir: &Path) -> std::result::Result<Self, TemplateError> {
        let read_section = |section: &'static str| {
            let path = dir.join(section);
            debug!("loading template section {:?}", path);
            std::fs::read_to_string(&path).map_err(|e| TemplateError::MissingSection {
                section,
                path,
                source: e,
            })
        };

        Self::new(
            read_section(TEMPLATE_INIT_KEY)?,
            read_section(TEMPLATE_OUTPUTS_KEY)?,
            read_section(TEMPLATE_INPUTS_KEY)?,
        )
    }

    pub fn init(&self) -> &str {
        &self.init
    }

    pub fn outputs(&self) -> &str {
        &self.outputs
    }

    pub fn inputs(&self) -> &str {
        &self.inputs
    }
}
