// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generator configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::topology::VpcLayout;

/// Path the deployment pipeline picks the template up from
pub const DEFAULT_OUTPUT_PATH: &str = "../../ansible/roles/vpc/files/vpc.json";

/// Environment variable overriding [`DEFAULT_OUTPUT_PATH`]
pub const OUTPUT_PATH_ENV: &str = "VPC_TEMPLATE_OUTPUT";

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Where the rendered template is written
    pub output_path: PathBuf,

    /// Network layout to render
    #[serde(default)]
    pub layout: VpcLayout,
}

impl GeneratorConfig {
    /// Create a configuration writing `layout` to `output_path`
    pub fn new(output_path: impl Into<PathBuf>, layout: VpcLayout) -> Self {
        Self {
            output_path: output_path.into(),
            layout,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Only the output path is configurable; the layout is always the default.
    pub fn from_env() -> Self {
        Self::from_output_override(std::env::var(OUTPUT_PATH_ENV).ok())
    }

    /// Configuration for an optional output path override
    ///
    /// A missing or blank override keeps [`DEFAULT_OUTPUT_PATH`].
    pub fn from_output_override(output_path: Option<String>) -> Self {
        let output_path = output_path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        Self::new(output_path, VpcLayout::default())
    }

    /// Replace the output path
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH, VpcLayout::default())
    }
}
