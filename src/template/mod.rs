// Copyright (c) 2025 - Cowboy AI, Inc.
//! Infrastructure Template Document
//!
//! A [`Template`] collects parameters and resources keyed by logical id and
//! renders them as a CloudFormation JSON document. Rendering is
//! deterministic: map keys are emitted in sorted order with a fixed
//! indentation, so the same inputs always produce the same bytes.

pub mod intrinsic;
pub mod resources;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::ResourceType;
use crate::errors::{TemplateError, TemplateResult};

pub use intrinsic::{is_pseudo_parameter, Expr, PSEUDO_REGION, PSEUDO_STACK_NAME};
pub use resources::ResourceProperties;

/// Indentation used for rendered templates
const JSON_INDENT: &[u8] = b"    ";

/// Template parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    String,
}

/// Input parameter supplied at deploy time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Type")]
    pub parameter_type: ParameterType,
}

impl Parameter {
    /// String-typed parameter without default
    pub fn string() -> Self {
        Self {
            default: None,
            description: None,
            parameter_type: ParameterType::String,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Declared resource: typed properties plus resource-level attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    properties: ResourceProperties,
    depends_on: Option<String>,
}

impl Resource {
    fn new(properties: ResourceProperties) -> Self {
        Self {
            properties,
            depends_on: None,
        }
    }

    /// Require `logical_id` to be created before this resource
    pub fn depends_on(&mut self, logical_id: impl Into<String>) -> &mut Self {
        self.depends_on = Some(logical_id.into());
        self
    }

    pub fn kind(&self) -> ResourceType {
        self.properties.kind()
    }

    pub fn properties(&self) -> &ResourceProperties {
        &self.properties
    }

    pub fn dependency(&self) -> Option<&str> {
        self.depends_on.as_deref()
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.depends_on.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(dependency) = &self.depends_on {
            map.serialize_entry("DependsOn", dependency)?;
        }
        map.serialize_entry("Properties", &self.properties)?;
        map.serialize_entry("Type", &self.kind())?;
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawResource {
    #[serde(rename = "Type")]
    kind: ResourceType,
    properties: serde_json::Value,
    #[serde(default)]
    depends_on: Option<String>,
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawResource::deserialize(deserializer)?;
        let properties = ResourceProperties::from_value(raw.kind, raw.properties)
            .map_err(serde::de::Error::custom)?;
        Ok(Self {
            properties,
            depends_on: raw.depends_on,
        })
    }
}

/// CloudFormation template document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, Parameter>,

    #[serde(default)]
    resources: BTreeMap<String, Resource>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declare a parameter
    ///
    /// # Errors
    /// - [`TemplateError::DuplicateLogicalId`] if `id` is already a parameter or resource
    pub fn add_parameter(
        &mut self,
        id: impl Into<String>,
        parameter: Parameter,
    ) -> TemplateResult<&mut Parameter> {
        let id = id.into();
        if self.resources.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        match self.parameters.entry(id) {
            Entry::Occupied(entry) => Err(TemplateError::DuplicateLogicalId(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(parameter = %entry.key(), "declared parameter");
                Ok(entry.insert(parameter))
            }
        }
    }

    /// Declare a resource under `id`
    ///
    /// Returns the stored resource so resource-level attributes such as
    /// `DependsOn` can be attached.
    ///
    /// # Errors
    /// - [`TemplateError::DuplicateLogicalId`] if `id` is already a parameter or resource
    pub fn add_resource(
        &mut self,
        id: impl Into<String>,
        properties: impl Into<ResourceProperties>,
    ) -> TemplateResult<&mut Resource> {
        let id = id.into();
        if self.parameters.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        match self.resources.entry(id) {
            Entry::Occupied(entry) => Err(TemplateError::DuplicateLogicalId(entry.key().clone())),
            Entry::Vacant(entry) => {
                let resource = Resource::new(properties.into());
                debug!(resource = %entry.key(), kind = %resource.kind(), "declared resource");
                Ok(entry.insert(resource))
            }
        }
    }

    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.get(id)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.parameters.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Resources in logical id order
    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Resources of one kind, in logical id order
    pub fn resources_of(&self, kind: ResourceType) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources().filter(move |(_, r)| r.kind() == kind)
    }

    pub fn count_of(&self, kind: ResourceType) -> usize {
        self.resources_of(kind).count()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Whether `id` names something a `Ref` can resolve to
    pub fn resolves(&self, id: &str) -> bool {
        is_pseudo_parameter(id)
            || self.parameters.contains_key(id)
            || self.resources.contains_key(id)
    }

    /// Template as a JSON value
    pub fn to_value(&self) -> TemplateResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Render the template as indented JSON with sorted keys
    pub fn to_json(&self) -> TemplateResult<String> {
        // Value objects are BTreeMap-backed, so this pass sorts every key.
        let value = self.to_value()?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;

        String::from_utf8(buf).map_err(|e| TemplateError::Serialization(e.to_string()))
    }

    /// Parse a rendered template back into typed records
    pub fn from_json(json: &str) -> TemplateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Write the rendered template to `path`, creating parent directories
///
/// The file is written once; any I/O failure is returned as
/// [`TemplateError::Io`] without retry.
pub fn write_template(template: &Template, path: impl AsRef<Path>) -> TemplateResult<()> {
    let path = path.as_ref();
    let json = template.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;

    info!(
        path = %path.display(),
        resources = template.len(),
        bytes = json.len(),
        "wrote template"
    );
    Ok(())
}
