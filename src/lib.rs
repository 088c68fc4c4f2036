//! VPC network topology rendered as a CloudFormation template
//!
//! This crate declares a VPC stack (VPC, internet gateway, route tables,
//! subnets, network ACL and their associations) as typed records and
//! serializes it to a deterministic JSON template for an external
//! provisioning pipeline.

pub mod config;
pub mod domain;
pub mod errors;
pub mod invariants;
pub mod template;
pub mod topology;

// Re-export commonly used types
pub use config::GeneratorConfig;
pub use domain::{Ipv4Cidr, NetworkError, ResourceType};
pub use errors::{TemplateError, TemplateResult};
pub use invariants::{validate_template, ValidationError, ValidationResult};
pub use template::{write_template, Expr, Parameter, Template};
pub use topology::{build_vpc_template, render_vpc_template, VpcLayout, ZoneLayout};
