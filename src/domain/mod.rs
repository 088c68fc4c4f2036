// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Domain Models
//!
//! Value objects with validation invariants used to describe a VPC topology.
//!
//! - [`Ipv4Cidr`] - IPv4 block in prefix notation, with containment and overlap
//! - [`ResourceType`] - EC2 resource taxonomy

pub mod network;
pub mod resource_type;

pub use network::{Ipv4Cidr, NetworkError};
pub use resource_type::ResourceType;
