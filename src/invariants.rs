// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Template Invariants
//!
//! Structural well-formedness rules a template must satisfy before it is
//! handed to the provisioning tool. All functions are pure and return the
//! first violation found, in logical id order.
//!
//! # Invariant Categories
//!
//! 1. **References**: every `Ref` and `DependsOn` names a declared record
//! 2. **Reference kinds**: a `VpcId` points at a VPC, a `RouteTableId` at a route table, ...
//! 3. **Addressing**: subnet blocks sit inside their VPC and never overlap
//! 4. **Associations**: each binds exactly one subnet to one table or ACL

use crate::domain::{Ipv4Cidr, ResourceType};
use crate::template::resources::{ResourceProperties, Subnet};
use crate::template::{Expr, Template};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `Ref` or `DependsOn` target not declared anywhere in the template
    #[error("{resource} references undeclared id {target}")]
    DanglingReference { resource: String, target: String },

    /// Field expected to be a plain `Ref`
    #[error("{resource}.{field} must be a Ref to a {expected}")]
    NotAReference {
        resource: String,
        field: &'static str,
        expected: ResourceType,
    },

    /// `Ref` resolves, but to the wrong kind of record
    #[error("{resource}.{field} references {target}, expected a {expected}")]
    WrongReferenceKind {
        resource: String,
        field: &'static str,
        target: String,
        expected: ResourceType,
    },

    /// Subnet block not inside the VPC block
    #[error("Subnet {subnet} block {cidr} is outside VPC block {vpc_cidr}")]
    SubnetOutsideVpc {
        subnet: String,
        cidr: Ipv4Cidr,
        vpc_cidr: Ipv4Cidr,
    },

    /// Two subnets of the same VPC share addresses
    #[error("Subnets {first} ({first_cidr}) and {second} ({second_cidr}) overlap")]
    OverlappingSubnets {
        first: String,
        first_cidr: Ipv4Cidr,
        second: String,
        second_cidr: Ipv4Cidr,
    },

    /// Subnet bound to more than one table or ACL of the same kind
    #[error("Subnet {subnet} has more than one {kind}")]
    DuplicateAssociation { subnet: String, kind: ResourceType },
}

/// Run every template check
pub fn validate_template(template: &Template) -> ValidationResult {
    validate_references(template)?;
    validate_reference_kinds(template)?;
    validate_associations(template)?;
    validate_subnet_cidrs(template)?;
    Ok(())
}

/// Every `Ref` target and `DependsOn` names a parameter, resource, or pseudo parameter
pub fn validate_references(template: &Template) -> ValidationResult {
    for (id, resource) in template.resources() {
        let refs = resource
            .properties()
            .expressions()
            .into_iter()
            .flat_map(Expr::references)
            .chain(resource.dependency());

        for target in refs {
            if !template.resolves(target) {
                return Err(ValidationError::DanglingReference {
                    resource: id.to_string(),
                    target: target.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Resolve `expr` as a `Ref` to a resource of `expected` kind
fn expect_ref<'t>(
    template: &'t Template,
    resource: &str,
    field: &'static str,
    expr: &'t Expr,
    expected: ResourceType,
) -> Result<&'t str, ValidationError> {
    let target = expr.ref_target().ok_or_else(|| ValidationError::NotAReference {
        resource: resource.to_string(),
        field,
        expected,
    })?;

    match template.resource(target) {
        Some(r) if r.kind() == expected => Ok(target),
        Some(_) => Err(ValidationError::WrongReferenceKind {
            resource: resource.to_string(),
            field,
            target: target.to_string(),
            expected,
        }),
        None => Err(ValidationError::DanglingReference {
            resource: resource.to_string(),
            target: target.to_string(),
        }),
    }
}

/// Id fields of routes, attachments, tables, subnets and ACLs point at the right kinds
pub fn validate_reference_kinds(template: &Template) -> ValidationResult {
    use ResourceProperties as P;
    use ResourceType as T;

    for (id, resource) in template.resources() {
        match resource.properties() {
            P::VpcGatewayAttachment(p) => {
                expect_ref(
                    template,
                    id,
                    "InternetGatewayId",
                    &p.internet_gateway_id,
                    T::InternetGateway,
                )?;
                expect_ref(template, id, "VpcId", &p.vpc_id, T::Vpc)?;
            }
            P::Route(p) => {
                expect_ref(template, id, "GatewayId", &p.gateway_id, T::InternetGateway)?;
                expect_ref(
                    template,
                    id,
                    "RouteTableId",
                    &p.route_table_id,
                    T::RouteTable,
                )?;
            }
            P::RouteTable(p) => {
                expect_ref(template, id, "VpcId", &p.vpc_id, T::Vpc)?;
            }
            P::Subnet(p) => {
                expect_ref(template, id, "VpcId", &p.vpc_id, T::Vpc)?;
            }
            P::NetworkAcl(p) => {
                expect_ref(template, id, "VpcId", &p.vpc_id, T::Vpc)?;
            }
            P::NetworkAclEntry(p) => {
                expect_ref(
                    template,
                    id,
                    "NetworkAclId",
                    &p.network_acl_id,
                    T::NetworkAcl,
                )?;
            }
            P::Vpc(_)
            | P::InternetGateway(_)
            | P::SubnetRouteTableAssociation(_)
            | P::SubnetNetworkAclAssociation(_) => {}
        }
    }
    Ok(())
}

/// Each association binds one subnet to one route table or ACL, and no
/// subnet is bound twice to the same kind of target
pub fn validate_associations(template: &Template) -> ValidationResult {
    use std::collections::BTreeSet;
    use ResourceProperties as P;
    use ResourceType as T;

    let mut routed = BTreeSet::new();
    let mut filtered = BTreeSet::new();

    let associations = template
        .resources()
        .filter(|(_, resource)| resource.kind().is_association());

    for (id, resource) in associations {
        let (subnet, seen, kind) = match resource.properties() {
            P::SubnetRouteTableAssociation(p) => {
                expect_ref(
                    template,
                    id,
                    "RouteTableId",
                    &p.route_table_id,
                    T::RouteTable,
                )?;
                let subnet = expect_ref(template, id, "SubnetId", &p.subnet_id, T::Subnet)?;
                (subnet, &mut routed, T::RouteTable)
            }
            P::SubnetNetworkAclAssociation(p) => {
                expect_ref(
                    template,
                    id,
                    "NetworkAclId",
                    &p.network_acl_id,
                    T::NetworkAcl,
                )?;
                let subnet = expect_ref(template, id, "SubnetId", &p.subnet_id, T::Subnet)?;
                (subnet, &mut filtered, T::NetworkAcl)
            }
            _ => continue,
        };

        if !seen.insert(subnet) {
            return Err(ValidationError::DuplicateAssociation {
                subnet: subnet.to_string(),
                kind,
            });
        }
    }
    Ok(())
}

/// Subnet blocks lie inside their VPC block and are pairwise disjoint within a VPC
pub fn validate_subnet_cidrs(template: &Template) -> ValidationResult {
    let subnets: Vec<(&str, &Subnet)> = template
        .resources_of(ResourceType::Subnet)
        .filter_map(|(id, r)| match r.properties() {
            ResourceProperties::Subnet(s) => Some((id, s)),
            _ => None,
        })
        .collect();

    let mut placed: Vec<(&str, &str, Ipv4Cidr)> = Vec::with_capacity(subnets.len());
    for (id, subnet) in subnets {
        let vpc_id = expect_ref(template, id, "VpcId", &subnet.vpc_id, ResourceType::Vpc)?;
        let vpc = template.resource(vpc_id).map(|r| r.properties());
        if let Some(ResourceProperties::Vpc(vpc)) = vpc {
            if !vpc.cidr_block.contains(&subnet.cidr_block) {
                return Err(ValidationError::SubnetOutsideVpc {
                    subnet: id.to_string(),
                    cidr: subnet.cidr_block,
                    vpc_cidr: vpc.cidr_block,
                });
            }
        }

        let clash = placed
            .iter()
            .find(|(other_vpc, _, cidr)| *other_vpc == vpc_id && cidr.overlaps(&subnet.cidr_block));
        if let Some((_, other, other_cidr)) = clash {
            return Err(ValidationError::OverlappingSubnets {
                first: other.to_string(),
                first_cidr: *other_cidr,
                second: id.to_string(),
                second_cidr: subnet.cidr_block,
            });
        }
        placed.push((vpc_id, id, subnet.cidr_block));
    }
    Ok(())
}
