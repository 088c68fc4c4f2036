// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC Stack Topology
//!
//! Builds the network stack: one VPC with an internet gateway, a public and
//! a private route table, one private and one public subnet per availability
//! zone, and a network ACL that confines private subnets to the VPC block.
//!
//! Construction is a single linear pass over a [`VpcLayout`]; every record is
//! declared once and never touched again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use tracing::info;

use crate::domain::Ipv4Cidr;
use crate::errors::{TemplateError, TemplateResult};
use crate::invariants::validate_template;
use crate::template::resources::{
    InstanceTenancy, InternetGateway, NetworkAcl, NetworkAclEntry, Route, RouteTable, RuleAction,
    Subnet, SubnetNetworkAclAssociation, SubnetRouteTableAssociation, Tags, Vpc,
    VpcGatewayAttachment,
};
use crate::template::{Expr, Parameter, Template};

pub const STACK_NAME_PARAMETER: &str = "stackname";
pub const TEMPLATE_DESCRIPTION: &str = "Stack creating a VPC";

pub const VPC_ID: &str = "VPC";
pub const INTERNET_GATEWAY_ID: &str = "InternetGateway";
pub const GATEWAY_ATTACHMENT_ID: &str = "InternetGatewayAttachment";
pub const PUBLIC_ROUTE_TABLE_ID: &str = "PublicRouteTable";
pub const PRIVATE_ROUTE_TABLE_ID: &str = "PrivateRouteTable";
pub const INTERNET_ROUTE_ID: &str = "RouteToInternet";
pub const PRIVATE_NETWORK_ACL_ID: &str = "PrivateNetworkAcl";
pub const ACL_INGRESS_ID: &str = "PrivateNetworkAclEntryIngress";
pub const ACL_EGRESS_ID: &str = "PrivateNetworkAclEntryEgress";

/// Highest rule number a network ACL entry may carry
pub const MAX_RULE_NUMBER: u16 = 32766;

/// Default route to the internet
const ANY_IPV4: Ipv4Cidr = Ipv4Cidr::from_network(Ipv4Addr::UNSPECIFIED, 0);

/// Subnet exposure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubnetTier {
    Private,
    Public,
}

impl SubnetTier {
    fn label(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Public => "Public",
        }
    }

    fn route_table_id(&self) -> &'static str {
        match self {
            Self::Private => PRIVATE_ROUTE_TABLE_ID,
            Self::Public => PUBLIC_ROUTE_TABLE_ID,
        }
    }
}

/// Subnet blocks for one availability zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneLayout {
    /// Zone suffix appended to the region, e.g. `a` in `eu-west-1a`
    pub suffix: char,
    pub private_subnet: Ipv4Cidr,
    pub public_subnet: Ipv4Cidr,
}

impl ZoneLayout {
    pub fn new(suffix: char, private_subnet: Ipv4Cidr, public_subnet: Ipv4Cidr) -> Self {
        Self {
            suffix,
            private_subnet,
            public_subnet,
        }
    }

    fn subnet(&self, tier: SubnetTier) -> Ipv4Cidr {
        match tier {
            SubnetTier::Private => self.private_subnet,
            SubnetTier::Public => self.public_subnet,
        }
    }

    fn letter(&self) -> char {
        self.suffix.to_ascii_uppercase()
    }

    /// Logical id of the zone's subnet in `tier`
    pub fn subnet_id(&self, tier: SubnetTier) -> String {
        format!("Stack{}Subnet{}", tier.title(), self.letter())
    }

    /// Logical id of the subnet's route table association
    pub fn route_table_association_id(&self, tier: SubnetTier) -> String {
        format!("{}Subnet{}RouteTable", tier.title(), self.letter())
    }

    /// Logical id of the private subnet's ACL association
    pub fn acl_association_id(&self) -> String {
        format!("PrivateNetwork{}AclAss", self.letter())
    }
}

/// Literal parameters of the VPC stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcLayout {
    /// VPC block; also the scope of the private ACL entries
    pub network: Ipv4Cidr,
    pub zones: Vec<ZoneLayout>,
    pub acl_rule_number: u16,
}

impl Default for VpcLayout {
    /// 172.21.0.0/16 with private /24s at .1-.3 and public /24s at .128-.130 in zones a, b, c
    fn default() -> Self {
        let block = |third: u8| Ipv4Cidr::from_network(Ipv4Addr::new(172, 21, third, 0), 24);

        Self {
            network: Ipv4Cidr::from_network(Ipv4Addr::new(172, 21, 0, 0), 16),
            zones: vec![
                ZoneLayout::new('a', block(1), block(128)),
                ZoneLayout::new('b', block(2), block(129)),
                ZoneLayout::new('c', block(3), block(130)),
            ],
            acl_rule_number: 200,
        }
    }
}

impl VpcLayout {
    /// Reject malformed literal input before anything is built
    ///
    /// # Rules
    /// - At least one zone
    /// - Zone suffixes are unique lowercase ASCII letters
    /// - ACL rule number in 1..=32766
    pub fn validate(&self) -> TemplateResult<()> {
        if self.zones.is_empty() {
            return Err(TemplateError::InvalidLayout(
                "at least one availability zone is required".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for zone in &self.zones {
            if !zone.suffix.is_ascii_lowercase() {
                return Err(TemplateError::InvalidLayout(format!(
                    "zone suffix must be a lowercase letter: {:?}",
                    zone.suffix
                )));
            }
            if !seen.insert(zone.suffix) {
                return Err(TemplateError::InvalidLayout(format!(
                    "duplicate zone suffix: {}",
                    zone.suffix
                )));
            }
        }

        if !(1..=MAX_RULE_NUMBER).contains(&self.acl_rule_number) {
            return Err(TemplateError::InvalidLayout(format!(
                "ACL rule number {} outside 1..={}",
                self.acl_rule_number, MAX_RULE_NUMBER
            )));
        }

        Ok(())
    }
}

/// `Join(sep, [Ref(AWS::StackName), suffix])`
fn stack_scoped(separator: &str, suffix: &str) -> Tags {
    Tags::name(Expr::join(separator, [Expr::stack_name(), suffix.into()]))
}

fn declare_subnet(
    template: &mut Template,
    zone: &ZoneLayout,
    tier: SubnetTier,
) -> TemplateResult<()> {
    let subnet_id = zone.subnet_id(tier);

    template.add_resource(
        subnet_id.clone(),
        Subnet {
            availability_zone: Expr::join("", [Expr::region(), zone.suffix.to_string().into()]),
            cidr_block: zone.subnet(tier),
            map_public_ip_on_launch: tier == SubnetTier::Public,
            tags: Some(stack_scoped(
                "",
                &format!(" {} subnet {}", tier.label(), zone.letter()),
            )),
            vpc_id: Expr::reference(VPC_ID),
        },
    )?;

    template.add_resource(
        zone.route_table_association_id(tier),
        SubnetRouteTableAssociation {
            route_table_id: Expr::reference(tier.route_table_id()),
            subnet_id: Expr::reference(subnet_id),
        },
    )?;

    Ok(())
}

fn private_acl_entry(layout: &VpcLayout, egress: bool) -> NetworkAclEntry {
    NetworkAclEntry {
        cidr_block: layout.network,
        egress,
        network_acl_id: Expr::reference(PRIVATE_NETWORK_ACL_ID),
        protocol: NetworkAclEntry::ALL_PROTOCOLS,
        rule_action: RuleAction::Allow,
        rule_number: layout.acl_rule_number,
    }
}

/// Declare the whole VPC stack described by `layout`
///
/// The result is not validated; see [`render_vpc_template`].
///
/// # Errors
/// - [`TemplateError::InvalidLayout`] for malformed literal input
/// - [`TemplateError::DuplicateLogicalId`] if two records collide
pub fn build_vpc_template(layout: &VpcLayout) -> TemplateResult<Template> {
    layout.validate()?;

    let mut template = Template::new();

    template.add_parameter(
        STACK_NAME_PARAMETER,
        Parameter::string()
            .with_description("Environment Name (default: StackNameNotDefined)")
            .with_default("Dev"),
    )?;
    template.set_description(TEMPLATE_DESCRIPTION);

    template.add_resource(
        VPC_ID,
        Vpc {
            cidr_block: layout.network,
            instance_tenancy: InstanceTenancy::Default,
            enable_dns_support: true,
            enable_dns_hostnames: false,
            tags: Some(Tags::name(Expr::stack_name())),
        },
    )?;

    template.add_resource(
        INTERNET_GATEWAY_ID,
        InternetGateway {
            tags: Some(stack_scoped("", "-gateway")),
        },
    )?;

    template.add_resource(
        GATEWAY_ATTACHMENT_ID,
        VpcGatewayAttachment {
            internet_gateway_id: Expr::reference(INTERNET_GATEWAY_ID),
            vpc_id: Expr::reference(VPC_ID),
        },
    )?;

    template.add_resource(
        PUBLIC_ROUTE_TABLE_ID,
        RouteTable {
            vpc_id: Expr::reference(VPC_ID),
            tags: Some(stack_scoped("-", "public-rt")),
        },
    )?;

    template.add_resource(
        PRIVATE_ROUTE_TABLE_ID,
        RouteTable {
            vpc_id: Expr::reference(VPC_ID),
            tags: Some(stack_scoped("-", "private-rt")),
        },
    )?;

    // The route is only valid once the gateway is attached to the VPC.
    template
        .add_resource(
            INTERNET_ROUTE_ID,
            Route {
                destination_cidr_block: ANY_IPV4,
                gateway_id: Expr::reference(INTERNET_GATEWAY_ID),
                route_table_id: Expr::reference(PUBLIC_ROUTE_TABLE_ID),
            },
        )?
        .depends_on(GATEWAY_ATTACHMENT_ID);

    for tier in [SubnetTier::Private, SubnetTier::Public] {
        for zone in &layout.zones {
            declare_subnet(&mut template, zone, tier)?;
        }
    }

    template.add_resource(
        PRIVATE_NETWORK_ACL_ID,
        NetworkAcl {
            vpc_id: Expr::reference(VPC_ID),
            tags: Some(stack_scoped("", "-private-nacl")),
        },
    )?;

    for zone in &layout.zones {
        template.add_resource(
            zone.acl_association_id(),
            SubnetNetworkAclAssociation {
                subnet_id: Expr::reference(zone.subnet_id(SubnetTier::Private)),
                network_acl_id: Expr::reference(PRIVATE_NETWORK_ACL_ID),
            },
        )?;
    }

    template.add_resource(ACL_INGRESS_ID, private_acl_entry(layout, false))?;
    template.add_resource(ACL_EGRESS_ID, private_acl_entry(layout, true))?;

    info!(
        network = %layout.network,
        zones = layout.zones.len(),
        resources = template.len(),
        "built VPC template"
    );
    Ok(template)
}

/// Build, validate and render the VPC stack as JSON
pub fn render_vpc_template(layout: &VpcLayout) -> TemplateResult<String> {
    let template = build_vpc_template(layout)?;
    validate_template(&template)?;
    template.to_json()
}
