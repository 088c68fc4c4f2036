// Copyright (c) 2025 - Cowboy AI, Inc.
//! EC2 Resource Property Records
//!
//! One record per resource kind, mirroring the provider schema field for
//! field. Records are plain data: references to other resources are
//! [`Expr::Ref`] values resolved by the provisioning tool.

use serde::{Deserialize, Serialize};

use super::intrinsic::Expr;
use crate::domain::{Ipv4Cidr, ResourceType};

/// Single `Key`/`Value` tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: Expr,
}

/// Resource tag list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Tag>);

impl Tags {
    /// Tag list holding only a `Name` tag
    pub fn name(value: impl Into<Expr>) -> Self {
        Self::default().with("Name", value)
    }

    /// Append a tag
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.0.push(Tag {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Value of the first tag with `key`
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.0.iter().find(|t| t.key == key).map(|t| &t.value)
    }
}

/// VPC instance tenancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceTenancy {
    #[default]
    Default,
    Dedicated,
}

/// Network ACL rule action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
}

/// `AWS::EC2::VPC`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    pub cidr_block: Ipv4Cidr,
    pub instance_tenancy: InstanceTenancy,
    pub enable_dns_support: bool,
    pub enable_dns_hostnames: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// `AWS::EC2::InternetGateway`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternetGateway {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// `AWS::EC2::VPCGatewayAttachment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcGatewayAttachment {
    pub internet_gateway_id: Expr,
    pub vpc_id: Expr,
}

/// `AWS::EC2::RouteTable`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTable {
    pub vpc_id: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// `AWS::EC2::Route`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    pub destination_cidr_block: Ipv4Cidr,
    pub gateway_id: Expr,
    pub route_table_id: Expr,
}

/// `AWS::EC2::Subnet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    pub availability_zone: Expr,
    pub cidr_block: Ipv4Cidr,
    pub map_public_ip_on_launch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    pub vpc_id: Expr,
}

/// `AWS::EC2::SubnetRouteTableAssociation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRouteTableAssociation {
    pub route_table_id: Expr,
    pub subnet_id: Expr,
}

/// `AWS::EC2::NetworkAcl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAcl {
    pub vpc_id: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// `AWS::EC2::SubnetNetworkAclAssociation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetNetworkAclAssociation {
    pub subnet_id: Expr,
    pub network_acl_id: Expr,
}

/// `AWS::EC2::NetworkAclEntry`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAclEntry {
    pub cidr_block: Ipv4Cidr,
    pub egress: bool,
    pub network_acl_id: Expr,
    /// IP protocol number, `-1` for all protocols
    pub protocol: i32,
    pub rule_action: RuleAction,
    pub rule_number: u16,
}

impl NetworkAclEntry {
    /// Protocol code matching every IP protocol
    pub const ALL_PROTOCOLS: i32 = -1;
}

/// Properties of any resource the generator can declare
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceProperties {
    Vpc(Vpc),
    InternetGateway(InternetGateway),
    VpcGatewayAttachment(VpcGatewayAttachment),
    RouteTable(RouteTable),
    Route(Route),
    Subnet(Subnet),
    SubnetRouteTableAssociation(SubnetRouteTableAssociation),
    NetworkAcl(NetworkAcl),
    NetworkAclEntry(NetworkAclEntry),
    SubnetNetworkAclAssociation(SubnetNetworkAclAssociation),
}

impl ResourceProperties {
    /// Resource kind these properties belong to
    pub fn kind(&self) -> ResourceType {
        match self {
            Self::Vpc(_) => ResourceType::Vpc,
            Self::InternetGateway(_) => ResourceType::InternetGateway,
            Self::VpcGatewayAttachment(_) => ResourceType::VpcGatewayAttachment,
            Self::RouteTable(_) => ResourceType::RouteTable,
            Self::Route(_) => ResourceType::Route,
            Self::Subnet(_) => ResourceType::Subnet,
            Self::SubnetRouteTableAssociation(_) => ResourceType::SubnetRouteTableAssociation,
            Self::NetworkAcl(_) => ResourceType::NetworkAcl,
            Self::NetworkAclEntry(_) => ResourceType::NetworkAclEntry,
            Self::SubnetNetworkAclAssociation(_) => ResourceType::SubnetNetworkAclAssociation,
        }
    }

    /// Decode the `Properties` object of a resource of `kind`
    pub fn from_value(kind: ResourceType, value: serde_json::Value) -> serde_json::Result<Self> {
        use serde_json::from_value;

        Ok(match kind {
            ResourceType::Vpc => Self::Vpc(from_value(value)?),
            ResourceType::InternetGateway => Self::InternetGateway(from_value(value)?),
            ResourceType::VpcGatewayAttachment => Self::VpcGatewayAttachment(from_value(value)?),
            ResourceType::RouteTable => Self::RouteTable(from_value(value)?),
            ResourceType::Route => Self::Route(from_value(value)?),
            ResourceType::Subnet => Self::Subnet(from_value(value)?),
            ResourceType::SubnetRouteTableAssociation => {
                Self::SubnetRouteTableAssociation(from_value(value)?)
            }
            ResourceType::NetworkAcl => Self::NetworkAcl(from_value(value)?),
            ResourceType::NetworkAclEntry => Self::NetworkAclEntry(from_value(value)?),
            ResourceType::SubnetNetworkAclAssociation => {
                Self::SubnetNetworkAclAssociation(from_value(value)?)
            }
        })
    }

    /// Every expression-valued field, tags included
    pub fn expressions(&self) -> Vec<&Expr> {
        fn tagged(tags: &Option<Tags>) -> impl Iterator<Item = &Expr> {
            tags.iter().flat_map(|t| t.iter().map(|tag| &tag.value))
        }

        match self {
            Self::Vpc(p) => tagged(&p.tags).collect(),
            Self::InternetGateway(p) => tagged(&p.tags).collect(),
            Self::VpcGatewayAttachment(p) => vec![&p.internet_gateway_id, &p.vpc_id],
            Self::RouteTable(p) => std::iter::once(&p.vpc_id).chain(tagged(&p.tags)).collect(),
            Self::Route(p) => vec![&p.gateway_id, &p.route_table_id],
            Self::Subnet(p) => [&p.availability_zone, &p.vpc_id]
                .into_iter()
                .chain(tagged(&p.tags))
                .collect(),
            Self::SubnetRouteTableAssociation(p) => vec![&p.route_table_id, &p.subnet_id],
            Self::NetworkAcl(p) => std::iter::once(&p.vpc_id).chain(tagged(&p.tags)).collect(),
            Self::NetworkAclEntry(p) => vec![&p.network_acl_id],
            Self::SubnetNetworkAclAssociation(p) => vec![&p.subnet_id, &p.network_acl_id],
        }
    }
}

macro_rules! impl_into_properties {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ResourceProperties {
                fn from(props: $variant) -> Self {
                    Self::$variant(props)
                }
            }
        )*
    };
}

impl_into_properties!(
    Vpc,
    InternetGateway,
    VpcGatewayAttachment,
    RouteTable,
    Route,
    Subnet,
    SubnetRouteTableAssociation,
    NetworkAcl,
    NetworkAclEntry,
    SubnetNetworkAclAssociation,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tags_render_as_key_value_list() {
        let tags = Tags::name(Expr::stack_name()).with("Team", "network");
        assert_eq!(
            serde_json::to_value(&tags).unwrap(),
            json!([
                { "Key": "Name", "Value": { "Ref": "AWS::StackName" } },
                { "Key": "Team", "Value": "network" }
            ])
        );
        assert_eq!(tags.get("Team"), Some(&Expr::from("network")));
        assert_eq!(tags.get("Owner"), None);
    }

    #[test]
    fn test_acl_entry_field_names() {
        let entry = NetworkAclEntry {
            cidr_block: "172.21.0.0/16".parse().unwrap(),
            egress: false,
            network_acl_id: Expr::reference("PrivateNetworkAcl"),
            protocol: NetworkAclEntry::ALL_PROTOCOLS,
            rule_action: RuleAction::Allow,
            rule_number: 200,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "CidrBlock": "172.21.0.0/16",
                "Egress": false,
                "NetworkAclId": { "Ref": "PrivateNetworkAcl" },
                "Protocol": -1,
                "RuleAction": "allow",
                "RuleNumber": 200
            })
        );
    }

    #[test]
    fn test_properties_decode_by_kind() {
        let value = json!({ "VpcId": { "Ref": "VPC" } });
        let props =
            ResourceProperties::from_value(ResourceType::RouteTable, value.clone()).unwrap();
        assert_eq!(props.kind(), ResourceType::RouteTable);
        assert!(ResourceProperties::from_value(ResourceType::Route, value).is_err());
    }

    #[test]
    fn test_expressions_include_tags() {
        let subnet: ResourceProperties = Subnet {
            availability_zone: Expr::join("", [Expr::region(), "a".into()]),
            cidr_block: "10.0.1.0/24".parse().unwrap(),
            map_public_ip_on_launch: false,
            tags: Some(Tags::name(Expr::stack_name())),
            vpc_id: Expr::reference("VPC"),
        }
        .into();

        let refs: Vec<&str> = subnet
            .expressions()
            .into_iter()
            .flat_map(Expr::references)
            .collect();
        assert_eq!(refs, vec!["AWS::Region", "VPC", "AWS::StackName"]);
    }
}
