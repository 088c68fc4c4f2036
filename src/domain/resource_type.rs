// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Resource Type Taxonomy
//!
//! The set of EC2 resource kinds a VPC template can declare, with their
//! CloudFormation type names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EC2 resource kinds emitted into a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Isolated virtual network
    #[serde(rename = "AWS::EC2::VPC")]
    Vpc,
    /// Gateway to the public internet
    #[serde(rename = "AWS::EC2::InternetGateway")]
    InternetGateway,
    /// Binding of an internet gateway to a VPC
    #[serde(rename = "AWS::EC2::VPCGatewayAttachment")]
    VpcGatewayAttachment,
    /// Route table
    #[serde(rename = "AWS::EC2::RouteTable")]
    RouteTable,
    /// Single route inside a route table
    #[serde(rename = "AWS::EC2::Route")]
    Route,
    /// Subnet in one availability zone
    #[serde(rename = "AWS::EC2::Subnet")]
    Subnet,
    /// Subnet to route table binding
    #[serde(rename = "AWS::EC2::SubnetRouteTableAssociation")]
    SubnetRouteTableAssociation,
    /// Stateless packet filter
    #[serde(rename = "AWS::EC2::NetworkAcl")]
    NetworkAcl,
    /// Single rule of a network ACL
    #[serde(rename = "AWS::EC2::NetworkAclEntry")]
    NetworkAclEntry,
    /// Subnet to network ACL binding
    #[serde(rename = "AWS::EC2::SubnetNetworkAclAssociation")]
    SubnetNetworkAclAssociation,
}

impl ResourceType {
    /// CloudFormation type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::VpcGatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::Route => "AWS::EC2::Route",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            Self::NetworkAcl => "AWS::EC2::NetworkAcl",
            Self::NetworkAclEntry => "AWS::EC2::NetworkAclEntry",
            Self::SubnetNetworkAclAssociation => "AWS::EC2::SubnetNetworkAclAssociation",
        }
    }

    /// Association records bind exactly one subnet to one target
    pub fn is_association(&self) -> bool {
        matches!(
            self,
            Self::SubnetRouteTableAssociation | Self::SubnetNetworkAclAssociation
        )
    }

    /// All resource kinds
    pub fn all() -> &'static [ResourceType] {
        &[
            Self::Vpc,
            Self::InternetGateway,
            Self::VpcGatewayAttachment,
            Self::RouteTable,
            Self::Route,
            Self::Subnet,
            Self::SubnetRouteTableAssociation,
            Self::NetworkAcl,
            Self::NetworkAclEntry,
            Self::SubnetNetworkAclAssociation,
        ]
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for kind in ResourceType::all() {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_association_kinds() {
        let associations: Vec<_> = ResourceType::all()
            .iter()
            .filter(|k| k.is_association())
            .collect();
        assert_eq!(associations.len(), 2);
        assert!(!ResourceType::Route.is_association());
    }
}
