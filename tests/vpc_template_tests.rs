// Copyright (c) 2025 - Cowboy AI, Inc.
//! End-to-end tests for the default VPC stack

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use vpc_template::template::resources::{ResourceProperties, RuleAction};
use vpc_template::template::ParameterType;
use vpc_template::{
    build_vpc_template, render_vpc_template, validate_template, write_template, Expr,
    GeneratorConfig, Ipv4Cidr, ResourceType, Template, VpcLayout,
};

fn default_template() -> Template {
    build_vpc_template(&VpcLayout::default()).expect("default layout builds")
}

#[test_case(ResourceType::Vpc, 1)]
#[test_case(ResourceType::InternetGateway, 1)]
#[test_case(ResourceType::VpcGatewayAttachment, 1)]
#[test_case(ResourceType::RouteTable, 2)]
#[test_case(ResourceType::Route, 1)]
#[test_case(ResourceType::Subnet, 6)]
#[test_case(ResourceType::SubnetRouteTableAssociation, 6)]
#[test_case(ResourceType::NetworkAcl, 1)]
#[test_case(ResourceType::SubnetNetworkAclAssociation, 3)]
#[test_case(ResourceType::NetworkAclEntry, 2)]
fn test_default_stack_resource_counts(kind: ResourceType, expected: usize) {
    assert_eq!(default_template().count_of(kind), expected);
}

#[test]
fn test_default_stack_total() {
    let template = default_template();
    assert_eq!(template.len(), 24);
    assert_eq!(template.description(), Some("Stack creating a VPC"));
}

#[test]
fn test_default_stack_is_valid() {
    assert_eq!(validate_template(&default_template()), Ok(()));
}

#[test]
fn test_emitted_json_deserializes_to_same_template() -> Result<()> {
    let template = default_template();
    let json = template.to_json()?;

    let _: Value = serde_json::from_str(&json)?;
    let parsed = Template::from_json(&json)?;
    assert_eq!(parsed, template);
    Ok(())
}

#[test]
fn test_regeneration_is_byte_identical() -> Result<()> {
    let first = render_vpc_template(&VpcLayout::default())?;
    let second = render_vpc_template(&VpcLayout::default())?;
    assert_eq!(first, second);

    let reparsed = Template::from_json(&first)?.to_json()?;
    assert_eq!(reparsed, first);
    Ok(())
}

#[test]
fn test_no_dangling_references() -> Result<()> {
    let template = default_template();
    let value = template.to_value()?;
    let resources = value["Resources"].as_object().expect("resources object");

    fn refs(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(target)) = map.get("Ref") {
                    out.push(target.clone());
                }
                map.values().for_each(|v| refs(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| refs(v, out)),
            _ => {}
        }
    }

    let mut targets = Vec::new();
    refs(&value["Resources"], &mut targets);
    assert!(!targets.is_empty());

    for target in targets {
        assert!(
            target.starts_with("AWS::") || resources.contains_key(&target),
            "dangling Ref to {target}"
        );
    }
    Ok(())
}

#[test]
fn test_subnets_disjoint_and_inside_network() {
    let template = default_template();
    let network: Ipv4Cidr = "172.21.0.0/16".parse().unwrap();

    let blocks: Vec<Ipv4Cidr> = template
        .resources_of(ResourceType::Subnet)
        .map(|(_, r)| match r.properties() {
            ResourceProperties::Subnet(s) => s.cidr_block,
            other => panic!("unexpected properties: {other:?}"),
        })
        .collect();
    assert_eq!(blocks.len(), 6);

    for (i, a) in blocks.iter().enumerate() {
        assert!(network.contains(a), "{a} outside {network}");
        for b in &blocks[i + 1..] {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }
}

#[test]
fn test_internet_route_depends_on_attachment() -> Result<()> {
    let value = default_template().to_value()?;
    assert_eq!(
        value["Resources"]["RouteToInternet"],
        json!({
            "DependsOn": "InternetGatewayAttachment",
            "Properties": {
                "DestinationCidrBlock": "0.0.0.0/0",
                "GatewayId": { "Ref": "InternetGateway" },
                "RouteTableId": { "Ref": "PublicRouteTable" }
            },
            "Type": "AWS::EC2::Route"
        })
    );
    Ok(())
}

#[test]
fn test_private_acl_entries() {
    let template = default_template();
    let mut egress_flags = Vec::new();

    for (_, resource) in template.resources_of(ResourceType::NetworkAclEntry) {
        let ResourceProperties::NetworkAclEntry(entry) = resource.properties() else {
            panic!("unexpected properties");
        };
        assert_eq!(entry.cidr_block.to_string(), "172.21.0.0/16");
        assert_eq!(entry.rule_number, 200);
        assert_eq!(entry.protocol, -1);
        assert_eq!(entry.rule_action, RuleAction::Allow);
        assert_eq!(entry.network_acl_id, Expr::reference("PrivateNetworkAcl"));
        egress_flags.push(entry.egress);
    }

    egress_flags.sort();
    assert_eq!(egress_flags, vec![false, true]);
}

#[test]
fn test_acl_covers_only_private_subnets() {
    let template = default_template();
    let mut subnets: Vec<String> = template
        .resources_of(ResourceType::SubnetNetworkAclAssociation)
        .filter_map(|(_, r)| match r.properties() {
            ResourceProperties::SubnetNetworkAclAssociation(a) => {
                a.subnet_id.ref_target().map(str::to_string)
            }
            _ => None,
        })
        .collect();
    subnets.sort();

    assert_eq!(
        subnets,
        vec!["StackPrivateSubnetA", "StackPrivateSubnetB", "StackPrivateSubnetC"]
    );
}

#[test]
fn test_header_sections() -> Result<()> {
    let template = default_template();
    let ids: Vec<&str> = template.parameters().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["stackname"]);

    let stackname = template.parameter("stackname").expect("stackname parameter");
    assert_eq!(stackname.parameter_type, ParameterType::String);
    assert_eq!(stackname.default.as_deref(), Some("Dev"));
    assert!(template.parameter("StackName").is_none());

    let value = template.to_value()?;
    assert_eq!(
        value["Parameters"],
        json!({
            "stackname": {
                "Default": "Dev",
                "Description": "Environment Name (default: StackNameNotDefined)",
                "Type": "String"
            }
        })
    );
    assert_eq!(
        value["Resources"]["VPC"],
        json!({
            "Properties": {
                "CidrBlock": "172.21.0.0/16",
                "EnableDnsHostnames": false,
                "EnableDnsSupport": true,
                "InstanceTenancy": "default",
                "Tags": [{ "Key": "Name", "Value": { "Ref": "AWS::StackName" } }]
            },
            "Type": "AWS::EC2::VPC"
        })
    );
    Ok(())
}

#[test]
fn test_write_to_configured_path() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("vpc-template-e2e-{}", std::process::id()));
    let config = GeneratorConfig::default().with_output_path(dir.join("roles/vpc/files/vpc.json"));

    let template = build_vpc_template(&config.layout)?;
    write_template(&template, &config.output_path)?;

    let written = std::fs::read_to_string(&config.output_path)?;
    assert_eq!(written, render_vpc_template(&config.layout)?);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_write_failure_is_io_error() {
    let dir = std::env::temp_dir().join(format!("vpc-template-blocked-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();

    let err = write_template(&default_template(), blocker.join("vpc.json")).unwrap_err();
    assert!(matches!(err, vpc_template::TemplateError::Io(_)));

    std::fs::remove_dir_all(&dir).unwrap();
}
