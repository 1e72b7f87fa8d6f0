//! SDK Dispatch
//!
//! Maps SDK method names to AWS SDK calls and renders each response as JSON
//! in the API's own field names, so the field tables in `resources/*.json`
//! can address it by path.

use crate::aws::client::AwsClient;
use anyhow::Result;
use aws_sdk_ec2::types::{
    Address, Instance, InstanceNetworkInterface, NetworkInterface, SecurityGroup, Tag,
};
use aws_sdk_elasticloadbalancing::types::LoadBalancerDescription;
use aws_sdk_elasticloadbalancingv2::types::LoadBalancer;
use serde_json::{json, Value};

/// Invoke an AWS SDK describe method
pub async fn invoke_sdk(service: &str, method: &str, client: &AwsClient) -> Result<Value> {
    tracing::debug!(
        "invoke_sdk: service={}, method={}, region={}",
        service,
        method,
        client.region
    );

    match service {
        "ec2" => invoke_ec2(method, client).await,
        "elb" => invoke_elb(method, client).await,
        "elbv2" => invoke_elbv2(method, client).await,
        _ => Err(anyhow::anyhow!("Unknown service: {}", service)),
    }
}

/// Render an SDK error with its full source chain
fn sdk_error<E>(err: E) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    anyhow::anyhow!("{}", aws_sdk_ec2::error::DisplayErrorContext(&err))
}

// =============================================================================
// EC2
// =============================================================================

async fn invoke_ec2(method: &str, client: &AwsClient) -> Result<Value> {
    match method {
        "describe_instances" => {
            let output = client
                .ec2
                .describe_instances()
                .send()
                .await
                .map_err(sdk_error)?;
            let instances: Vec<&Instance> = output
                .reservations()
                .iter()
                .flat_map(|reservation| reservation.instances())
                .collect();
            Ok(instances_response(&instances, output.next_token()))
        },
        "describe_security_groups" => {
            let output = client
                .ec2
                .describe_security_groups()
                .send()
                .await
                .map_err(sdk_error)?;
            Ok(json!({
                "SecurityGroups": output
                    .security_groups()
                    .iter()
                    .map(security_group_json)
                    .collect::<Vec<_>>(),
                "NextToken": output.next_token(),
            }))
        },
        "describe_network_interfaces" => {
            let output = client
                .ec2
                .describe_network_interfaces()
                .send()
                .await
                .map_err(sdk_error)?;
            Ok(json!({
                "NetworkInterfaces": output
                    .network_interfaces()
                    .iter()
                    .map(network_interface_json)
                    .collect::<Vec<_>>(),
                "NextToken": output.next_token(),
            }))
        },
        "describe_addresses" => {
            let output = client
                .ec2
                .describe_addresses()
                .send()
                .await
                .map_err(sdk_error)?;
            Ok(json!({
                "Addresses": output.addresses().iter().map(address_json).collect::<Vec<_>>(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown ec2 method: {}", method)),
    }
}

/// Reservations are flattened: the response carries a single `Instances` array
pub(crate) fn instances_response(instances: &[&Instance], next_token: Option<&str>) -> Value {
    json!({
        "Instances": instances.iter().map(|i| instance_json(i)).collect::<Vec<_>>(),
        "NextToken": next_token,
    })
}

pub(crate) fn instance_json(instance: &Instance) -> Value {
    json!({
        "InstanceId": instance.instance_id(),
        "PrivateIpAddress": instance.private_ip_address(),
        "PublicIpAddress": instance.public_ip_address(),
        "State": {
            "Name": instance.state().and_then(|s| s.name()).map(|n| n.as_str()),
        },
        "ImageId": instance.image_id(),
        "InstanceType": instance.instance_type().map(|t| t.as_str()),
        "KeyName": instance.key_name(),
        "IamInstanceProfile": instance
            .iam_instance_profile()
            .map(|profile| json!({ "Arn": profile.arn() })),
        "SecondaryPrivateIpAddresses": instance_secondary_ips(instance.network_interfaces()),
        "Tags": tags_json(instance.tags()),
    })
}

/// Non-primary private IPs of the primary attachment (device index 0,
/// falling back to the first listed interface)
fn instance_secondary_ips(interfaces: &[InstanceNetworkInterface]) -> Vec<&str> {
    let primary = interfaces
        .iter()
        .find(|eni| eni.attachment().and_then(|a| a.device_index()) == Some(0))
        .or_else(|| interfaces.first());

    let Some(primary) = primary else {
        return Vec::new();
    };

    primary
        .private_ip_addresses()
        .iter()
        .filter(|ip| ip.primary() != Some(true))
        .filter_map(|ip| ip.private_ip_address())
        .collect()
}

pub(crate) fn security_group_json(group: &SecurityGroup) -> Value {
    json!({
        "GroupId": group.group_id(),
        "GroupName": group.group_name(),
        "Description": group.description(),
        "VpcId": group.vpc_id(),
        "Tags": tags_json(group.tags()),
    })
}

pub(crate) fn network_interface_json(eni: &NetworkInterface) -> Value {
    let secondary: Vec<&str> = eni
        .private_ip_addresses()
        .iter()
        .filter(|ip| ip.primary() != Some(true))
        .filter_map(|ip| ip.private_ip_address())
        .collect();

    json!({
        "NetworkInterfaceId": eni.network_interface_id(),
        "PrivateIpAddress": eni.private_ip_address(),
        "Association": eni.association().map(|assoc| json!({
            "PublicIp": assoc.public_ip(),
            "PublicDnsName": assoc.public_dns_name(),
        })),
        "SecondaryPrivateIpAddresses": secondary,
        "TagSet": tags_json(eni.tag_set()),
    })
}

pub(crate) fn address_json(address: &Address) -> Value {
    json!({
        "AllocationId": address.allocation_id(),
        "InstanceId": address.instance_id(),
        "NetworkInterfaceId": address.network_interface_id(),
        "PrivateIpAddress": address.private_ip_address(),
        "PublicIp": address.public_ip(),
        "Tags": tags_json(address.tags()),
    })
}

fn tags_json(tags: &[Tag]) -> Value {
    tags.iter()
        .map(|tag| json!({ "Key": tag.key(), "Value": tag.value() }))
        .collect()
}

// =============================================================================
// Elastic Load Balancing (classic)
// =============================================================================

async fn invoke_elb(method: &str, client: &AwsClient) -> Result<Value> {
    match method {
        "describe_load_balancers" => {
            let output = client
                .elb
                .describe_load_balancers()
                .send()
                .await
                .map_err(sdk_error)?;
            Ok(json!({
                "LoadBalancerDescriptions": output
                    .load_balancer_descriptions()
                    .iter()
                    .map(classic_load_balancer_json)
                    .collect::<Vec<_>>(),
                "NextMarker": output.next_marker(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown elb method: {}", method)),
    }
}

pub(crate) fn classic_load_balancer_json(lb: &LoadBalancerDescription) -> Value {
    json!({
        "LoadBalancerName": lb.load_balancer_name(),
        "Scheme": lb.scheme(),
        "DNSName": lb.dns_name(),
        "Instances": lb
            .instances()
            .iter()
            .map(|instance| json!({ "InstanceId": instance.instance_id() }))
            .collect::<Vec<_>>(),
        "SecurityGroups": lb.security_groups(),
        "ListenerDescriptions": lb
            .listener_descriptions()
            .iter()
            .map(|desc| json!({
                "Listener": desc.listener().map(|listener| json!({
                    "LoadBalancerPort": listener.load_balancer_port(),
                    "Protocol": listener.protocol(),
                })),
            }))
            .collect::<Vec<_>>(),
    })
}

// =============================================================================
// Elastic Load Balancing v2 (application / network)
// =============================================================================

async fn invoke_elbv2(method: &str, client: &AwsClient) -> Result<Value> {
    match method {
        "describe_load_balancers" => {
            let output = client
                .elbv2
                .describe_load_balancers()
                .send()
                .await
                .map_err(sdk_error)?;
            Ok(json!({
                "LoadBalancers": output
                    .load_balancers()
                    .iter()
                    .map(load_balancer_json)
                    .collect::<Vec<_>>(),
                "NextMarker": output.next_marker(),
            }))
        },
        _ => Err(anyhow::anyhow!("Unknown elbv2 method: {}", method)),
    }
}

pub(crate) fn load_balancer_json(lb: &LoadBalancer) -> Value {
    json!({
        "LoadBalancerName": lb.load_balancer_name(),
        "Type": lb.r#type().map(|t| t.as_str()),
        "Scheme": lb.scheme().map(|s| s.as_str()),
        "DNSName": lb.dns_name(),
        "SecurityGroups": lb.security_groups(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::{
        IamInstanceProfile, InstanceNetworkInterfaceAttachment, InstancePrivateIpAddress,
        InstanceState, InstanceStateName, InstanceType, NetworkInterfaceAssociation,
        NetworkInterfacePrivateIpAddress,
    };

    fn private_ip(addr: &str, primary: bool) -> InstancePrivateIpAddress {
        InstancePrivateIpAddress::builder()
            .private_ip_address(addr)
            .primary(primary)
            .build()
    }

    #[test]
    fn test_instance_json_maps_fields() {
        let instance = Instance::builder()
            .instance_id("i-abc123")
            .private_ip_address("10.0.0.5")
            .state(
                InstanceState::builder()
                    .name(InstanceStateName::Running)
                    .build(),
            )
            .image_id("ami-123")
            .instance_type(InstanceType::T3Micro)
            .key_name("deploy")
            .iam_instance_profile(
                IamInstanceProfile::builder()
                    .arn("arn:aws:iam::123456789012:instance-profile/web")
                    .build(),
            )
            .network_interfaces(
                InstanceNetworkInterface::builder()
                    .attachment(
                        InstanceNetworkInterfaceAttachment::builder()
                            .device_index(0)
                            .build(),
                    )
                    .private_ip_addresses(private_ip("10.0.0.5", true))
                    .private_ip_addresses(private_ip("10.0.0.6", false))
                    .build(),
            )
            .build();

        let value = instance_json(&instance);

        assert_eq!(value["InstanceId"], "i-abc123");
        assert_eq!(value["PublicIpAddress"], Value::Null);
        assert_eq!(value["State"]["Name"], "running");
        assert_eq!(value["InstanceType"], "t3.micro");
        assert_eq!(
            value["IamInstanceProfile"]["Arn"],
            "arn:aws:iam::123456789012:instance-profile/web"
        );
        assert_eq!(value["SecondaryPrivateIpAddresses"], json!(["10.0.0.6"]));
        assert_eq!(value["Tags"], json!([]));
    }

    #[test]
    fn test_secondary_ips_come_from_primary_attachment() {
        let secondary_eni = InstanceNetworkInterface::builder()
            .attachment(
                InstanceNetworkInterfaceAttachment::builder()
                    .device_index(1)
                    .build(),
            )
            .private_ip_addresses(private_ip("10.0.1.9", false))
            .build();
        let primary_eni = InstanceNetworkInterface::builder()
            .attachment(
                InstanceNetworkInterfaceAttachment::builder()
                    .device_index(0)
                    .build(),
            )
            .private_ip_addresses(private_ip("10.0.0.5", true))
            .build();

        let interfaces = [secondary_eni, primary_eni];
        assert!(instance_secondary_ips(&interfaces).is_empty());
    }

    #[test]
    fn test_instance_without_interfaces_has_no_secondary_ips() {
        let instance = Instance::builder().instance_id("i-1").build();
        let value = instance_json(&instance);
        assert_eq!(value["SecondaryPrivateIpAddresses"], json!([]));
        assert_eq!(value["IamInstanceProfile"], Value::Null);
    }

    #[test]
    fn test_reservations_are_flattened() {
        let a = Instance::builder().instance_id("i-1").build();
        let b = Instance::builder().instance_id("i-2").build();

        let value = instances_response(&[&a, &b], None);

        assert_eq!(value["Instances"].as_array().unwrap().len(), 2);
        assert_eq!(value["NextToken"], Value::Null);
    }

    #[test]
    fn test_network_interface_without_association() {
        let eni = NetworkInterface::builder()
            .network_interface_id("eni-1")
            .private_ip_address("10.0.0.8")
            .private_ip_addresses(
                NetworkInterfacePrivateIpAddress::builder()
                    .private_ip_address("10.0.0.8")
                    .primary(true)
                    .build(),
            )
            .tag_set(Tag::builder().key("Name").value("eni").build())
            .build();

        let value = network_interface_json(&eni);

        assert_eq!(value["Association"], Value::Null);
        assert_eq!(value["SecondaryPrivateIpAddresses"], json!([]));
        assert_eq!(value["TagSet"], json!([{"Key": "Name", "Value": "eni"}]));
    }

    #[test]
    fn test_network_interface_with_association() {
        let eni = NetworkInterface::builder()
            .network_interface_id("eni-2")
            .association(
                NetworkInterfaceAssociation::builder()
                    .public_ip("54.1.2.3")
                    .public_dns_name("ec2-54-1-2-3.compute-1.amazonaws.com")
                    .build(),
            )
            .build();

        let value = network_interface_json(&eni);

        assert_eq!(value["Association"]["PublicIp"], "54.1.2.3");
        assert_eq!(
            value["Association"]["PublicDnsName"],
            "ec2-54-1-2-3.compute-1.amazonaws.com"
        );
    }

    #[test]
    fn test_unattached_address() {
        let address = Address::builder()
            .allocation_id("eipalloc-1")
            .public_ip("3.3.3.3")
            .build();

        let value = address_json(&address);

        assert_eq!(value["AllocationId"], "eipalloc-1");
        assert_eq!(value["InstanceId"], Value::Null);
        assert_eq!(value["NetworkInterfaceId"], Value::Null);
    }

    #[test]
    fn test_security_group_json() {
        let group = SecurityGroup::builder()
            .group_id("sg-1")
            .group_name("web")
            .description("web tier")
            .vpc_id("vpc-1")
            .build();

        let value = security_group_json(&group);

        assert_eq!(value["GroupId"], "sg-1");
        assert_eq!(value["Description"], "web tier");
        assert_eq!(value["Tags"], json!([]));
    }
}
