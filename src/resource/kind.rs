//! The resource kinds the enumerator knows how to list

use super::registry::{get_resource, ResourceDef};
use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum ResourceKind {
    Instances,
    SecurityGroups,
    NetworkInterfaces,
    ClassicLoadBalancers,
    ApplicationLoadBalancers,
    ElasticIps,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Instances,
        ResourceKind::SecurityGroups,
        ResourceKind::NetworkInterfaces,
        ResourceKind::ClassicLoadBalancers,
        ResourceKind::ApplicationLoadBalancers,
        ResourceKind::ElasticIps,
    ];

    /// Registry key of the definition backing this kind
    pub fn resource_key(self) -> &'static str {
        match self {
            ResourceKind::Instances => "ec2-instances",
            ResourceKind::SecurityGroups => "ec2-security-groups",
            ResourceKind::NetworkInterfaces => "ec2-network-interfaces",
            ResourceKind::ClassicLoadBalancers => "elb-load-balancers",
            ResourceKind::ApplicationLoadBalancers => "elbv2-load-balancers",
            ResourceKind::ElasticIps => "ec2-addresses",
        }
    }

    pub fn definition(self) -> Option<&'static ResourceDef> {
        get_resource(self.resource_key())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.definition() {
            Some(def) => f.write_str(&def.display_name),
            None => f.write_str(self.resource_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_definition() {
        for kind in ResourceKind::ALL {
            assert!(kind.definition().is_some(), "{:?} is not registered", kind);
        }
    }

    #[test]
    fn test_load_balancer_kinds_use_distinct_services() {
        let classic = ResourceKind::ClassicLoadBalancers.definition().unwrap();
        let modern = ResourceKind::ApplicationLoadBalancers.definition().unwrap();
        assert_eq!(classic.service, "elb");
        assert_eq!(modern.service, "elbv2");
    }

    #[test]
    fn test_display_uses_resource_label() {
        assert_eq!(ResourceKind::ElasticIps.to_string(), "Elastic IP");
    }
}
