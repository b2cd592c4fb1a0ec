//! Edge-router (Traefik) tag construction.

/// Builds the Traefik tags a service attaches to its registration so the
/// edge router picks up path-based routing for it.
#[derive(Debug, Clone, Default)]
pub struct EdgeRouteTags {
    pub service_name: String,
    pub path_prefix: String,
    pub port: u16,
    pub priority: Option<u32>,
    /// Extra middleware names appended after the generated strip-prefix one.
    pub middlewares: Vec<String>,
}

impl EdgeRouteTags {
    pub fn new(service_name: impl Into<String>, path_prefix: impl Into<String>, port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            path_prefix: path_prefix.into(),
            port,
            priority: None,
            middlewares: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_middleware(mut self, name: impl Into<String>) -> Self {
        self.middlewares.push(name.into());
        self
    }

    /// Render the tag list. A strip-prefix middleware is always generated and
    /// runs before any extra middlewares.
    pub fn build(&self) -> Vec<String> {
        let mut tags = vec![
            "traefik.enable=true".to_string(),
            format!(
                "traefik.http.routers.{}.rule=PathPrefix(`{}`)",
                self.service_name, self.path_prefix
            ),
            format!(
                "traefik.http.services.{}.loadbalancer.server.port={}",
                self.service_name, self.port
            ),
        ];

        if let Some(priority) = self.priority {
            tags.push(format!(
                "traefik.http.routers.{}.priority={}",
                self.service_name, priority
            ));
        }

        let strip_prefix = format!("{}-stripprefix", self.service_name);
        tags.push(format!(
            "traefik.http.middlewares.{}.stripprefix.prefixes={}",
            strip_prefix, self.path_prefix
        ));

        let mut chain = vec![strip_prefix];
        chain.extend(self.middlewares.iter().cloned());
        tags.push(format!(
            "traefik.http.routers.{}.middlewares={}",
            self.service_name,
            chain.join(",")
        ));

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_tags_cover_rule_port_and_stripprefix() {
        let tags = EdgeRouteTags::new("billing", "/billing", 8080).build();

        assert!(tags.contains(&"traefik.enable=true".to_string()));
        assert!(tags.contains(&"traefik.http.routers.billing.rule=PathPrefix(`/billing`)".to_string()));
        assert!(
            tags.contains(&"traefik.http.services.billing.loadbalancer.server.port=8080".to_string())
        );
        assert!(tags.contains(
            &"traefik.http.middlewares.billing-stripprefix.stripprefix.prefixes=/billing".to_string()
        ));
        assert!(tags.contains(&"traefik.http.routers.billing.middlewares=billing-stripprefix".to_string()));
    }

    #[test]
    fn priority_tag_appears_only_when_set() {
        let without = EdgeRouteTags::new("billing", "/billing", 8080).build();
        assert!(!without.iter().any(|t| t.contains(".priority=")));

        let with = EdgeRouteTags::new("billing", "/billing", 8080)
            .with_priority(42)
            .build();
        assert!(with.contains(&"traefik.http.routers.billing.priority=42".to_string()));
    }

    #[test]
    fn extra_middlewares_chain_after_stripprefix() {
        let tags = EdgeRouteTags::new("billing", "/billing", 8080)
            .with_middleware("auth-forward")
            .build();

        assert!(tags.contains(
            &"traefik.http.routers.billing.middlewares=billing-stripprefix,auth-forward".to_string()
        ));
    }
}
