//! Summary of a package for display.

use appack_common::error::Result;
use appack_common::types::{Encoding, Maintainer, OutputFormat};
use appack_compose::ComposeFile;
use appack_compose::graph::ServiceGraph;
use appack_params::{Environment, ParameterSources, resolve};

use crate::digest::ContentDigest;
use crate::package::Package;

/// One service as shown by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
    /// Service name.
    pub name: String,
    /// Image, empty if not declared.
    pub image: String,
    /// Replica count; 1 unless declared.
    pub replicas: u64,
    /// Published ports.
    pub ports: Vec<String>,
}

/// Everything `inspect` shows about a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Description, possibly empty.
    pub description: String,
    /// Maintainers in declaration order.
    pub maintainers: Vec<Maintainer>,
    /// Services in start order.
    pub services: Vec<ServiceSummary>,
    /// Top-level networks.
    pub networks: Vec<String>,
    /// Top-level volumes.
    pub volumes: Vec<String>,
    /// Parameter defaults in schema order.
    pub parameters: Vec<(String, String)>,
    /// Attachment paths and sizes in bytes.
    pub attachments: Vec<(String, u64)>,
    /// Encoding the package was loaded from.
    pub encoding: Encoding,
    /// Payload digest.
    pub digest: ContentDigest,
}

/// Builds the inspection report of `package`.
///
/// The compose template is rendered with the package defaults so services
/// can be listed in dependency order.
///
/// # Errors
///
/// Returns [`appack_common::error::AppError::MalformedCompose`] if the
/// rendered template is not a valid compose structure.
pub fn inspect(package: &Package, env: &Environment) -> Result<InspectReport> {
    let params = resolve(&ParameterSources::with_defaults(package.parameters()));
    let rendered = appack_compose::render(package.compose(), &params, env, OutputFormat::Yaml)?;
    let compose = ComposeFile::parse(&String::from_utf8_lossy(&rendered.bytes))?;
    let order = ServiceGraph::from_compose(&compose)?.start_order()?;

    let services = order
        .iter()
        .filter_map(|name| {
            compose.services.get(name).map(|s| ServiceSummary {
                name: name.clone(),
                image: s.image.clone().unwrap_or_default(),
                replicas: s.replicas.unwrap_or(1),
                ports: s.ports.clone(),
            })
        })
        .collect();

    let metadata = package.metadata();
    tracing::debug!(app = %metadata.name, "built inspection report");
    Ok(InspectReport {
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        description: metadata.description.clone(),
        maintainers: metadata.maintainers.clone(),
        services,
        networks: compose.networks,
        volumes: compose.volumes,
        parameters: package
            .parameters()
            .string_entries()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        attachments: package
            .attachments()
            .iter()
            .map(|a| (a.path.clone(), a.size() as u64))
            .collect(),
        encoding: package.encoding(),
        digest: package.digest(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::package::Attachment;

    const COMPOSE: &str = "version: \"3.6\"
services:
  web:
    image: nginx:latest
    ports:
      - \"${web_port}:80\"
    depends_on: [api]
    deploy:
      replicas: ${replicas}
  api:
    image: python:3.6
    depends_on: [db]
  db:
    image: postgres:9.3
networks:
  front: {}
  back: {}
";

    fn package() -> Package {
        Package::from_documents(
            Path::new("simple.dockerapp"),
            "version: 1.1.0-beta1\nname: simple\ndescription: demo app\nmaintainers:\n  - name: dev\n    email: dev@example.com\n".into(),
            COMPOSE.into(),
            "web_port: 8082\nreplicas: 2\n".into(),
            vec![Attachment::new(Path::new("simple.dockerapp"), "config.cfg", b"abc".to_vec()).expect("attachment")],
            Encoding::MultiFile,
        )
        .expect("package")
    }

    #[test]
    fn report_lists_services_in_start_order() {
        let report = inspect(&package(), &Environment::empty()).expect("inspect");
        let names: Vec<_> = report.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["db", "api", "web"]);
        let web = &report.services[2];
        assert_eq!(web.ports, vec!["8082:80"]);
        assert_eq!(web.replicas, 2);
        assert_eq!(report.services[0].replicas, 1);
    }

    #[test]
    fn report_carries_metadata_and_parameters() {
        let report = inspect(&package(), &Environment::empty()).expect("inspect");
        assert_eq!(report.name, "simple");
        assert_eq!(report.version, "1.1.0-beta1");
        assert_eq!(report.maintainers[0].email, "dev@example.com");
        assert_eq!(report.networks, vec!["front", "back"]);
        assert_eq!(
            report.parameters,
            vec![
                ("web_port".to_string(), "8082".to_string()),
                ("replicas".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(report.attachments, vec![("config.cfg".to_string(), 3)]);
        assert_eq!(report.digest, package().digest());
    }
}
