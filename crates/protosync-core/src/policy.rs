//! Namespace policy: the static tables that steer routing and linking
//!
//! Everything here is immutable configuration built once at startup and
//! passed explicitly to the path and dependency resolvers. The defaults
//! describe the Envoy API tree; a `[policy]` table in `protosync.toml`
//! overrides individual fields.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use protosync_fs::TreeFilter;
use serde::{Deserialize, Serialize};

/// An import prefix that always maps to one fixed build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixTarget {
    pub prefix: String,
    pub target: String,
}

impl PrefixTarget {
    fn new(prefix: &str, target: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            target: target.to_string(),
        }
    }
}

/// Routing, linking and filtering rules for one API tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespacePolicy {
    /// Import prefixes the build macro already depends on implicitly
    pub implicit_import_prefixes: Vec<String>,
    /// Import prefixes mapped to fixed external targets, checked in order
    pub special_import_prefixes: Vec<PrefixTarget>,
    /// Exact import paths mapped to external targets
    pub external_dependencies: BTreeMap<String, String>,
    /// Import prefixes that resolve to packages inside this tree
    pub internal_roots: Vec<String>,
    /// Path component marking the extension area
    pub extension_marker: String,
    /// Directory prefix prepended to destinations from the extension area
    pub relocation_prefix: String,
    /// Package fragments that mark an unstable (next) version namespace
    pub unstable_version_markers: Vec<String>,
    /// Extension packages allowed to live in a stable namespace
    pub extension_allow_list: BTreeSet<String>,
    /// Legacy package directories excluded from history linkage and comparison
    pub ignored_legacy_paths: Vec<String>,
    /// Further sub-paths excluded from comparison
    pub ignored_paths: Vec<String>,
    /// Top-level directories of the API tree that are synchronized
    pub tracked_roots: Vec<String>,
    /// File extensions never compared (generated documentation)
    pub excluded_extensions: Vec<String>,
    /// Files maintained by hand and carried into the proposed tree verbatim
    pub manual_files: Vec<String>,
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        Self {
            implicit_import_prefixes: strings(&[
                "google/api/annotations.proto",
                "google/protobuf/",
                "google/rpc/status.proto",
                "validate/validate.proto",
            ]),
            special_import_prefixes: vec![
                PrefixTarget::new(
                    "udpa/annotations/",
                    "@com_github_cncf_udpa//udpa/annotations:pkg",
                ),
                PrefixTarget::new(
                    "xds/type/matcher/v3/",
                    "@com_github_cncf_udpa//xds/type/matcher/v3:pkg",
                ),
                PrefixTarget::new("xds/core/v3/", "@com_github_cncf_udpa//xds/core/v3:pkg"),
            ],
            external_dependencies: [
                (
                    "google/api/expr/v1alpha1/checked.proto",
                    "@com_google_googleapis//google/api/expr/v1alpha1:checked_proto",
                ),
                (
                    "google/api/expr/v1alpha1/syntax.proto",
                    "@com_google_googleapis//google/api/expr/v1alpha1:syntax_proto",
                ),
                (
                    "io/prometheus/client/metrics.proto",
                    "@prometheus_metrics_model//:client_model",
                ),
                (
                    "opencensus/proto/trace/v1/trace.proto",
                    "@opencensus_proto//opencensus/proto/trace/v1:trace_proto",
                ),
                (
                    "opencensus/proto/trace/v1/trace_config.proto",
                    "@opencensus_proto//opencensus/proto/trace/v1:trace_config_proto",
                ),
                (
                    "opentelemetry/proto/common/v1/common.proto",
                    "@opentelemetry_proto//:common",
                ),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            internal_roots: strings(&["envoy/", "contrib/"]),
            extension_marker: "contrib".to_string(),
            relocation_prefix: "contrib".to_string(),
            unstable_version_markers: strings(&["v3alpha", "v4alpha"]),
            // Extensions moved from core to contrib keep their v3 packages.
            extension_allow_list: strings(&[
                "envoy.extensions.filters.http.squash.v3",
                "envoy.extensions.filters.network.kafka_broker.v3",
                "envoy.extensions.filters.network.rocketmq_proxy.v3",
            ])
            .into_iter()
            .collect(),
            ignored_legacy_paths: strings(&[
                "envoy/config/accesslog/v2",
                "envoy/config/cluster/aggregate/v2alpha",
                "envoy/config/cluster/dynamic_forward_proxy/v2alpha",
                "envoy/config/cluster/redis",
                "envoy/config/common/dynamic_forward_proxy/v2alpha",
                "envoy/config/common/tap/v2alpha",
                "envoy/config/filter/dubbo/router/v2alpha1",
                "envoy/config/filter/http/adaptive_concurrency/v2alpha",
                "envoy/config/filter/http/aws_lambda/v2alpha",
                "envoy/config/filter/http/aws_request_signing/v2alpha",
                "envoy/config/filter/http/buffer/v2",
                "envoy/config/filter/http/cache/v2alpha",
                "envoy/config/filter/http/compressor/v2",
                "envoy/config/filter/http/cors/v2",
                "envoy/config/filter/http/csrf/v2",
                "envoy/config/filter/http/dynamic_forward_proxy/v2alpha",
                "envoy/config/filter/http/dynamo/v2",
                "envoy/config/filter/http/ext_authz/v2",
                "envoy/config/filter/http/fault/v2",
                "envoy/config/filter/http/grpc_http1_bridge/v2",
                "envoy/config/filter/http/grpc_http1_reverse_bridge/v2alpha1",
                "envoy/config/filter/http/grpc_stats/v2alpha",
                "envoy/config/filter/http/grpc_web/v2",
                "envoy/config/filter/http/gzip/v2",
                "envoy/config/filter/http/header_to_metadata/v2",
                "envoy/config/filter/http/health_check/v2",
                "envoy/config/filter/http/ip_tagging/v2",
                "envoy/config/filter/http/jwt_authn/v2alpha",
                "envoy/config/filter/http/lua/v2",
                "envoy/config/filter/http/on_demand/v2",
                "envoy/config/filter/http/original_src/v2alpha1",
                "envoy/config/filter/http/rate_limit/v2",
                "envoy/config/filter/http/rbac/v2",
                "envoy/config/filter/http/router/v2",
                "envoy/config/filter/http/squash/v2",
                "envoy/config/filter/http/tap/v2alpha",
                "envoy/config/filter/http/transcoder/v2",
                "envoy/config/filter/listener/http_inspector/v2",
                "envoy/config/filter/listener/original_dst/v2",
                "envoy/config/filter/listener/original_src/v2alpha1",
                "envoy/config/filter/listener/proxy_protocol/v2",
                "envoy/config/filter/listener/tls_inspector/v2",
                "envoy/config/filter/network/client_ssl_auth/v2",
                "envoy/config/filter/network/direct_response/v2",
                "envoy/config/filter/network/dubbo_proxy/v2alpha1",
                "envoy/config/filter/network/echo/v2",
                "envoy/config/filter/network/ext_authz/v2",
                "envoy/config/filter/network/kafka_broker/v2alpha1",
                "envoy/config/filter/network/local_rate_limit/v2alpha",
                "envoy/config/filter/network/mongo_proxy/v2",
                "envoy/config/filter/network/mysql_proxy/v1alpha1",
                "envoy/config/filter/network/rate_limit/v2",
                "envoy/config/filter/network/rbac/v2",
                "envoy/config/filter/network/sni_cluster/v2",
                "envoy/config/filter/network/zookeeper_proxy/v1alpha1",
                "envoy/config/filter/thrift/rate_limit/v2alpha1",
                "envoy/config/filter/udp/udp_proxy/v2alpha",
                "envoy/config/grpc_credential/v2alpha",
                "envoy/config/ratelimit/v2",
                "envoy/config/rbac/v2",
                "envoy/config/retry/omit_host_metadata/v2",
                "envoy/config/retry/previous_priorities",
                "envoy/config/transport_socket/raw_buffer/v2",
                "envoy/config/transport_socket/tap/v2alpha",
                "envoy/data/cluster/v2alpha",
                "envoy/data/dns/v2alpha",
                "envoy/data/core/v2alpha",
                "envoy/service/event_reporting/v2alpha",
            ]),
            // Kept for compatibility but never produced by the transform.
            ignored_paths: strings(&["envoy/service/auth/v2alpha"]),
            tracked_roots: strings(&["contrib", "envoy"]),
            excluded_extensions: strings(&["md"]),
            manual_files: strings(&[
                "envoy/annotations/resource.proto",
                "envoy/annotations/deprecation.proto",
                "envoy/annotations/BUILD",
            ]),
        }
    }
}

impl NamespacePolicy {
    /// Does this root-relative path lie in the extension area?
    pub fn is_extension_path(&self, relative: &Path) -> bool {
        !self.extension_marker.is_empty()
            && relative
                .components()
                .any(|c| c.as_os_str() == self.extension_marker.as_str())
    }

    /// Is this package in one of the unstable version namespaces?
    pub fn is_unstable_package(&self, package: &str) -> bool {
        self.unstable_version_markers
            .iter()
            .any(|marker| package.contains(marker.as_str()))
    }

    /// Is this package directory excluded from history linkage?
    pub fn is_ignored_legacy(&self, directory: &str) -> bool {
        self.ignored_legacy_paths.iter().any(|p| p == directory)
    }

    /// Filter selecting the parts of the live tree that take part in comparison.
    pub fn current_tree_filter(&self) -> TreeFilter {
        TreeFilter {
            roots: self.tracked_roots.clone(),
            excluded_paths: self
                .ignored_paths
                .iter()
                .chain(self.ignored_legacy_paths.iter())
                .cloned()
                .collect(),
            excluded_extensions: self.excluded_extensions.clone(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
