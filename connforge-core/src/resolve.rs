//! Authentication-flow resolution.
//!
//! Credential transformation is modeled as a directed graph:
//! - one *plain* node per [`CredentialKind`],
//! - one *universal* seed node ("no specific credential yet"),
//! - one *held* seed node per credential kind the identity carries.
//!
//! Registered [`CredentialBuilder`]s are the edges (filtered down to the
//! ones gated by the effective configuration kind); registered
//! [`ConnectionProvider`]s mark plain nodes as goals when their
//! specification kind matches the target connection. A multi-source BFS from
//! the seed nodes finds the shortest builder chain; ties are broken by
//! registration order.
//!
//! Held seeds are distinct from plain nodes on purpose: a held credential is
//! never a goal by itself, so holding e.g. a username/password credential
//! does not silently authorize connecting to a backend that accepts
//! username/password - a same-kind extractor must be registered explicitly.

use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

use crate::identity::{CredentialKind, CredentialSource, Identity};

use crate::authentication::AuthenticationConfigurationKind;
use crate::connection::SpecificationKind;
use crate::flow::{ConnectionProvider, CredentialBuilder};

/// Authentication-flow resolution failure.
///
/// Deterministic: resolution is a pure function of immutable inputs.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The explicit override configuration is not accepted by the connection.
    #[error(
        "Connection '{connection}' is not compatible with authentication configuration type '{configuration}'. Supported configuration type(s):\n{supported}"
    )]
    IncompatibleConfiguration {
        connection: String,
        configuration: String,
        supported: String,
    },

    /// No flow exists for the explicitly requested configuration.
    #[error(
        "No authentication flow for connection '{connection}' can be resolved for the specified identity (authentication configuration: {configuration}, connection specification: {specification})"
    )]
    UnresolvableFlow {
        connection: String,
        configuration: String,
        specification: String,
    },

    /// No flow exists for the connection's stored configuration.
    #[error(
        "No authentication flow for connection '{connection}' can be resolved for the specified identity. Try specifying another authentication configuration. Supported configuration type(s):\n{supported}"
    )]
    NoCompatibleFlow {
        connection: String,
        supported: String,
    },
}

/// A successfully resolved flow, as indices into the factory's registries.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResolvedFlow {
    /// The start node the winning path left from.
    pub source: CredentialSource,
    /// Indices into the credential-builder registry, in traversal order.
    pub chain: Vec<usize>,
    /// Index into the connection-provider registry.
    pub provider: usize,
}

/// Find the shortest accepted builder chain from what the identity holds to a
/// credential kind some matching provider accepts.
///
/// Builder and provider slices must already be deduplicated by their type-tag
/// keys; adjacency iterates them in registration order, which is what breaks
/// ties between equally short paths.
pub(crate) fn resolve_flow(
    credential_builders: &[Arc<dyn CredentialBuilder>],
    connection_providers: &[Arc<dyn ConnectionProvider>],
    identity: &Identity,
    configuration_kind: AuthenticationConfigurationKind,
    specification_kind: SpecificationKind,
) -> Option<ResolvedFlow> {
    let kinds = CredentialKind::ALL.len();
    let universal = kinds;
    let held_base = kinds + 1;
    let node_count = 2 * kinds + 1;

    // adjacency: (builder index, target plain node), in registration order
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for (builder_index, builder) in credential_builders.iter().enumerate() {
        if builder.configuration_kind() != configuration_kind {
            continue;
        }
        let output = builder.output().index();
        match builder.input() {
            CredentialSource::Any => adjacency[universal].push((builder_index, output)),
            CredentialSource::Kind(input) => {
                adjacency[held_base + input.index()].push((builder_index, output));
                // plain-to-plain edge only for genuine transformations;
                // extractors fire from held seeds exclusively
                if input.index() != output {
                    adjacency[input.index()].push((builder_index, output));
                }
            }
        }
    }

    // goal markers on plain nodes; a later registration with the same
    // (specification, credential) key replaces an earlier one
    let mut goals: Vec<Option<usize>> = vec![None; kinds];
    for (provider_index, provider) in connection_providers.iter().enumerate() {
        if provider.specification_kind() == specification_kind {
            goals[provider.credential_kind().index()] = Some(provider_index);
        }
    }

    // seeds: held kinds in the identity's credential order, then universal
    let mut visited = vec![false; node_count];
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; node_count];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for credential in identity.credentials() {
        let seed = held_base + credential.kind().index();
        if !visited[seed] {
            visited[seed] = true;
            queue.push_back(seed);
        }
    }
    visited[universal] = true;
    queue.push_back(universal);

    while let Some(node) = queue.pop_front() {
        for &(builder_index, target) in &adjacency[node] {
            if visited[target] {
                continue;
            }
            visited[target] = true;
            parent[target] = Some((node, builder_index));

            if let Some(provider_index) = goals[target] {
                let mut chain = Vec::new();
                let mut current = target;
                while let Some((from, via)) = parent[current] {
                    chain.push(via);
                    current = from;
                }
                chain.reverse();
                let source = if current == universal {
                    CredentialSource::Any
                } else {
                    CredentialSource::Kind(CredentialKind::ALL[current - held_base])
                };
                return Some(ResolvedFlow {
                    source,
                    chain,
                    provider: provider_index,
                });
            }
            queue.push_back(target);
        }
    }
    None
}
