//! Error types for the relnet core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while loading or assembling a [`crate::Topology`].
///
/// Loading is transactional: any variant here means no partial graph was
/// retained.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The description never declared its topology type.
    #[error("topology description is missing the `type` header line")]
    MissingTypeHeader,
    /// The declared topology type is not one this engine understands.
    #[error("unsupported topology type `{format}` (only `edges` is recognised)")]
    UnsupportedFormat {
        /// The type value found in the header.
        format: String,
    },
    /// A required header field never appeared.
    #[error("topology description is missing the `{field}` header field")]
    MissingField {
        /// Name of the absent header field.
        field: &'static str,
    },
    /// A header field was present but its value did not parse.
    #[error("header field `{field}` has malformed value `{value}`")]
    MalformedHeaderValue {
        /// Name of the offending header field.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },
    /// An edge line did not consist of exactly two node identifiers.
    #[error("line {line}: malformed edge line `{content}`")]
    MalformedEdgeLine {
        /// One-based line number within the description.
        line: usize,
        /// The raw line content.
        content: String,
    },
    /// An edge connected a node to itself.
    #[error("self-loop edge at node {node}")]
    SelfLoop {
        /// The node referenced by both endpoints.
        node: usize,
    },
    /// A reliability probability fell outside `[0, 1]`.
    #[error("reliability {value} is outside [0, 1]")]
    InvalidReliability {
        /// The out-of-range probability.
        value: f64,
    },
    /// The description declared no edges at all.
    #[error("topology contains no edges")]
    EmptyTopology,
    /// Reading the description failed at the transport level.
    #[error("failed to read topology description")]
    Io {
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

define_error_codes! {
    /// Stable codes describing [`TopologyError`] variants.
    enum TopologyErrorCode for TopologyError {
        /// The description never declared its topology type.
        MissingTypeHeader => MissingTypeHeader => "TOPOLOGY_MISSING_TYPE_HEADER",
        /// The declared topology type is not one this engine understands.
        UnsupportedFormat => UnsupportedFormat { .. } => "TOPOLOGY_UNSUPPORTED_FORMAT",
        /// A required header field never appeared.
        MissingField => MissingField { .. } => "TOPOLOGY_MISSING_FIELD",
        /// A header field was present but its value did not parse.
        MalformedHeaderValue => MalformedHeaderValue { .. } => "TOPOLOGY_MALFORMED_HEADER_VALUE",
        /// An edge line did not consist of exactly two node identifiers.
        MalformedEdgeLine => MalformedEdgeLine { .. } => "TOPOLOGY_MALFORMED_EDGE_LINE",
        /// An edge connected a node to itself.
        SelfLoop => SelfLoop { .. } => "TOPOLOGY_SELF_LOOP",
        /// A reliability probability fell outside `[0, 1]`.
        InvalidReliability => InvalidReliability { .. } => "TOPOLOGY_INVALID_RELIABILITY",
        /// The description declared no edges at all.
        EmptyTopology => EmptyTopology => "TOPOLOGY_EMPTY",
        /// Reading the description failed at the transport level.
        Io => Io { .. } => "TOPOLOGY_IO",
    }
}

/// Error type produced when configuring or running reliability estimation.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum EstimateError {
    /// A terminal node id lies outside the topology's dense id range.
    #[error("terminal node {node} is outside the node range [0, {max_node_id}]")]
    InvalidEndpoint {
        /// The out-of-range terminal.
        node: usize,
        /// Highest node id the topology knows about.
        max_node_id: usize,
    },
    /// The trial count must be at least one.
    #[error("trial count must be at least 1 (got {got})")]
    InvalidTrialCount {
        /// The invalid trial count supplied by the caller.
        got: usize,
    },
    /// The reliability axis step must lie in `(0, 1]`.
    #[error("reliability step {got} is outside (0, 1]")]
    InvalidReliabilityStep {
        /// The invalid step supplied by the caller.
        got: f64,
    },
    /// A percolation sweep needs at least one edge to define its removal axis.
    #[error("topology has no edges, so the removal fraction step is undefined")]
    EmptyTopology,
}

define_error_codes! {
    /// Stable codes describing [`EstimateError`] variants.
    enum EstimateErrorCode for EstimateError {
        /// A terminal node id lies outside the topology's dense id range.
        InvalidEndpoint => InvalidEndpoint { .. } => "ESTIMATE_INVALID_ENDPOINT",
        /// The trial count must be at least one.
        InvalidTrialCount => InvalidTrialCount { .. } => "ESTIMATE_INVALID_TRIAL_COUNT",
        /// The reliability axis step must lie in `(0, 1]`.
        InvalidReliabilityStep => InvalidReliabilityStep { .. } => "ESTIMATE_INVALID_RELIABILITY_STEP",
        /// A percolation sweep needs at least one edge to define its removal axis.
        EmptyTopology => EmptyTopology => "ESTIMATE_EMPTY_TOPOLOGY",
    }
}

/// Convenient alias for results returned by the estimation API.
pub type Result<T> = core::result::Result<T, EstimateError>;
