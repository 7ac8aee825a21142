use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "booksdb=info";

/// Identifier attached to every log line of one CLI invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvocationId(pub Uuid);

impl InvocationId {
    /// Creates a new random invocation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Installs the global subscriber
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Span wrapping one command run
pub fn invocation_span(id: InvocationId, command: &str) -> tracing::Span {
    tracing::info_span!("invocation", invocation_id = %id, command = %command)
}
