// crates.io
use tracing::instrument::Instrumented;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{_prelude::*, config::LoggingConfig, error::ConfigError, obs::OperationKind};

/// A span builder used by pet and OAuth operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("petstore.operation", operation = kind.as_str(), stage);

		Self { span }
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> tracing::span::EnteredSpan {
		self.span.entered()
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Fails when the level directive is invalid or
/// a subscriber is already installed.
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), ConfigError> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.level)
			.map_err(|e| ConfigError::invalid("logging.level", e.to_string()))?,
	};
	let fmt_layer = if config.json {
		tracing_subscriber::fmt::layer().json().with_filter(filter).boxed()
	} else {
		tracing_subscriber::fmt::layer().with_filter(filter).boxed()
	};

	tracing_subscriber::registry()
		.with(fmt_layer)
		.try_init()
		.map_err(|e| ConfigError::Logging { reason: e.to_string() })
}
