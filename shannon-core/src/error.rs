use thiserror::Error;

/// Failures raised while building or sampling a model.
///
/// Every variant is local to one model: a failed build or a failed
/// generation never affects the other models built from the same corpus.
#[derive(Error, Debug)]
pub enum ModelError {
	/// The corpus holds no symbol at all, so no window of `order + 1` fits.
	#[error("empty corpus: no window of length {} available", .order + 1)]
	EmptyCorpus { order: usize },

	/// The requested context length does not fit in the corpus.
	#[error("invalid order {order} for a corpus of {length} symbols")]
	InvalidOrder { order: usize, length: usize },

	/// A context row with zero total mass was handed to the normalizer.
	#[error("division by zero while normalizing context {context:?}")]
	DivisionByZero { context: String },

	/// The sliding window reached a context never seen in the corpus.
	#[error("context not found: {context:?}")]
	ContextNotFound { context: String },

	/// A generation parameter is out of its valid range.
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

// `std::io::Error` is not `Clone`; its kind and message are carried over.
impl Clone for ModelError {
	fn clone(&self) -> Self {
		match self {
			Self::EmptyCorpus { order } => Self::EmptyCorpus { order: *order },
			Self::InvalidOrder { order, length } => Self::InvalidOrder { order: *order, length: *length },
			Self::DivisionByZero { context } => Self::DivisionByZero { context: context.clone() },
			Self::ContextNotFound { context } => Self::ContextNotFound { context: context.clone() },
			Self::InvalidParameter(message) => Self::InvalidParameter(message.clone()),
			Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
		}
	}
}
