pub mod form;
pub mod mock;
pub mod transport;

pub use form::{FlowConfig, FormController, SubmitOutcome, UiState};
pub use transport::{HttpTransport, SubmitTransport, TransportError};
