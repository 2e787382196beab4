//! Client side of the order landing page: the order form controller and the
//! product image carousel.
//!
//! Nothing here touches a real DOM. [`form::FormModel`] carries what the page
//! markup shows, and any UI layer can mirror it after each call.

pub mod carousel;
pub mod controller;
pub mod form;
pub mod state;
pub mod timers;
pub mod transport;

pub use carousel::{Carousel, CarouselError};
pub use controller::{ControllerConfig, OrderSubmissionController, DEFAULT_RESET_DELAY};
pub use form::{FormModel, SubmitLabels};
pub use state::{FormEvent, FormUiState, SubmitFailure};
pub use transport::{HttpOrderTransport, MissingOrderTransport, OrderTransport, SubmitOutcome, TransportError};
