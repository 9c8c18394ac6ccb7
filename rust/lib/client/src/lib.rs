//! Intake HTTP client.
//!
//! [`SubmissionClient`] talks to the submission service; submits are
//! retried a bounded number of times on transient network failures.
//! [`FormSession`] couples a [`intake_form::FormState`] with a client so the
//! draft is cleared only after the server acknowledged the submission.
//!
//! # Usage
//!
//! ```ignore
//! use intake_client::{FormSession, SubmissionClient};
//!
//! let client = SubmissionClient::new("http://localhost:5000")?;
//! let mut session = FormSession::new(FormState::new(store), client);
//! let outcome = session.submit().await;
//! ```

mod client;
mod error;
mod retry;
mod session;
mod transport;


pub use client::{Health, PageInfo, SubmissionClient, SubmissionPage, SubmitOutcome};
pub use error::{ApiError, FieldError};
pub use intake_form::Submission;
pub use retry::{NoDelay, RetryPolicy, Sleeper, TokioSleeper};
pub use session::FormSession;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, REQUEST_TIMEOUT};
