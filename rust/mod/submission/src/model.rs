use intake_form::FormFields;

pub use intake_form::Submission;

/// Create request body. Client-supplied `id`, `submittedAt` and
/// `timestamp` are accepted and dropped.
pub type CreateSubmission = FormFields;
