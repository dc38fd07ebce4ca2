//! Newsletter subscription form model.
//!
//! Fields are checked with the shared newsletter rules before anything is
//! sent. A successful submission clears the form; a failed one keeps the
//! entered values so the user can retry.

use shared::{
    domain::SubscriptionId,
    error::FieldError,
    protocol::NewsletterRequest,
    validation::validate_newsletter,
};
use tracing::{info, warn};

use crate::source::SubscriptionSink;

pub const SUCCESS_MESSAGE: &str = "Subscribed successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid,
    Submitted(SubscriptionId),
    Failed,
}

#[derive(Debug, Default)]
pub struct NewsletterForm {
    values: NewsletterRequest,
    errors: Vec<FieldError>,
    attempted: bool,
    submitting: bool,
    notice: Option<Notice>,
}

impl NewsletterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &NewsletterRequest {
        &self.values
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.values.name = name.into();
        self.revalidate();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.values.email = email.into();
        self.revalidate();
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit stays disabled while a submission is in flight or a field is invalid.
    pub fn can_submit(&self) -> bool {
        !self.submitting && validate_newsletter(&self.values).is_ok()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn reset(&mut self) {
        self.values = NewsletterRequest::default();
        self.errors.clear();
        self.attempted = false;
    }

    pub async fn submit(&mut self, sink: &dyn SubscriptionSink) -> SubmitOutcome {
        self.attempted = true;
        if let Err(errors) = validate_newsletter(&self.values) {
            self.errors = errors;
            return SubmitOutcome::Invalid;
        }
        self.errors.clear();

        self.submitting = true;
        let result = sink.subscribe(&self.values).await;
        self.submitting = false;

        match result {
            Ok(response) => {
                info!(subscription_id = response.subscription_id.0, "newsletter subscription accepted");
                self.notice = Some(Notice::Success(SUCCESS_MESSAGE.to_string()));
                self.reset();
                SubmitOutcome::Submitted(response.subscription_id)
            }
            Err(err) => {
                warn!(error = %err, "newsletter subscription failed");
                self.errors = err.field_errors().to_vec();
                self.notice = Some(Notice::Error(err.user_message()));
                SubmitOutcome::Failed
            }
        }
    }

    // Field messages only appear after the first submit attempt, then track edits.
    fn revalidate(&mut self) {
        if !self.attempted {
            return;
        }
        self.errors = match validate_newsletter(&self.values) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        };
    }
}

#[cfg(test)]
#[path = "tests/newsletter_tests.rs"]
mod tests;
