use super::*;

fn request(name: &str, email: &str) -> NewsletterRequest {
    NewsletterRequest {
        name: name.to_string(),
        email: email.to_string(),
    }
}

#[test]
fn accepts_well_formed_submission() {
    let valid = validate_newsletter(&request(" A ", "a@b.com")).expect("valid");
    assert_eq!(valid.name, "A");
    assert_eq!(valid.email, "a@b.com");
}

#[test]
fn rejects_malformed_emails() {
    for email in [
        "",
        "plain",
        "a@b",
        "@b.com",
        "a@.com",
        ".a@b.com",
        "a..b@c.com",
        "a@b.c",
        "a b@c.com",
    ] {
        assert!(!is_valid_email(email), "{email} should be rejected");
    }
}

#[test]
fn accepts_common_email_shapes() {
    for email in ["a@b.com", "first.last+tag@sub.example.org", "x_y@a-b.io"] {
        assert!(is_valid_email(email), "{email} should be accepted");
    }
}

#[test]
fn reports_every_failing_field() {
    let errors = validate_newsletter(&request("   ", "nope")).expect_err("invalid");
    assert_eq!(
        errors,
        vec![
            FieldError::new("name", NAME_REQUIRED),
            FieldError::new("email", INVALID_EMAIL),
        ]
    );
}

#[test]
fn email_only_failure_keeps_name_clean() {
    let errors = validate_newsletter(&request("A", "a@b")).expect_err("invalid");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "email");
}
