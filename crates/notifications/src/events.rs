use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// An email waiting to be rendered and sent. Events are plain data so that
/// dispatch stays decoupled from the domain crates.
#[derive(Clone, Debug)]
pub enum EmailEvent {
    ApplicationReceived {
        recipient: String,
        user_name: String,
        course_title: String,
        applied_at: DateTime<Utc>,
    },
    AdminApplicationAlert {
        recipient: String,
        user_name: String,
        user_email: String,
        course_title: String,
        applied_at: DateTime<Utc>,
    },
    PaymentConfirmed {
        recipient: String,
        user_name: String,
        course_title: String,
        amount: Decimal,
        reference: String,
        paid_at: DateTime<Utc>,
    },
    ContactMessageReceived {
        recipient: String,
        sender_name: String,
        sender_email: String,
        subject: String,
        body: String,
    },
    PasswordReset {
        recipient: String,
        user_name: String,
        reset_url: String,
    },
}

impl EmailEvent {
    pub fn recipient(&self) -> &str {
        match self {
            EmailEvent::ApplicationReceived { recipient, .. }
            | EmailEvent::AdminApplicationAlert { recipient, .. }
            | EmailEvent::PaymentConfirmed { recipient, .. }
            | EmailEvent::ContactMessageReceived { recipient, .. }
            | EmailEvent::PasswordReset { recipient, .. } => recipient,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            EmailEvent::ApplicationReceived { course_title, .. } => {
                format!("Course Application Confirmation - {course_title}")
            }
            EmailEvent::AdminApplicationAlert { course_title, .. } => {
                format!("New Course Application - {course_title}")
            }
            EmailEvent::PaymentConfirmed { course_title, .. } => {
                format!("Payment Confirmation - {course_title}")
            }
            EmailEvent::ContactMessageReceived { subject, .. } => {
                format!("New Contact Form Submission - {subject}")
            }
            EmailEvent::PasswordReset { .. } => "Password Reset Request".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            EmailEvent::ApplicationReceived {
                user_name,
                course_title,
                applied_at,
                ..
            } => format!(
                "Dear {user_name},\n\n\
                 Your application for {course_title} was received on {} and is \
                 now awaiting payment.\n\n\
                 You can complete the payment from the course page at any time.\n",
                applied_at.format("%B %d, %Y at %H:%M"),
            ),
            EmailEvent::AdminApplicationAlert {
                user_name,
                user_email,
                course_title,
                applied_at,
                ..
            } => format!(
                "A new course application has been submitted:\n\n\
                 - Student: {user_name} ({user_email})\n\
                 - Course: {course_title}\n\
                 - Application Date: {}\n\n\
                 Please review the application in the admin dashboard.\n",
                applied_at.format("%B %d, %Y at %H:%M"),
            ),
            EmailEvent::PaymentConfirmed {
                user_name,
                course_title,
                amount,
                reference,
                paid_at,
                ..
            } => format!(
                "Dear {user_name},\n\n\
                 Your payment for {course_title} has been successfully processed!\n\n\
                 Payment Details:\n\
                 - Course: {course_title}\n\
                 - Amount: {amount}\n\
                 - Payment Date: {}\n\
                 - Reference: {reference}\n\n\
                 You will receive your course materials and further instructions \
                 shortly.\n",
                paid_at.format("%B %d, %Y at %H:%M"),
            ),
            EmailEvent::ContactMessageReceived {
                sender_name,
                sender_email,
                subject,
                body,
                ..
            } => format!(
                "A new message has been received through the contact form:\n\n\
                 - Name: {sender_name}\n\
                 - Email: {sender_email}\n\
                 - Subject: {subject}\n\n\
                 Message:\n{body}\n\n\
                 Please respond to the sender at: {sender_email}\n",
            ),
            EmailEvent::PasswordReset {
                user_name,
                reset_url,
                ..
            } => format!(
                "Hello {user_name},\n\n\
                 We received a request to reset the password for your account.\n\n\
                 If you made this request, open the link below to choose a new \
                 password:\n{reset_url}\n\n\
                 The link expires in 1 hour. If you didn't request a reset, you \
                 can ignore this email and your password will remain unchanged.\n",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn payment_confirmation_mentions_reference_and_amount() {
        let event = EmailEvent::PaymentConfirmed {
            recipient: "student@example.com".to_string(),
            user_name: "Ada".to_string(),
            course_title: "Networking Basics".to_string(),
            amount: Decimal::from(45_000),
            reference: "PAY_ABCDEF1234".to_string(),
            paid_at: Utc::now(),
        };

        assert_eq!(event.recipient(), "student@example.com");
        assert!(event.subject().contains("Networking Basics"));
        assert!(event.body().contains("PAY_ABCDEF1234"));
        assert!(event.body().contains("45000"));
    }

    #[test]
    fn password_reset_embeds_the_link() {
        let event = EmailEvent::PasswordReset {
            recipient: "student@example.com".to_string(),
            user_name: "Ada".to_string(),
            reset_url: "https://example.com/reset-password?token=abc".to_string(),
        };

        assert!(event.body().contains("https://example.com/reset-password?token=abc"));
    }
}
