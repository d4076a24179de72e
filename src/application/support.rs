//! Public contact and data-deletion requests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::forms::{Checker, FieldError};
use crate::domain::errors::DomainError;
use crate::domain::ports::SupportDesk;
use crate::domain::user::{NewSupportTicket, SupportTicket};

pub const DELETION_REQUESTER: &str = "Solicitação de Exclusão";
pub const DELETION_SUBJECT: &str = "Exclusão de Conta e Dados";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

fn check_email(check: &mut Checker, value: &str) -> Option<String> {
    let email = check.required("email", value)?;
    if !email.contains('@') {
        check.fail("email", FieldError::Invalid("must be an email address".into()));
        return None;
    }
    Some(email)
}

pub struct SupportService {
    desk: Arc<dyn SupportDesk>,
}

impl SupportService {
    pub fn new(desk: Arc<dyn SupportDesk>) -> Self {
        Self { desk }
    }

    pub fn open_ticket(&self, form: &TicketForm) -> Result<SupportTicket, DomainError> {
        let mut check = Checker::default();
        let name = check.required("name", &form.name);
        let email = check_email(&mut check, &form.email);
        let subject = check.required("subject", &form.subject);
        let message = check.required("message", &form.message);
        let (Some(name), Some(email), Some(subject), Some(message)) = (name, email, subject, message)
        else {
            return Err(check.into_errors().into());
        };
        let ticket = self.desk.open_ticket(&NewSupportTicket {
            name,
            email,
            subject,
            message,
        })?;
        log::info!("support ticket {} opened", ticket.id);
        Ok(ticket)
    }

    pub fn request_data_deletion(&self, email: &str) -> Result<SupportTicket, DomainError> {
        let mut check = Checker::default();
        let Some(email) = check_email(&mut check, email) else {
            return Err(check.into_errors().into());
        };
        let message =
            format!("Solicitação de exclusão de conta e dados pessoais para o email: {email}");
        let ticket = self.desk.open_ticket(&NewSupportTicket {
            name: DELETION_REQUESTER.into(),
            email,
            subject: DELETION_SUBJECT.into(),
            message,
        })?;
        log::info!("data deletion request {} opened", ticket.id);
        Ok(ticket)
    }
}
