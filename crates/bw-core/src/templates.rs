//! Breach notification email templates.
//!
//! Rendering is pure: templates read the incident and recipient they are
//! given and never touch storage. The service layer is responsible for
//! loading rows and picking the template.

use chrono::{DateTime, Utc};

use crate::directory::DpoContact;
use crate::error::CoreError;
use crate::incident::Incident;

/// A fully rendered email ready to hand to a mail transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Destination of a rendered notification.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

/// Badge color for a severity label. Unknown labels get gray.
pub fn severity_color(severity: &str) -> &'static str {
    match severity.to_ascii_lowercase().as_str() {
        "critical" => "#f44336",
        "high" => "#ff9800",
        "medium" => "#ffc107",
        "low" => "#4caf50",
        _ => "#9e9e9e",
    }
}

fn severity_badge(severity: &str) -> String {
    format!(
        "<span style=\"background-color: {}; color: #ffffff; padding: 3px 10px; \
         border-radius: 3px; font-weight: bold;\">{}</span>",
        severity_color(severity),
        severity.to_uppercase()
    )
}

fn format_detected(ts: &DateTime<Utc>) -> String {
    ts.format("%B %-d, %Y at %H:%M UTC").to_string()
}

fn joined_data_types(incident: &Incident) -> String {
    if incident.affected_data_types.is_empty() {
        "Not specified".to_string()
    } else {
        incident.affected_data_types.join(", ")
    }
}

fn require_recipient(recipient: &Recipient) -> Result<(), CoreError> {
    if recipient.email.trim().is_empty() {
        return Err(CoreError::Validation(
            "recipient email is required to render a notification".to_string(),
        ));
    }
    Ok(())
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding: 6px 12px; border: 1px solid #dddddd; font-weight: bold;\">{}</td>\
         <td style=\"padding: 6px 12px; border: 1px solid #dddddd;\">{}</td></tr>",
        label, value
    )
}

/// Renders the GDPR Article 33 report to a supervisory authority.
///
/// The DPO block is included when a contact is available; a missing phone
/// number renders as "Not provided".
pub fn render_gdpr_supervisory(
    incident: &Incident,
    recipient: &Recipient,
    dpo: Option<&DpoContact>,
) -> Result<RenderedEmail, CoreError> {
    require_recipient(recipient)?;

    let subject = format!("GDPR Data Breach Notification - Incident #{}", incident.id);

    let dpo_block = match dpo {
        Some(contact) => format!(
            "<h3 style=\"color: #1a3c6e;\">Data Protection Officer</h3>\
             <p>Name: {}<br>Email: {}<br>Phone: {}</p>",
            contact.name.as_deref().unwrap_or("Not provided"),
            contact.email,
            contact.phone.as_deref().unwrap_or("Not provided"),
        ),
        None => String::new(),
    };

    let html = format!(
        "<html><body style=\"font-family: Arial, sans-serif; color: #333333; max-width: 640px;\">\
         <h2 style=\"color: #1a3c6e;\">GDPR Data Breach Notification</h2>\
         <p><em>Notification to the Supervisory Authority under Article 33 of the General \
         Data Protection Regulation</em></p>\
         <p>In accordance with Article 33 GDPR, we are notifying you of a personal data \
         breach within 72 hours of becoming aware of it.</p>\
         <table style=\"border-collapse: collapse; width: 100%;\">\
         {id_row}{type_row}{severity_row}{detected_row}{data_row}{count_row}\
         </table>\
         <h3 style=\"color: #1a3c6e;\">Description of the Breach</h3>\
         <p>{description}</p>\
         {dpo_block}\
         <p style=\"font-size: 12px; color: #777777;\">Where it is not possible to provide \
         all information at the same time, further information will be provided in phases \
         without undue further delay, as permitted by Article 33(4) GDPR.</p>\
         </body></html>",
        id_row = detail_row("Incident ID", &format!("#{}", incident.id)),
        type_row = detail_row("Incident Type", &incident.incident_type),
        severity_row = detail_row("Severity", &severity_badge(&incident.severity)),
        detected_row = detail_row("Detected At", &format_detected(&incident.detected_at)),
        data_row = detail_row("Data Types Affected", &joined_data_types(incident)),
        count_row = detail_row(
            "Individuals Affected",
            &format!("{} individual(s)", incident.affected_users.len()),
        ),
        description = incident.description,
        dpo_block = dpo_block,
    );

    Ok(RenderedEmail { subject, html })
}

/// Renders the HIPAA Breach Notification Rule report to HHS.
pub fn render_hipaa_hhs(
    incident: &Incident,
    recipient: &Recipient,
) -> Result<RenderedEmail, CoreError> {
    require_recipient(recipient)?;

    let subject = format!("HIPAA Breach Notification - Incident #{}", incident.id);

    let html = format!(
        "<html><body style=\"font-family: Arial, sans-serif; color: #333333; max-width: 640px;\">\
         <h2 style=\"color: #7a1f1f;\">HIPAA Breach Notification</h2>\
         <p><em>Notice to the Secretary of Health and Human Services under the Breach \
         Notification Rule, 45 CFR §§ 164.400-414</em></p>\
         <p>This is a report of a breach of unsecured protected health information as \
         required by the HIPAA Breach Notification Rule.</p>\
         <table style=\"border-collapse: collapse; width: 100%;\">\
         {id_row}{type_row}{severity_row}{detected_row}{phi_row}{count_row}\
         </table>\
         <h3 style=\"color: #7a1f1f;\">Description of the Breach</h3>\
         <p>{description}</p>\
         <p style=\"font-size: 12px; color: #777777;\">A risk assessment has been initiated \
         and affected individuals will be notified as required by 45 CFR § 164.404.</p>\
         </body></html>",
        id_row = detail_row("Incident ID", &format!("#{}", incident.id)),
        type_row = detail_row("Incident Type", &incident.incident_type),
        severity_row = detail_row("Severity", &severity_badge(&incident.severity)),
        detected_row = detail_row("Detected At", &format_detected(&incident.detected_at)),
        phi_row = detail_row("PHI Affected", &joined_data_types(incident)),
        count_row = detail_row(
            "Individuals Affected",
            &format!("{} individual(s)", incident.affected_users.len()),
        ),
        description = incident.description,
    );

    Ok(RenderedEmail { subject, html })
}

/// Renders the plain-language notice to an affected individual.
///
/// The subject and body avoid internal identifiers; the incident id never
/// appears in this template.
pub fn render_individual_patient(
    incident: &Incident,
    recipient: &Recipient,
) -> Result<RenderedEmail, CoreError> {
    require_recipient(recipient)?;

    let subject = "Important Notice Regarding Your Personal Information".to_string();
    let greeting_name = recipient.name.as_deref().unwrap_or("Valued Patient");
    let involved = if incident.affected_data_types.is_empty() {
        "your personal information".to_string()
    } else {
        incident.affected_data_types.join(", ")
    };

    let html = format!(
        "<html><body style=\"font-family: Arial, sans-serif; color: #333333; max-width: 640px;\">\
         <h2 style=\"color: #1a3c6e;\">Important Notice Regarding Your Personal Information</h2>\
         <p>Dear {greeting},</p>\
         <p>We are writing to inform you of a recent incident that may have involved some \
         of your personal information. We take the privacy and security of your information \
         very seriously, and we want to tell you what happened and what we are doing about it.</p>\
         <h3 style=\"color: #1a3c6e;\">What Happened</h3>\
         <p>On {detected}, we detected {description}</p>\
         <h3 style=\"color: #1a3c6e;\">What Information Was Involved</h3>\
         <p>The information involved may have included: {involved}.</p>\
         <h3 style=\"color: #1a3c6e;\">What We Are Doing</h3>\
         <p>We immediately began an investigation, secured the affected systems, and are \
         working with security specialists to prevent this from happening again. We have \
         also notified the appropriate authorities.</p>\
         <h3 style=\"color: #1a3c6e;\">What You Can Do</h3>\
         <p>We recommend that you remain vigilant, review statements from your accounts, \
         and report any suspicious activity. If you have questions, please contact our \
         privacy office.</p>\
         <p>We sincerely apologize for any concern this may cause.</p>\
         </body></html>",
        greeting = greeting_name,
        detected = format_detected(&incident.detected_at),
        description = incident.description,
        involved = involved,
    );

    Ok(RenderedEmail { subject, html })
}

/// Renders the internal alert broadcast to the security distribution list
/// when a new incident is recorded.
pub fn render_internal_alert(incident: &Incident) -> RenderedEmail {
    let subject = format!(
        "[{}] New Breach Incident #{}: {}",
        incident.severity.to_uppercase(),
        incident.id,
        incident.incident_type,
    );

    let html = format!(
        "<html><body style=\"font-family: Arial, sans-serif; color: #333333; max-width: 640px;\">\
         <h2 style=\"color: #1a3c6e;\">New Breach Incident Recorded</h2>\
         <p>{badge}</p>\
         <table style=\"border-collapse: collapse; width: 100%;\">\
         {id_row}{type_row}{detected_row}{users_row}{data_row}{status_row}\
         </table>\
         <h3 style=\"color: #1a3c6e;\">Description</h3>\
         <p>{description}</p>\
         <p style=\"font-size: 12px; color: #777777;\">Review the incident and begin the \
         notification workflow if regulatory deadlines apply.</p>\
         </body></html>",
        badge = severity_badge(&incident.severity),
        id_row = detail_row("Incident ID", &format!("#{}", incident.id)),
        type_row = detail_row("Incident Type", &incident.incident_type),
        detected_row = detail_row("Detected At", &format_detected(&incident.detected_at)),
        users_row = detail_row(
            "Affected Users",
            &incident.affected_users.len().to_string(),
        ),
        data_row = detail_row(
            "Affected Data Types",
            &incident.affected_data_types.len().to_string(),
        ),
        status_row = detail_row("Status", incident.status.as_db_str()),
        description = incident.description,
    );

    RenderedEmail { subject, html }
}
