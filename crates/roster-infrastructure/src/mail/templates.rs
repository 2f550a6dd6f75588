//! Handlebars templates for outgoing mail

use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::json;

use roster_core::ports::PasswordLinkMail;

pub const PASSWORD_LINK_SUBJECT: &str = "password_link_subject";
pub const PASSWORD_LINK_HTML: &str = "password_link_html";

const SUBJECT: &str = "{{{organization}}}: set your roster password";

const HTML: &str = r#"<p>Hello {{employee_name}},</p>
<p>{{organization}} invited you to set a password for the shift roster.</p>
<p><a href="{{{link}}}">Set your password</a></p>
<p>The link works once and expires in {{expires_hours}} hours.</p>"#;

pub fn registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string(PASSWORD_LINK_SUBJECT, SUBJECT)?;
    handlebars.register_template_string(PASSWORD_LINK_HTML, HTML)?;
    Ok(handlebars)
}

/// Renders `(subject, html body)`.
pub fn render_password_link(
    handlebars: &Handlebars<'static>,
    mail: &PasswordLinkMail,
    expires_hours: i64,
) -> Result<(String, String), RenderError> {
    let data = json!({
        "employee_name": mail.employee_name,
        "organization": mail.organization,
        "link": mail.link,
        "expires_hours": expires_hours,
    });
    Ok((
        handlebars.render(PASSWORD_LINK_SUBJECT, &data)?,
        handlebars.render(PASSWORD_LINK_HTML, &data)?,
    ))
}
