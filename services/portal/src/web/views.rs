//! services/portal/src/web/views.rs
//!
//! Server-rendered HTML pages. A full template engine is out of scope; these
//! are small typed builders over a shared layout, with all dynamic values
//! escaped.

use chrono::SecondsFormat;
use portal_core::domain::{Doctor, Notification, Patient};

/// Escapes a value for interpolation into HTML text or attribute position.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shared page chrome: title, nav (varies with auth state), body.
fn layout(title: &str, logged_in: bool, body: &str) -> String {
    let nav = if logged_in {
        r#"<a href="/">Home</a> <a href="/dashboard">Dashboard</a> <a href="/profile">Profile</a> <a href="/logout">Log out</a>"#
    } else {
        r#"<a href="/">Home</a> <a href="/signup">Sign up</a> <a href="/login">Log in</a>"#
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} - Patient Portal</title></head>\n\
         <body>\n<nav>{nav}</nav>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
        nav = nav,
        body = body,
    )
}

pub fn home_page(logged_in: bool) -> String {
    let body = "<h1>Patient Portal</h1>\
                <p>Sign up to send medical reports to your doctor and receive their replies.</p>";
    layout("Home", logged_in, body)
}

pub fn signup_page(logged_in: bool, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Sign up</h1>");
    if let Some(msg) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>", escape(msg)));
    }
    body.push_str(
        "<form method=\"post\" action=\"/signup\">\
         <label>Username <input name=\"username\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <label>Email <input name=\"email\" type=\"email\" required></label>\
         <button type=\"submit\">Sign up</button>\
         </form>",
    );
    layout("Sign up", logged_in, &body)
}

pub fn login_page(logged_in: bool, flash: Option<&str>) -> String {
    let mut body = String::from("<h1>Log in</h1>");
    if let Some(msg) = flash {
        body.push_str(&format!("<p class=\"flash\">{}</p>", escape(msg)));
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\
         <label>Username <input name=\"username\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <button type=\"submit\">Log in</button>\
         </form>",
    );
    layout("Log in", logged_in, &body)
}

pub fn dashboard_page(doctors: &[Doctor], notifications: &[Notification]) -> String {
    let mut body = String::from("<h1>Dashboard</h1><h2>Doctors</h2>");
    if doctors.is_empty() {
        body.push_str("<p>No doctors are available right now.</p>");
    } else {
        body.push_str("<ul>");
        for doctor in doctors {
            let specialty = doctor
                .specialty
                .as_deref()
                .map(|s| format!(" ({})", escape(s)))
                .unwrap_or_default();
            body.push_str(&format!(
                "<li>{}{} <a href=\"/send-report?doctor_id={}\">Send report</a></li>",
                escape(&doctor.name),
                specialty,
                doctor.id,
            ));
        }
        body.push_str("</ul>");
    }

    body.push_str("<h2>Notifications</h2>");
    if notifications.is_empty() {
        body.push_str("<p>No notifications.</p>");
    } else {
        body.push_str("<ul>");
        for n in notifications {
            body.push_str(&format!(
                "<li>{}: {}</li>",
                n.date.to_rfc3339_opts(SecondsFormat::Secs, true),
                escape(&n.report),
            ));
        }
        body.push_str("</ul>");
    }
    layout("Dashboard", true, &body)
}

pub fn send_report_page(doctor_id: Option<i64>) -> String {
    let doctor_id_value = doctor_id.map(|id| id.to_string()).unwrap_or_default();
    let body = format!(
        "<h1>Send a report</h1>\
         <form method=\"post\" action=\"/send-report\" enctype=\"multipart/form-data\">\
         <label>Doctor id <input name=\"doctor_id\" value=\"{}\" required></label>\
         <label>Report <input name=\"report\" type=\"file\" required></label>\
         <button type=\"submit\">Send</button>\
         </form>",
        escape(&doctor_id_value),
    );
    layout("Send report", true, &body)
}

pub fn profile_page(patient: &Patient) -> String {
    let body = format!(
        "<h1>Profile</h1>\
         <dl>\
         <dt>Username</dt><dd>{}</dd>\
         <dt>Email</dt><dd>{}</dd>\
         </dl>",
        escape(&patient.username),
        escape(&patient.email),
    );
    layout("Profile", true, &body)
}

pub fn error_page(logged_in: bool, message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1><p>{}</p><p><a href=\"/dashboard\">Back to dashboard</a></p>",
        escape(message),
    );
    layout("Error", logged_in, &body)
}
