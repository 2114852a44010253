//! Server-rendered HTML pages.
//!
//! All user supplied text passes through [`escape`] before it reaches markup.
use axum::http::StatusCode;
use complaint_desk_common::{Complaint, ComplaintStatus, Flash, FlashLevel, Role, SessionUser, User};

use crate::validation::{ComplaintForm, RegisterForm};
use crate::workflow::{DepartmentGroup, RESOLVER_STATUSES};

/// Escape text for use in HTML content and attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Per-request data every page needs
pub struct PageContext<'a> {
    pub user: Option<&'a SessionUser>,
    pub flashes: Vec<Flash>,
}

impl<'a> PageContext<'a> {
    pub fn new(user: Option<&'a SessionUser>, flashes: Vec<Flash>) -> Self {
        Self { user, flashes }
    }
}

fn nav(user: Option<&SessionUser>) -> String {
    match user {
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
        Some(user) => {
            let links = match user.role {
                Role::Student => {
                    r#"<a href="/">Dashboard</a> <a href="/complaint">File a complaint</a> <a href="/my-complaints">My complaints</a>"#
                },
                Role::Admin => r#"<a href="/admin">Admin</a>"#,
                Role::Resolver => r#"<a href="/resolver">Assigned complaints</a>"#,
                Role::JuniorEngineer => r#"<a href="/jeng">Department complaints</a>"#,
            };
            format!(
                r#"{links} <span class="who">{} ({})</span> <a href="/logout">Logout</a>"#,
                escape(&user.name),
                user.role.label()
            )
        },
    }
}

fn flash_list(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            let class = match f.level {
                FlashLevel::Success => "flash success",
                FlashLevel::Error => "flash error",
            };
            format!(r#"<div class="{class}">{}</div>"#, escape(&f.message))
        })
        .collect()
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!(r#"<ul class="errors">{items}</ul>"#)
}

fn layout(title: &str, ctx: &PageContext<'_>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | Complaint Desk</title></head>
<body>
<nav>{nav}</nav>
{flashes}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav(ctx.user),
        flashes = flash_list(&ctx.flashes),
    )
}

pub fn error_page(status: StatusCode, code: &str, message: &str) -> String {
    let ctx = PageContext::new(None, Vec::new());
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        &ctx,
        &format!(
            r#"<p class="error-code">{}</p><p>{}</p>"#,
            escape(code),
            escape(message)
        ),
    )
}

pub fn login_page(ctx: &PageContext<'_>) -> String {
    layout(
        "Login",
        ctx,
        r#"<form method="post" action="/login">
<label>Username <input name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Login</button>
</form>"#,
    )
}

pub fn register_page(ctx: &PageContext<'_>, errors: &[String], form: &RegisterForm) -> String {
    let roles: String = Role::ALL
        .iter()
        .map(|role| {
            let selected = if form.role.trim().eq_ignore_ascii_case(role.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                role.as_str(),
                role.label()
            )
        })
        .collect();

    layout(
        "Register",
        ctx,
        &format!(
            r#"{errors}<form method="post" action="/register">
<label>Name <input name="name" value="{name}"></label>
<label>Username <input name="username" value="{username}"></label>
<label>Email <input type="email" name="email" value="{email}"></label>
<label>Password <input type="password" name="password"></label>
<label>Confirm password <input type="password" name="password2"></label>
<label>Role <select name="role"><option value="">Choose a role</option>{roles}</select></label>
<label>Department <input name="department" value="{department}"></label>
<button type="submit">Register</button>
</form>"#,
            errors = error_list(errors),
            name = escape(&form.name),
            username = escape(&form.username),
            email = escape(&form.email),
            department = escape(&form.department),
        ),
    )
}

pub fn dashboard(ctx: &PageContext<'_>) -> String {
    let greeting = match ctx.user {
        Some(user) => format!(
            "<p>Welcome, {}. You are signed in as {} ({}).</p>",
            escape(&user.name),
            user.role.label(),
            escape(&user.department)
        ),
        None => String::new(),
    };
    layout("Dashboard", ctx, &greeting)
}

pub fn complaint_form(ctx: &PageContext<'_>, errors: &[String], form: &ComplaintForm) -> String {
    layout(
        "File a complaint",
        ctx,
        &format!(
            r#"{errors}<form method="post" action="/registerComplaint">
<label>Title <input name="title" value="{title}"></label>
<label>Description <textarea name="description">{description}</textarea></label>
<button type="submit">Submit</button>
</form>"#,
            errors = error_list(errors),
            title = escape(&form.title),
            description = escape(&form.description),
        ),
    )
}

fn assignee(complaint: &Complaint) -> String {
    complaint
        .assignment
        .as_ref()
        .map(|a| escape(&a.resolver_username))
        .unwrap_or_else(|| "Unassigned".to_string())
}

fn status_form(complaint: &Complaint, choices: &[ComplaintStatus]) -> String {
    let options: String = choices
        .iter()
        .map(|status| {
            let selected = if *status == complaint.status { " selected" } else { "" };
            format!(r#"<option value="{0}"{selected}>{0}</option>"#, status.label())
        })
        .collect();
    format!(
        r#"<form method="post" action="/updateStatus"><input type="hidden" name="complaintID" value="{}"><select name="status">{options}</select><button type="submit">Update</button></form>"#,
        complaint.id
    )
}

fn complaint_row(complaint: &Complaint, extra: &str) -> String {
    format!(
        "<tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{extra}</td></tr>",
        complaint.number,
        escape(&complaint.title),
        escape(&complaint.description),
        complaint.status,
        assignee(complaint),
        complaint.created_at.format("%Y-%m-%d %H:%M"),
    )
}

fn complaint_table(rows: String) -> String {
    format!(
        "<table><thead><tr><th>No.</th><th>Title</th><th>Description</th><th>Status</th><th>Assigned to</th><th>Filed</th><th></th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

pub fn my_complaints(ctx: &PageContext<'_>, complaints: &[Complaint]) -> String {
    let body = if complaints.is_empty() {
        r#"<p>You have not filed any complaints yet. <a href="/complaint">File one</a>.</p>"#
            .to_string()
    } else {
        complaint_table(complaints.iter().map(|c| complaint_row(c, "")).collect())
    };
    layout("My complaints", ctx, &body)
}

pub fn admin_page(
    ctx: &PageContext<'_>,
    groups: &[DepartmentGroup],
    resolvers: &[User],
    errors: &[String],
) -> String {
    let resolver_options: String = resolvers
        .iter()
        .map(|r| {
            format!(
                r#"<option value="{0}">{0} ({1})</option>"#,
                escape(&r.username),
                escape(&r.name)
            )
        })
        .collect();

    let mut body = error_list(errors);
    if groups.is_empty() {
        body.push_str("<p>No complaints have been filed.</p>");
    }
    for group in groups {
        let rows: String = group
            .complaints
            .iter()
            .map(|c| {
                let assign = format!(
                    r#"<form method="post" action="/assign"><input type="hidden" name="complaintID" value="{}"><select name="resolverName">{resolver_options}</select><button type="submit">Assign</button></form>"#,
                    c.id
                );
                complaint_row(c, &(assign + &status_form(c, &ComplaintStatus::ALL)))
            })
            .collect();
        body.push_str(&format!(
            r#"<section class="department"><h2>{}</h2>{}</section>"#,
            escape(&group.department),
            complaint_table(rows)
        ));
    }

    layout("Admin", ctx, &body)
}

pub fn resolver_page(ctx: &PageContext<'_>, complaints: &[Complaint]) -> String {
    let body = if complaints.is_empty() {
        "<p>No complaints are assigned to you.</p>".to_string()
    } else {
        complaint_table(
            complaints
                .iter()
                .map(|c| complaint_row(c, &status_form(c, &RESOLVER_STATUSES)))
                .collect(),
        )
    };
    layout("Assigned complaints", ctx, &body)
}

pub fn engineer_page(ctx: &PageContext<'_>, department: &str, complaints: &[Complaint]) -> String {
    let body = if complaints.is_empty() {
        format!("<p>No complaints from {}.</p>", escape(department))
    } else {
        complaint_table(complaints.iter().map(|c| complaint_row(c, "")).collect())
    };
    layout(&format!("Complaints from {department}"), ctx, &body)
}
