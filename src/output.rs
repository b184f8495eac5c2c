//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Local};

use crate::{Assignment, Member, Site};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn time(value: DateTime<Local>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

impl PrettyPrint for Site {
    fn pretty_print(&self) -> String {
        let header = format!("Site: {}", self.id());
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Title:          {}", self.title().unwrap_or_default()),
        ];

        if let Some(site_type) = self.site_type() {
            lines.push(format!("Type:           {}", site_type));
        }

        if let Some(term) = self.term() {
            lines.push(format!("Term:           {}", term));
        }

        if let Some(owner) = self.owner() {
            lines.push(format!("Owner:          {}", owner));
        }

        match (self.contact_name(), self.contact_email()) {
            (Some(name), Some(email)) => lines.push(format!("Contact:        {} <{}>", name, email)),
            (Some(name), None) => lines.push(format!("Contact:        {}", name)),
            (None, Some(email)) => lines.push(format!("Contact:        {}", email)),
            (None, None) => {}
        }

        if let Some(published) = self.is_published() {
            lines.push(format!("Published:      {}", yes_no(published)));
        }

        if let Some(created) = self.created_time() {
            lines.push(format!("Created:        {}", time(created)));
        }

        if let Some(modified) = self.modified_time() {
            lines.push(format!("Modified:       {}", time(modified)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Assignment {
    fn pretty_print(&self) -> String {
        let header = format!("Assignment: {}", self.id());
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Title:          {}", self.title().unwrap_or_default()),
        ];

        if let Some(status) = self.status() {
            lines.push(format!("Status:         {}", status));
        }

        if let Some(scale) = self.grade_scale() {
            match self.grade_scale_max_points() {
                Some(max) => lines.push(format!("Grade Scale:    {} (max {})", scale, max)),
                None => lines.push(format!("Grade Scale:    {}", scale)),
            }
        }

        if let Some(due) = self.due_time() {
            lines.push(format!("Due:            {}", time(due)));
        }

        if let Some(close) = self.close_time() {
            lines.push(format!("Closes:         {}", time(close)));
        }

        if let Some(kind) = self.submission_type() {
            lines.push(format!("Submission:     {}", kind));
        }

        if let Some(resubmit) = self.is_resubmittable() {
            lines.push(format!("Resubmission:   {}", yes_no(resubmit)));
        }

        if self.is_draft() == Some(true) {
            lines.push("Draft:          yes".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Member {
    fn pretty_print(&self) -> String {
        let header = format!("Member: {}", self.user_eid().unwrap_or(self.user_id()));
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("User ID:        {}", self.user_id()),
            format!("Name:           {}", self.name().unwrap_or_default()),
        ];

        if let Some(role) = self.role() {
            lines.push(format!("Role:           {}", role));
        }

        if let Some(email) = self.email() {
            lines.push(format!("Email:          {}", email));
        }

        if let Some(active) = self.is_active() {
            lines.push(format!("Active:         {}", yes_no(active)));
        }

        if let Some(login) = self.last_login_time() {
            lines.push(format!("Last Login:     {}", time(login)));
        }

        lines.join("\n")
    }
}
