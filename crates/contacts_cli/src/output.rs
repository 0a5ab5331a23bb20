//! Text and JSON rendering for command results.

use contacts_core::{Contact, ContactId};
use serde_json::json;

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn message(&self, message: &str) {
        if self.json {
            println!("{}", json!({ "message": message }));
        } else {
            println!("{message}");
        }
    }

    pub fn created(&self, id: ContactId) {
        if self.json {
            println!("{}", json!({ "id": id }));
        } else {
            println!("Added contact {id}");
        }
    }

    pub fn count(&self, count: i64) {
        if self.json {
            println!("{}", json!({ "count": count }));
        } else {
            println!("{count}");
        }
    }

    pub fn contact(&self, contact: &Contact) -> serde_json::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(contact)?);
        } else {
            println!("{}", render_row(contact));
        }
        Ok(())
    }

    pub fn contacts(&self, contacts: &[Contact]) -> serde_json::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(contacts)?);
            return Ok(());
        }
        if contacts.is_empty() {
            println!("No contacts");
            return Ok(());
        }
        for contact in contacts {
            println!("{}", render_row(contact));
        }
        println!("Total: {}", contacts.len());
        Ok(())
    }
}

fn render_row(contact: &Contact) -> String {
    format!(
        "{:>5}  {:<32}  {:<32}  {}",
        contact.id,
        contact.display_name(),
        contact.email,
        contact.mobile
    )
}
