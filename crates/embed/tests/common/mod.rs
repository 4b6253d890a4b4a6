#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Shared fixtures for integration tests.
//!
//! Entities are built with the test-utils builders and served by the REAL
//! in-memory storage, view builder and renderer through [`EmbedHarness`].

#![allow(dead_code)]

use entity_embed::content::formats::{EMBEDDED_HTML, FILTERED_HTML};
use entity_embed::models::{Account, Entity};
use entity_embed_test_utils::{id_marker, test_entity, test_user};

/// Published page with a teaser summary and a German title.
pub fn first() -> Entity {
    test_entity(1, "page", "First")
        .with_text_field("body", "<p>First body</p>", FILTERED_HTML)
        .with_field("summary", serde_json::json!("Short summary"))
        .with_translated_title("de", "Erster")
        .build()
}

/// Published page whose body embeds [`first`] as a teaser.
pub fn second() -> Entity {
    let body = format!("<p>See also:</p>{}", id_marker("item", 1, "teaser"));
    test_entity(2, "page", "Second")
        .with_text_field("body", &body, EMBEDDED_HTML)
        .build()
}

/// Published page whose body embeds itself.
pub fn mirror() -> Entity {
    test_entity(3, "page", "Mirror")
        .with_text_field("body", &id_marker("item", 3, "full"), EMBEDDED_HTML)
        .build()
}

/// Unpublished draft.
pub fn draft() -> Entity {
    test_entity(4, "page", "Draft")
        .unpublished()
        .with_text_field("body", "<p>Secret</p>", FILTERED_HTML)
        .build()
}

/// Published page with markup the filtered format strips.
pub fn scripted() -> Entity {
    test_entity(5, "page", "Scripted")
        .with_text_field(
            "body",
            "<p onclick=\"steal()\">Safe</p><script>steal()</script>",
            FILTERED_HTML,
        )
        .build()
}

pub fn all_entities() -> Vec<Entity> {
    vec![first(), second(), mirror(), draft(), scripted()]
}

/// Anonymous visitor allowed to see published content.
pub fn visitor() -> Account {
    Account {
        permissions: vec!["access content".to_string()],
        ..Account::anonymous()
    }
}

/// Editor allowed to see everything.
pub fn editor() -> Account {
    test_user(&["administer site"])
}
