use serde::Serialize;
use tera::{Context, Tera};

use crate::dom::{Document, ListItem, Selector};
use crate::error::RenderError;
use crate::message::Message;
use crate::page::LoadState;

const ITEM_TEMPLATE: &str = "message_item.html";
const PAGE_TEMPLATE: &str = "index.html";

/// Append one list item per message to the container matched by
/// `selector`, in order. Returns how many were appended.
///
/// Never clears the container: rendering the same messages twice leaves
/// both copies in place. A missing container appends nothing.
pub fn append_messages(
    document: &mut Document,
    selector: &Selector,
    messages: &[Message],
) -> usize {
    let container = match document.select_mut(selector) {
        Some(container) => container,
        None => {
            tracing::warn!(%selector, "container element not found, nothing rendered");
            return 0;
        }
    };
    for message in messages {
        container.append(ListItem::from(message));
    }
    messages.len()
}

#[derive(Serialize)]
struct ElementView<'a> {
    tag: &'a str,
    id: &'a str,
    items: Vec<String>,
}

/// Turns documents into HTML through tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load templates from `glob`. With `escape_markup` off, usernames and
    /// messages are inserted verbatim.
    pub fn new(glob: &str, escape_markup: bool) -> Result<Renderer, RenderError> {
        let tera = Tera::new(glob)?;
        Ok(Renderer::from_tera(tera, escape_markup))
    }

    pub fn from_tera(mut tera: Tera, escape_markup: bool) -> Renderer {
        if !escape_markup {
            tracing::warn!("markup escaping disabled, message text is inserted as raw HTML");
            tera.autoescape_on(vec![]);
        }
        Renderer { tera }
    }

    pub fn render_item(&self, item: &ListItem) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("has_username", &item.username.is_some());
        context.insert("has_message", &item.message.is_some());
        context.insert("username", &item.username);
        context.insert("message", &item.message);
        let html = self.tera.render(ITEM_TEMPLATE, &context)?;
        Ok(html.trim_end().to_string())
    }

    pub fn render_page(
        &self,
        document: &Document,
        state: &LoadState,
    ) -> Result<String, RenderError> {
        let mut elements = Vec::with_capacity(document.elements().len());
        for element in document.elements() {
            let items = element
                .children()
                .iter()
                .map(|item| self.render_item(item))
                .collect::<Result<Vec<_>, _>>()?;
            elements.push(ElementView {
                tag: &element.tag,
                id: &element.id,
                items,
            });
        }

        let mut context = Context::new();
        context.insert("elements", &elements);
        context.insert("state", state.label());
        Ok(self.tera.render(PAGE_TEMPLATE, &context)?)
    }
}

#[cfg(test)]
pub(crate) fn test_renderer(escape_markup: bool) -> Renderer {
    Renderer::new(
        concat!(env!("CARGO_MANIFEST_DIR"), "/templates/*.html"),
        escape_markup,
    )
    .unwrap()
}
