//! One page load: wait for the host document, fetch once, render once.

use actix_web::{get, web, HttpResponse};

use crate::dom::{Document, Selector};
use crate::error::{LifecycleError, RenderError};
use crate::fetch::Fetcher;
use crate::message::MessageCollection;
use crate::render::{append_messages, Renderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Rendered { appended: usize, skipped: usize },
    Failed { reason: String },
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Rendered { .. } => "rendered",
            LoadState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Rendered { .. } | LoadState::Failed { .. })
    }
}

pub struct PageLoad {
    state: LoadState,
    document: Document,
}

impl PageLoad {
    pub fn new(document: Document) -> PageLoad {
        PageLoad {
            state: LoadState::Idle,
            document,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `Idle -> Loading`. Any other starting state is refused.
    pub fn begin(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            LoadState::Idle => {
                self.state = LoadState::Loading;
                Ok(())
            }
            ref other => Err(LifecycleError(other.label())),
        }
    }

    /// Ready handler. Runs at most once; later calls leave the page as is.
    pub async fn on_ready(&mut self, fetcher: &Fetcher, selector: &Selector) -> &LoadState {
        if let Err(e) = self.begin() {
            tracing::debug!(error = %e, "ignoring repeated ready event");
            return &self.state;
        }

        self.state = match fetcher.fetch().await {
            Ok(collection) => self.render(selector, &collection),
            Err(e) => {
                tracing::warn!(error = %e, "could not load messages, leaving list empty");
                LoadState::Failed {
                    reason: e.to_string(),
                }
            }
        };
        &self.state
    }

    fn render(&mut self, selector: &Selector, collection: &MessageCollection) -> LoadState {
        let appended = append_messages(&mut self.document, selector, &collection.messages);
        tracing::debug!(appended, skipped = collection.skipped.len(), "messages rendered");
        LoadState::Rendered {
            appended,
            skipped: collection.skipped.len(),
        }
    }
}

/// Shared by every worker.
pub struct PageState {
    pub renderer: Renderer,
    pub selector: Selector,
}

#[get("/")]
pub async fn get_index(
    data: web::Data<PageState>,
    fetcher: web::Data<Fetcher>,
) -> Result<HttpResponse, RenderError> {
    let mut page = PageLoad::new(Document::host());
    page.on_ready(&fetcher, &data.selector).await;

    let output = data.renderer.render_page(page.document(), page.state())?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubApi;
    use crate::render::test_renderer;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body, call_service, init_service, read_body, TestRequest};
    use actix_web::App;
    use std::time::Duration;

    const TWO: &str = r#"[{"username":"alice","message":"hi"},{"username":"bob","message":"yo"}]"#;

    fn messages() -> Selector {
        "ul#messages".parse().unwrap()
    }

    fn fetcher(url: &str) -> Fetcher {
        Fetcher::new(url, Duration::from_secs(5), 64 * 1024)
    }

    #[test]
    fn begin_only_from_idle() {
        let mut page = PageLoad::new(Document::host());
        assert_eq!(page.state(), &LoadState::Idle);
        page.begin().unwrap();
        assert_eq!(page.state(), &LoadState::Loading);
        assert_eq!(page.begin(), Err(LifecycleError("loading")));
    }

    #[actix_web::test]
    async fn ready_fetches_and_renders() {
        let api = StubApi::start(StatusCode::OK, TWO);
        let mut page = PageLoad::new(Document::host());

        let state = page.on_ready(&fetcher(&api.url), &messages()).await.clone();
        assert_eq!(
            state,
            LoadState::Rendered {
                appended: 2,
                skipped: 0
            }
        );

        let items = page.document().select(&messages()).unwrap().children();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text_content(), "alice: hi");
        assert_eq!(items[1].text_content(), "bob: yo");
        api.stop().await;
    }

    #[actix_web::test]
    async fn second_ready_event_changes_nothing() {
        let api = StubApi::start(StatusCode::OK, TWO);
        let fetcher = fetcher(&api.url);
        let mut page = PageLoad::new(Document::host());

        page.on_ready(&fetcher, &messages()).await;
        page.on_ready(&fetcher, &messages()).await;

        assert!(page.state().is_terminal());
        assert_eq!(page.document().select(&messages()).unwrap().children().len(), 2);
        api.stop().await;
    }

    #[actix_web::test]
    async fn failed_fetch_leaves_list_empty() {
        let api = StubApi::start(StatusCode::BAD_GATEWAY, "");
        let mut page = PageLoad::new(Document::host());

        let state = page.on_ready(&fetcher(&api.url), &messages()).await;
        assert!(matches!(state, LoadState::Failed { .. }));
        assert!(page.document().select(&messages()).unwrap().children().is_empty());
        api.stop().await;
    }

    #[actix_web::test]
    async fn skipped_records_are_counted() {
        let api = StubApi::start(
            StatusCode::OK,
            r#"[{"username":"alice"},{"nope":true},{"username":"bob","message":"yo"}]"#,
        );
        let mut page = PageLoad::new(Document::host());

        let state = page.on_ready(&fetcher(&api.url), &messages()).await;
        assert_eq!(
            state,
            &LoadState::Rendered {
                appended: 2,
                skipped: 1
            }
        );
        api.stop().await;
    }

    #[actix_web::test]
    async fn index_serves_rendered_messages() {
        let api = StubApi::start(StatusCode::OK, TWO);
        let url = api.url.clone();
        let app = init_service(
            App::new()
                .app_data(web::Data::new(PageState {
                    renderer: test_renderer(true),
                    selector: messages(),
                }))
                .app_data(web::Data::new(fetcher(&url)))
                .service(get_index),
        )
        .await;

        let req = TestRequest::get().uri("/").to_request();
        let body = call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();

        assert!(html.contains(r#"data-state="rendered""#));
        assert_eq!(html.matches("<li ").count(), 2);
        let alice = html.find("<strong>alice</strong>:&nbsp;<i>hi</i>").unwrap();
        let bob = html.find("<strong>bob</strong>:&nbsp;<i>yo</i>").unwrap();
        assert!(alice < bob);
        api.stop().await;
    }

    #[actix_web::test]
    async fn index_survives_unreachable_endpoint() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(PageState {
                    renderer: test_renderer(true),
                    selector: messages(),
                }))
                .app_data(web::Data::new(fetcher("http://127.0.0.1:1/api")))
                .service(get_index),
        )
        .await;

        let req = TestRequest::get().uri("/").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains(r#"data-state="failed""#));
        assert_eq!(html.matches("<li ").count(), 0);
    }
}
