mod engine;
mod page;
mod rpc;

use constants::render_settings::HERO_CANVAS_SELECTOR;

use crate::engine::core::app_setup::create_app;
use crate::engine::core::context::{ContextError, VisualsContext};

fn main() {
    let context = match build_context() {
        Ok(context) => context,
        Err(err) => {
            eprintln!("Visual layer not started: {err}");
            return;
        }
    };
    let mut app = create_app(context);

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

/// The scene only starts when the page carries its canvas.
#[cfg(target_arch = "wasm32")]
fn build_context() -> Result<VisualsContext, ContextError> {
    use crate::page::document::PageDocument;
    use crate::page::web_document::WebDocument;

    let builder = VisualsContext::builder();
    let mut document = match WebDocument::attach() {
        Ok(document) => document,
        Err(err) => {
            web_sys::console::error_1(&format!("Page unavailable: {err}").into());
            return builder.build();
        }
    };

    let has_canvas = !document.query_all(HERO_CANVAS_SELECTOR).is_empty();
    let builder = builder.document(document);
    if has_canvas {
        builder.canvas(HERO_CANVAS_SELECTOR).build()
    } else {
        builder.build()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_context() -> Result<VisualsContext, ContextError> {
    use crate::page::headless::HeadlessDocument;

    println!("→ Native run: synthetic page, scroll with the mouse wheel");
    VisualsContext::builder()
        .document(HeadlessDocument::synthetic_page(1280.0, 720.0))
        .canvas(HERO_CANVAS_SELECTOR)
        .build()
}

#[cfg(test)]
mod test_support;
