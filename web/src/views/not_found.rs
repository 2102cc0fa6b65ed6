use crate::Route;
use dioxus::prelude::*;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");

    rsx! {
        main { class: "main-content",
            div { class: "page-header",
                h1 { class: "page-title", "Not found" }
                p { class: "page-subtitle", "Nothing lives at /{path}." }
            }
            Link { to: Route::Home {}, class: "btn btn-secondary", "Back" }
        }
    }
}
