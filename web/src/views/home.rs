use dioxus::prelude::*;
use ui::UserInfosPanel;

#[component]
pub fn Home() -> Element {
    rsx! {
        main { class: "main-content",
            div { class: "page-header",
                h1 { class: "page-title", "UserInfos" }
                p { class: "page-subtitle",
                    "Sign in with a provider to see what it knows about you."
                }
            }
            UserInfosPanel {}
        }
    }
}
