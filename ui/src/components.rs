use api::HttpClient;
use dioxus::prelude::*;
use types::{AttributeRecord, Provider};

use crate::{EvalBrowser, UserInfosState, UserInfosViewModel};

type PageViewModel = UserInfosViewModel<EvalBrowser, HttpClient>;

/// Provider picker, fetch button, error line and attribute table.
#[component]
pub fn UserInfosPanel() -> Element {
    let mut state = use_signal(UserInfosState::default);
    let view_model = use_hook(|| PageViewModel::new(EvalBrowser, HttpClient::new()));

    // Pick up where we left off if the provider just sent us back here.
    let resume = view_model.clone();
    use_effect(move || {
        let view_model = resume.clone();
        spawn(async move {
            view_model.resume_after_auth(&mut state).await;
        });
    });

    let busy = state.read().busy;
    let selected = state.read().provider;
    let last_error = state.read().last_error.clone();

    rsx! {
        div { class: "card userinfos",
            div { class: "card-header",
                h2 { class: "card-title", "OpenID Connect" }
            }
            fieldset { class: "provider-group",
                legend { class: "form-label", "Fournisseur" }
                for provider in Provider::ALL {
                    label { key: "{provider}", class: "radio-label",
                        input {
                            r#type: "radio",
                            name: "fournisseur",
                            value: "{provider}",
                            checked: provider == selected,
                            disabled: busy,
                            onchange: move |_| {
                                state.write().select_provider(provider);
                            },
                        }
                        span { "{provider}" }
                    }
                }
            }
            button {
                class: "btn btn-primary",
                disabled: busy,
                onclick: move |_| {
                    let view_model = view_model.clone();
                    spawn(async move {
                        view_model.fetch_user_infos(&mut state).await;
                    });
                },
                if busy { "Recherche..." } else { "UserInfos" }
            }
            if !last_error.is_empty() {
                div { class: "alert alert-error", "{last_error}" }
            }
            AttributeTable { attributes: state.read().attributes.clone() }
        }
    }
}

#[component]
fn AttributeTable(attributes: Vec<AttributeRecord>) -> Element {
    if attributes.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { class: "table-container",
            table {
                thead {
                    tr {
                        th { "Propriété" }
                        th { "Valeur" }
                    }
                }
                tbody {
                    for (i, record) in attributes.iter().enumerate() {
                        {
                            let name = record.name().unwrap_or_default();
                            let value = record.value_text();
                            rsx! {
                                tr { key: "{i}",
                                    td { "{name}" }
                                    td { class: "attribute-value", "{value}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
