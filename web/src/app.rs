use leptos::prelude::*;
use lumen_shared::ConnectionPhase;

use crate::context::{use_app_context, use_socket, AppContext};
use crate::style::Theme;

fn status_class(theme: &Theme, phase: &ConnectionPhase) -> &'static str {
    match phase {
        ConnectionPhase::Open => theme.tag_ok,
        ConnectionPhase::Idle | ConnectionPhase::Connecting | ConnectionPhase::Reconnecting => {
            theme.tag_pending
        }
        ConnectionPhase::Exhausted | ConnectionPhase::Closed => theme.tag_down,
    }
}

/// Root view. Everything below it reaches the socket and theme through
/// [`use_app_context`].
#[component]
pub fn App(ctx: AppContext) -> impl IntoView {
    let theme = ctx.theme;
    provide_context(ctx);

    view! {
        <div class=theme.root>
            <section class=theme.section>
                <h1 class=theme.title>"lumen"</h1>
                <ConnectionStatus/>
            </section>
        </div>
    }
}

#[component]
pub fn ConnectionStatus() -> impl IntoView {
    let ctx = use_app_context();
    let theme = ctx.theme;
    let socket = use_socket();
    let status = ctx.status;
    let class_status = status.clone();
    let exhausted = status.clone();

    view! {
        <span class=move || class_status.with(|phase| status_class(&theme, phase))>
            {move || status.with(|phase| phase.label())}
        </span>
        <Show when=move || exhausted.with(|phase| !phase.is_live())>
            <button
                class="button is-small"
                on:click=move |_| {
                    if let Err(err) = socket.reconnect() {
                        log::warn!("reconnect failed: {err}");
                    }
                }
            >
                "Reconnect"
            </button>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags() {
        let theme = Theme::default();
        assert_eq!(status_class(&theme, &ConnectionPhase::Open), "tag is-success");
        assert_eq!(status_class(&theme, &ConnectionPhase::Reconnecting), "tag is-warning");
        assert_eq!(status_class(&theme, &ConnectionPhase::Exhausted), "tag is-danger");
    }
}
