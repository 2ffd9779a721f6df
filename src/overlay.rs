use std::time::Duration;

use leptos::prelude::*;

use crate::config::Config;
use crate::controller::Notice;
use crate::tooltip::TooltipView;

const TOAST_CLASS: &str = "gpt-toast-notification";

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    seq: u64,
    notice: Notice,
}

/// Shows one toast at a time; a newer toast replaces the current one and the
/// older one's hide timer becomes a no-op.
#[derive(Clone, Copy)]
pub struct Toaster {
    current: RwSignal<Option<Toast>>,
    duration: Duration,
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: RwSignal::new(None),
            duration,
        }
    }

    pub fn show(&self, notice: Notice) {
        let seq = self
            .current
            .get_untracked()
            .map(|toast| toast.seq + 1)
            .unwrap_or_default();
        tracing::debug!(success = notice.success, message = notice.message.as_str(), "toast");
        self.current.set(Some(Toast { seq, notice }));

        let current = self.current;
        set_timeout(
            move || {
                if current.get_untracked().is_some_and(|toast| toast.seq == seq) {
                    current.set(None);
                }
            },
            self.duration,
        );
    }
}

pub fn stylesheet(config: &Config) -> String {
    format!(
        "::highlight({context}) {{ background-color: #FFF380; color: inherit; }}\n\
         ::highlight({expression}) {{ background-color: #FFB266; color: inherit; cursor: help; }}\n\
         .{TOAST_CLASS} {{ position: fixed; bottom: 20px; left: 50%; transform: translateX(-50%); \
         padding: 12px 24px; border-radius: 8px; color: white; font-family: sans-serif; \
         font-size: 16px; z-index: 999999; box-shadow: 0 4px 12px rgba(0,0,0,0.2); }}\n",
        context = config.context_highlight,
        expression = config.expression_highlight,
    )
}

fn tooltip_style(view: &TooltipView) -> String {
    let placement = match view {
        TooltipView::Shown { left, top, .. } => format!("display: block; left: {left}px; top: {top}px;"),
        TooltipView::Hidden => "display: none;".to_string(),
    };
    format!(
        "position: absolute; background: #333; color: white; padding: 10px 15px; \
         border-radius: 8px; font-size: 14px; font-family: sans-serif; line-height: 1.6; \
         max-width: 300px; box-shadow: 0 4px 15px rgba(0,0,0,0.3); z-index: 1000000; \
         pointer-events: none; border: 1px solid #555; {placement}"
    )
}

#[component]
pub fn Overlay(styles: String, tooltip: RwSignal<TooltipView>, toaster: Toaster) -> impl IntoView {
    let lines = move || match tooltip.get() {
        TooltipView::Shown { lines, .. } => lines,
        TooltipView::Hidden => Vec::new(),
    };

    view! {
        <style>{styles}</style>
        <div class="gpt-tooltip" style=move || tooltip_style(&tooltip.get())>
            {move || lines().into_iter().map(|line| view! { <div>{line}</div> }).collect::<Vec<_>>()}
        </div>
        {move || toaster.current.get().map(|toast| {
            let background = if toast.notice.success { "#28a745" } else { "#dc3545" };
            view! {
                <div class=TOAST_CLASS style=format!("background-color: {background};")>
                    {toast.notice.message}
                </div>
            }
        })}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_uses_configured_highlight_names() {
        let config = Config {
            context_highlight: "ctx".into(),
            expression_highlight: "expr".into(),
            ..Config::default()
        };
        let css = stylesheet(&config);
        assert!(css.contains("::highlight(ctx) { background-color: #FFF380;"));
        assert!(css.contains("::highlight(expr) { background-color: #FFB266; color: inherit; cursor: help; }"));
    }

    #[test]
    fn hidden_tooltip_is_not_displayed() {
        assert!(tooltip_style(&TooltipView::Hidden).ends_with("display: none;"));
        let shown = TooltipView::Shown {
            left: 10.0,
            top: 20.5,
            lines: vec![],
        };
        assert!(tooltip_style(&shown).ends_with("display: block; left: 10px; top: 20.5px;"));
    }
}
