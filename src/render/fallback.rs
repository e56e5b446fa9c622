use crate::exception::ErrorDetails;
use crate::render::RenderContext;
use another_html_builder::{Body, Buffer};

/// Notice shown when the error view itself could not be rendered
pub const RENDER_FAILURE_NOTICE: &str = "There was also an issue rendering the error page:";

/// Build the inline page served when the error view fails to render
///
/// Stacks, for both errors, are only shown when the render context carries
/// one, so hiding stacks in the context hides them here too.
pub fn render_fallback_page(context: &RenderContext, render_error: &ErrorDetails) -> String {
    let error = &context.error;
    let show_stacks = error.stack.is_some();

    Buffer::default()
        .doctype()
        .node("html")
        .attr(("lang", "en"))
        .content(|buf| {
            buf.node("body").content(|buf| {
                let buf = buf
                    .node("h1")
                    .content(|buf| buf.text(&format!("Error {}", error.status_code)))
                    .node("p")
                    .content(|buf| buf.text(&error.message));
                let buf = render_stack(buf, error.stack.as_deref());
                let buf = buf.node("hr").close().node("p").content(|buf| {
                    buf.text(RENDER_FAILURE_NOTICE)
                        .node("br")
                        .close()
                        .text(&render_error.message)
                });
                render_stack(buf, show_stacks.then_some(render_error.stack.as_str()))
            })
        })
        .into_inner()
}

fn render_stack<'a, W: std::fmt::Write>(
    buf: Buffer<W, Body<'a>>,
    stack: Option<&str>,
) -> Buffer<W, Body<'a>> {
    match stack {
        Some(stack) => buf.node("pre").content(|buf| buf.text(stack)),
        None => buf,
    }
}
