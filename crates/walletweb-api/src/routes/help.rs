//! Help center routes - FAQ and the support contact form

use crate::alert_html;
use axum::extract::{Form, Query};
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;
use walletweb_core::support::search_faq;
use walletweb_core::SupportRequest;
use walletweb_utils::escape_html;

fn faq_list(query: &str) -> String {
    let entries = search_faq(query);
    if entries.is_empty() {
        return format!(
            "<p class='text-gray-500 text-center py-6'>No answers found for \"{}\"</p>",
            escape_html(query)
        );
    }
    entries
        .iter()
        .map(|f| {
            format!(
                "<details class='border rounded-lg p-4'><summary class='font-medium cursor-pointer'>{}</summary>\
                 <p class='mt-2 text-sm text-gray-600'>{}</p></details>",
                f.question, f.answer
            )
        })
        .collect()
}

/// Help page; `?q=` narrows the FAQ
pub async fn page_help(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let query = params.get("q").map(|q| q.trim()).unwrap_or_default();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Help Center</h2></div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Frequently Asked Questions</h3>
                <form hx-get='/help' hx-target='#faq-list' hx-select='#faq-list' hx-swap='outerHTML' class='mb-4'>
                    <input type='text' name='q' value='{}' placeholder='Search help...' class='w-full px-4 py-2 border rounded-lg'>
                </form>
                <div id='faq-list' class='space-y-2'>{}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Contact Support</h3>
                <form hx-post='/help/contact' hx-target='#contact-result' class='space-y-4'>
                    <div class='grid grid-cols-2 gap-4'>
                        <div><label class='block text-sm font-medium text-gray-700 mb-1'>Name</label>
                            <input type='text' name='name' required class='w-full px-3 py-2 border rounded-lg'></div>
                        <div><label class='block text-sm font-medium text-gray-700 mb-1'>Email</label>
                            <input type='email' name='email' required class='w-full px-3 py-2 border rounded-lg'></div>
                    </div>
                    <div><label class='block text-sm font-medium text-gray-700 mb-1'>Subject</label>
                        <input type='text' name='subject' class='w-full px-3 py-2 border rounded-lg' placeholder='General question'></div>
                    <div><label class='block text-sm font-medium text-gray-700 mb-1'>Message</label>
                        <textarea name='message' rows='5' required class='w-full px-3 py-2 border rounded-lg'></textarea></div>
                    <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Send</button>
                </form>
                <div id='contact-result' class='mt-4'></div>
            </div>
        </div>"#,
        escape_html(query),
        faq_list(query)
    );

    Html(crate::page_response(&headers, "Help", "/help", &inner_content))
}

/// HTMX: Submit the contact form
///
/// Requests are logged only; there is no outbound mail.
pub async fn htmx_contact_submit(Form(request): Form<SupportRequest>) -> Html<String> {
    match request.validate() {
        Ok(()) => {
            log::info!(
                "Support request from {} <{}>: {}",
                request.name.trim(),
                request.email.trim(),
                request.subject_line()
            );
            Html(alert_html(
                "success",
                &format!("Thanks {}, we received your message about \"{}\".", request.name.trim(), request.subject_line()),
            ))
        }
        Err(e) => Html(alert_html("error", &e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};

    const FORM: &str = "application/x-www-form-urlencoded";

    #[tokio::test]
    async fn test_help_page_filters_faq() {
        let (app, _, _dir) = app_with_state().await;
        let html = body_string(send(&app, Method::GET, "/help", None).await).await;
        assert!(html.contains("How are transfers counted?"));
        assert!(html.contains("Contact Support"));

        let html = body_string(send(&app, Method::GET, "/help?q=csv", None).await).await;
        assert!(html.contains("Which export formats"));
        assert!(!html.contains("How are transfers counted?"));

        let html = body_string(send(&app, Method::GET, "/help?q=zzz", None).await).await;
        assert!(html.contains("No answers found"));
    }

    #[tokio::test]
    async fn test_contact_submit() {
        let (app, _, _dir) = app_with_state().await;
        let body = "name=Sam&email=sam%40example.com&subject=&message=Export+is+stuck".to_string();
        let response = send(&app, Method::POST, "/help/contact", Some((FORM, body))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Thanks Sam"));
        assert!(html.contains("General question"));

        let body = "name=Sam&email=nope&message=hi".to_string();
        let html = body_string(send(&app, Method::POST, "/help/contact", Some((FORM, body))).await).await;
        assert!(html.contains("valid email"));
    }
}
