use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|error| panic!("Bad selector {css:?}: {error}"))
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form"))
        .next()
        .expect("Expected the page to contain a form")
}

/// Check that `form` sends its request to `endpoint` via the HTMX `attribute`, e.g. `hx-post`.
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form.value().attr(attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "form should have {attribute}=\"{endpoint}\""
    );
}

#[track_caller]
fn find_required_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let input = form
        .select(&selector(&format!("input[name=\"{name}\"]")))
        .next()
        .unwrap_or_else(|| panic!("Form has no input named {name:?}"));

    assert_eq!(
        input.value().attr("type"),
        Some(type_),
        "input {name:?} should have type {type_:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} should be required"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    find_required_input(form, name, type_);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = find_required_input(form, name, type_);

    assert_eq!(
        input.value().attr("value").unwrap_or_default(),
        value,
        "input {name:?} has the wrong value"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    assert!(
        form.select(&selector("button[type=\"submit\"]")).next().is_some(),
        "Form should have a submit button"
    );
}

/// Check the first paragraph in `form`, which is where form errors are rendered.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let got = form
        .select(&selector("p"))
        .next()
        .map(|p| p.text().collect::<String>())
        .unwrap_or_else(|| panic!("Expected the error {want_error_message:?} but found none"));

    assert_eq!(got.trim(), want_error_message);
}
