use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlFormElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use crate::expenses::{
    delete_action, expense_id, iso_date, ExpenseRecord, DATE_INPUT_SELECTOR,
    DELETE_BUTTON_SELECTOR, DELETE_FORM_ID, EDIT_BUTTON_SELECTOR, EDIT_FORM_ID,
};

/// Sets the value of an input, select or textarea by id.
fn set_field_value(document: &Document, id: &str, value: &str) {
    if let Some(input) = super::element_by_id::<HtmlInputElement>(document, id) {
        input.set_value(value);
    } else if let Some(select) = super::element_by_id::<HtmlSelectElement>(document, id) {
        select.set_value(value);
    } else if let Some(textarea) = super::element_by_id::<HtmlTextAreaElement>(document, id) {
        textarea.set_value(value);
    } else {
        log::debug!("no editable #{id} on the page");
    }
}

/// Wires the edit and delete buttons of the expense list to the shared
/// modal forms. Returns how many buttons were wired.
pub fn attach_modals(document: &Document) -> Result<usize, JsValue> {
    let mut wired = 0;

    if let Some(edit_form) = super::element_by_id::<HtmlFormElement>(document, EDIT_FORM_ID) {
        for button in super::query_all::<Element>(document, EDIT_BUTTON_SELECTOR)? {
            let document = document.clone();
            let edit_form = edit_form.clone();
            let source = button.clone();
            super::listen(&button, "click", move |_| {
                let record = ExpenseRecord::from_attributes(|name| source.get_attribute(name));
                let Some(record) = record else {
                    log::warn!("edit button without a numeric data-id");
                    return;
                };
                edit_form.set_action(&record.edit_action());
                for (id, value) in record.edit_fields() {
                    set_field_value(&document, id, value);
                }
            })?;
            wired += 1;
        }
    } else {
        log::debug!("no #{EDIT_FORM_ID}, edit buttons left alone");
    }

    if let Some(delete_form) = super::element_by_id::<HtmlFormElement>(document, DELETE_FORM_ID) {
        for button in super::query_all::<Element>(document, DELETE_BUTTON_SELECTOR)? {
            let delete_form = delete_form.clone();
            let source = button.clone();
            super::listen(&button, "click", move |_| {
                match expense_id(source.get_attribute("data-id")) {
                    Some(id) => delete_form.set_action(&delete_action(&id)),
                    None => log::warn!("delete button without a numeric data-id"),
                }
            })?;
            wired += 1;
        }
    } else {
        log::debug!("no #{DELETE_FORM_ID}, delete buttons left alone");
    }

    Ok(wired)
}

/// Fills an empty new-expense date input with today's local date.
pub fn default_date(document: &Document) -> Result<(), JsValue> {
    let input = match document.query_selector(DATE_INPUT_SELECTOR)? {
        Some(element) => match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => input,
            Err(_) => return Ok(()),
        },
        None => return Ok(()),
    };

    if input.value().is_empty() {
        let today = js_sys::Date::new_0();
        input.set_value(&iso_date(
            today.get_full_year(),
            today.get_month() + 1,
            today.get_date(),
        ));
    }
    Ok(())
}
