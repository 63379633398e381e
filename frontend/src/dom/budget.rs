use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, FormData, HtmlElement, HtmlFormElement};

use crate::budget::{
    BudgetBinding, BudgetEndpoint, BudgetForm, BudgetNodes, BudgetPage, BudgetUpdateResponse,
    FORM_SELECTOR,
};
use crate::currency::CurrencyFormatter;
use crate::error::RequestError;
use crate::http;

/// Posts a budget form's fields to its `action`.
struct FormEndpoint {
    form: HtmlFormElement,
}

impl BudgetEndpoint for FormEndpoint {
    async fn post_update(&self) -> Result<BudgetUpdateResponse, RequestError> {
        let fields = FormData::new_with_form(&self.form)
            .map_err(|err| RequestError::Network(format!("could not read form fields: {err:?}")))?;
        let request = http::ajax_post(&self.form.action()).body(fields)?;
        let raw = http::send(request).await?;
        BudgetUpdateResponse::from_raw(&raw)
    }
}

/// The live document around one budget form.
struct DomBudgetPage {
    document: Document,
    form: HtmlFormElement,
}

impl DomBudgetPage {
    fn submit_controls(&self) -> Vec<Element> {
        let list = match self
            .form
            .query_selector_all("button[type=\"submit\"], input[type=\"submit\"], button:not([type])")
        {
            Ok(list) => list,
            Err(_) => return Vec::new(),
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl BudgetNodes for DomBudgetPage {
    type Node = HtmlElement;

    fn find(&self, id: &str) -> Option<HtmlElement> {
        super::element_by_id::<HtmlElement>(&self.document, id)
    }

    fn set_text(&self, node: &HtmlElement, text: &str) {
        super::set_text(node, text);
    }

    fn set_progress(&self, node: &HtmlElement, width: &str, value: i64, label: &str) {
        super::set_style(node, "width", width);
        if let Err(err) = node.set_attribute("aria-valuenow", &value.to_string()) {
            log::warn!("could not set aria-valuenow on #{}: {err:?}", node.id());
        }
        super::set_text(node, label);
    }
}

impl BudgetPage for DomBudgetPage {
    fn close_modal(&self) {
        super::hide_enclosing_modal(&self.form);
    }

    fn set_pending(&self, pending: bool) {
        for control in self.submit_controls() {
            let result = if pending {
                control.set_attribute("disabled", "")
            } else {
                control.remove_attribute("disabled")
            };
            if let Err(err) = result {
                log::warn!("could not toggle submit control: {err:?}");
            }
        }

        let busy = if pending { "true" } else { "false" };
        if let Err(err) = self.form.set_attribute("aria-busy", busy) {
            log::warn!("could not set aria-busy on budget form: {err:?}");
        }
    }

    fn alert(&self, message: &str) {
        super::alert(message);
    }
}

/// Takes over submission of every budget-edit form on the page.
pub fn attach(document: &Document, formatter: &CurrencyFormatter) -> Result<usize, JsValue> {
    let forms = super::query_all::<HtmlFormElement>(document, FORM_SELECTOR)?;
    let mut attached = 0;

    for form in forms {
        let binding = BudgetBinding::from_data(|name| form.get_attribute(name));
        if binding.budget_id.is_none() {
            log::warn!("budget form without data-budget-id: saving it without updating the page");
        }

        let budget_form = Rc::new(BudgetForm::new(
            binding,
            FormEndpoint { form: form.clone() },
            DomBudgetPage {
                document: document.clone(),
                form: form.clone(),
            },
            formatter.clone(),
        ));

        super::listen(&form, "submit", move |event| {
            event.prevent_default();
            let budget_form = budget_form.clone();
            spawn_local(async move {
                budget_form.submit().await;
            });
        })?;
        attached += 1;
    }

    Ok(attached)
}
