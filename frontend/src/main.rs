//! Page scripts for the expense tracker.
//!
//! The server renders every page; this crate enhances the rendered markup
//! in place: AJAX budget edits, the expense edit/delete modals, the
//! category pie chart and the display-currency picker.

mod budget;
mod chart;
mod config;
mod currency;
mod dom;
mod error;
mod expenses;
mod http;

use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::currency::CurrencyFormatter;

fn enhance_page(document: &Document) -> Result<(), JsValue> {
    let (config, ignored) = dom::read_page_config(document);
    if let Some(level) = config.console_level() {
        let _ = console_log::init_with_level(level);
    }
    for setting in ignored {
        log::warn!(
            "ignoring malformed <meta name=\"{}\"> value {:?}",
            setting.name,
            setting.value
        );
    }

    let formatter = CurrencyFormatter::new(config.currency);
    let budget_forms = dom::budget::attach(document, &formatter)?;
    let expense_buttons = dom::expenses::attach_modals(document)?;
    dom::expenses::default_date(document)?;
    let currency_selects = dom::currency_select::attach(document, config.currency)?;
    let chart = dom::chart::mount(document, config.currency)?;

    log::debug!(
        "page ready: currency {}, {budget_forms} budget forms, {expense_buttons} expense buttons, \
         {currency_selects} currency pickers, chart {}",
        config.currency,
        if chart { "mounted" } else { "absent" }
    );
    Ok(())
}

fn run(document: &Document) {
    if let Err(err) = enhance_page(document) {
        log::error!("could not set up page scripts: {err:?}");
    }
}

fn main() {
    console_error_panic_hook::set_once();

    let document = match dom::document() {
        Ok(document) => document,
        Err(err) => {
            web_sys::console::error_1(&err);
            return;
        }
    };

    if document.ready_state() != "loading" {
        run(&document);
        return;
    }

    let loaded = document.clone();
    if let Err(err) = dom::listen(&document, "DOMContentLoaded", move |_| run(&loaded)) {
        web_sys::console::error_1(&err);
    }
}
