use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlSelectElement};

use crate::currency::{CurrencyCode, SELECTABLE_CURRENCIES};
use crate::error::RequestError;
use crate::http::{self, Acknowledgement};

pub const SELECT_SELECTOR: &str = "select[data-currency-select]";
pub const SET_CURRENCY_ENDPOINT: &str = "/set_currency";

#[derive(Serialize)]
struct SetCurrency<'a> {
    currency: &'a str,
}

#[derive(Deserialize)]
struct SetCurrencyResponse {
    #[serde(default)]
    success: bool,
    currency: Option<String>,
}

impl Acknowledgement for SetCurrencyResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<String> {
        None
    }
}

async fn set_currency(endpoint: &str, code: CurrencyCode) -> Result<String, RequestError> {
    let request = http::ajax_post(endpoint).json(&SetCurrency {
        currency: code.as_str(),
    })?;
    let raw = http::send(request).await?;
    let response: SetCurrencyResponse = http::decode_acknowledged(&raw)?;
    Ok(response.currency.unwrap_or_else(|| code.to_string()))
}

/// Lets `select[data-currency-select]` switch the display currency.
pub fn attach(document: &Document, current: CurrencyCode) -> Result<usize, JsValue> {
    let selects = super::query_all::<HtmlSelectElement>(document, SELECT_SELECTOR)?;
    let count = selects.len();

    for select in selects {
        select.set_value(current.as_str());
        let endpoint = select
            .get_attribute("data-endpoint")
            .unwrap_or_else(|| SET_CURRENCY_ENDPOINT.to_string());
        let source = select.clone();

        super::listen(&select, "change", move |_| {
            let code = match CurrencyCode::parse(&source.value()) {
                Some(code) if SELECTABLE_CURRENCIES.contains(&code.as_str()) => code,
                _ => {
                    log::warn!("unsupported currency {:?} selected", source.value());
                    source.set_value(current.as_str());
                    return;
                }
            };

            let endpoint = endpoint.clone();
            let source = source.clone();
            spawn_local(async move {
                match set_currency(&endpoint, code).await {
                    Ok(applied) => {
                        log::info!("display currency set to {applied}");
                        if let Err(err) = super::window().and_then(|w| w.location().reload()) {
                            log::error!("could not reload after currency change: {err:?}");
                        }
                    }
                    Err(err) => {
                        log::error!("changing currency to {code} failed: {err}");
                        source.set_value(current.as_str());
                        super::alert("Failed to change currency");
                    }
                }
            });
        })?;
    }

    Ok(count)
}
